use chrono::Utc;
use uuid::Uuid;

use crate::error::ControlError;
use crate::models::emergency::EmergencyAlert;

/// Result of submitting an alert.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The alert outranks whatever was running and must preempt the
    /// intersection now.
    PreemptNow(EmergencyAlert),
    /// The alert was accepted but waits behind a higher-ranked one.
    Queued,
}

/// Result of resolving or expiring the active alert.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Another queued alert takes over; repeat the preemption protocol.
    ActivateNext(EmergencyAlert),
    /// No alerts remain; control returns to the normal cycle.
    ResumeNormal,
    /// A queued, non-active alert was withdrawn; nothing changes for the
    /// running override.
    RemovedQueued,
}

/// Priority-ordered admission and lifecycle of emergency preemptions.
/// At most one override drives the intersection at a time; the rest wait
/// in `(priority_level, created_at)` order, earliest winning ties.
#[derive(Debug, Default)]
pub struct EmergencyOverrideCoordinator {
    active: Option<EmergencyAlert>,
    queued: Vec<EmergencyAlert>,
    resolved: Vec<EmergencyAlert>,
}

impl EmergencyOverrideCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&EmergencyAlert> {
        self.active.as_ref()
    }

    pub fn is_override_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Alerts fully served or withdrawn, most recent last.
    pub fn resolved_history(&self) -> &[EmergencyAlert] {
        &self.resolved
    }

    /// Validates and admits an alert. Rejected alerts never mutate state.
    pub fn submit(&mut self, alert: EmergencyAlert) -> Result<SubmitOutcome, ControlError> {
        alert.validate()?;
        if self.known(alert.alert_id) {
            return Err(ControlError::Validation(format!(
                "alert {} already submitted",
                alert.alert_id
            )));
        }
        match &self.active {
            Some(current) if alert.rank() < current.rank() => {
                // The incumbent returns to the queue; it has not been
                // served and will be re-activated in rank order.
                let displaced = self.active.take();
                if let Some(displaced) = displaced {
                    self.enqueue(displaced);
                }
                self.active = Some(alert.clone());
                Ok(SubmitOutcome::PreemptNow(alert))
            }
            Some(_) => {
                self.enqueue(alert);
                Ok(SubmitOutcome::Queued)
            }
            None => {
                self.active = Some(alert.clone());
                Ok(SubmitOutcome::PreemptNow(alert))
            }
        }
    }

    /// Marks an alert resolved. For the active alert this promotes the
    /// next queued one (if any); for a queued alert it is simply removed.
    pub fn resolve(&mut self, alert_id: Uuid) -> Result<ResolveOutcome, ControlError> {
        if self
            .active
            .as_ref()
            .map(|a| a.alert_id == alert_id)
            .unwrap_or(false)
        {
            if let Some(mut done) = self.active.take() {
                done.is_active = false;
                done.resolved_at = Some(Utc::now());
                self.resolved.push(done);
            }
            return Ok(match self.pop_next() {
                Some(next) => {
                    self.active = Some(next.clone());
                    ResolveOutcome::ActivateNext(next)
                }
                None => ResolveOutcome::ResumeNormal,
            });
        }
        if let Some(position) = self.queued.iter().position(|a| a.alert_id == alert_id) {
            let mut done = self.queued.remove(position);
            done.is_active = false;
            done.resolved_at = Some(Utc::now());
            self.resolved.push(done);
            return Ok(ResolveOutcome::RemovedQueued);
        }
        Err(ControlError::Validation(format!(
            "unknown alert id {}",
            alert_id
        )))
    }

    fn known(&self, alert_id: Uuid) -> bool {
        self.active
            .as_ref()
            .map(|a| a.alert_id == alert_id)
            .unwrap_or(false)
            || self.queued.iter().any(|a| a.alert_id == alert_id)
    }

    fn enqueue(&mut self, alert: EmergencyAlert) {
        self.queued.push(alert);
        self.queued.sort_by_key(|a| a.rank());
    }

    fn pop_next(&mut self) -> Option<EmergencyAlert> {
        if self.queued.is_empty() {
            None
        } else {
            Some(self.queued.remove(0))
        }
    }
}
