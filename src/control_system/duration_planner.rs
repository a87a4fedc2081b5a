use crate::config::ControllerConfig;

/// Pure planner turning an observed vehicle count into a green duration:
/// `clamp(base + scale_factor * count, min, max)`, rounded to whole
/// seconds. Stateless and side-effect free.
#[derive(Debug, Clone, Copy)]
pub struct GreenDurationPlanner {
    pub base_secs: u32,
    pub min_secs: u32,
    pub max_secs: u32,
    pub scale_factor: f64,
}

impl GreenDurationPlanner {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            base_secs: config.default_green_secs,
            min_secs: config.min_green_secs,
            max_secs: config.max_green_secs,
            scale_factor: config.green_scale_factor,
        }
    }

    /// Negative counts can only come from an unvalidated path; they are
    /// clamped to zero before use.
    pub fn plan(&self, vehicle_count: i64) -> u32 {
        let count = vehicle_count.max(0) as f64;
        let raw = self.base_secs as f64 + self.scale_factor * count;
        let rounded = raw.round();
        let clamped = rounded
            .max(self.min_secs as f64)
            .min(self.max_secs as f64);
        clamped as u32
    }
}
