use std::error::Error;
use std::fmt;

/// Errors surfaced by the signal control core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Input from a collaborator failed validation; state was not mutated.
    Validation(String),
    /// A caller asked for something structurally impossible (e.g. a
    /// non-positive signal duration). Indicates a programming error.
    InvalidConfiguration(String),
    /// An internal invariant no longer holds (e.g. two lanes green at
    /// once). Fatal; indicates a scheduling bug, not bad input.
    ConsistencyFault(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Validation(msg) => write!(f, "validation error: {}", msg),
            ControlError::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            ControlError::ConsistencyFault(msg) => write!(f, "consistency fault: {}", msg),
        }
    }
}

impl Error for ControlError {}
