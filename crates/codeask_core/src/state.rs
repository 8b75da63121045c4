use serde::{Deserialize, Serialize};

/// Whether a request is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingState {
    #[default]
    Idle,
    Asking,
}

impl WorkingState {
    pub fn is_asking(&self) -> bool {
        matches!(self, WorkingState::Asking)
    }
}
