use crate::models::task::Payload;
use serde::{Deserialize, Serialize};

/// Events that drive task state transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TaskEvent {
    /// Assign the task to a worker (Pending only)
    Assign { worker_id: String },
    /// The assigned worker begins execution
    Start,
    /// Finish successfully; the result payload replaces the task payload
    Complete { result: Payload },
    /// Interrupt execution, recording the current state for resume
    Pause { reason: String },
    /// Restore the state recorded when the task was paused
    Resume,
    /// Cancel with a reason (any state except Completed/Cancelled)
    Cancel { reason: String },
    /// Mark the task failed
    Fail { error: String },
}

impl TaskEvent {
    /// String form of the attempted action, used in logs and in
    /// `InvalidTransition` errors.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Assign { .. } => "assign",
            Self::Start => "start",
            Self::Complete { .. } => "complete",
            Self::Pause { .. } => "pause",
            Self::Resume => "resume",
            Self::Cancel { .. } => "cancel",
            Self::Fail { .. } => "fail",
        }
    }

    /// Whether this event resolves the task
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::Cancel { .. } | Self::Fail { .. }
        )
    }
}
