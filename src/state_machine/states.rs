use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle states
///
/// `Pending → Assigned → InProgress → {Completed | Failed | Paused}`;
/// `Paused` resumes to whichever state it was entered from; every
/// non-terminal state may be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Initial state when the task is created
    Pending,
    /// A worker has been selected but has not started
    Assigned,
    /// The assigned worker is executing the task
    InProgress,
    /// Execution interrupted; the prior state is recorded for resume
    Paused,
    /// Task finished successfully
    Completed,
    /// Task was cancelled by an operator or the host
    Cancelled,
    /// Task failed
    Failed,
}

impl TaskStatus {
    /// Terminal resolutions allow no further transitions. A task resolves
    /// exactly once, as Completed, Cancelled, or Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Active states count toward a worker's current workload
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }

    /// States from which `cancel` is permitted
    pub fn is_cancellable(&self) -> bool {
        !self.is_terminal()
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Assigned => write!(f, "assigned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}
