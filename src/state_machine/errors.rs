use crate::collaborators::CollaboratorError;
use crate::state_machine::TaskStatus;
use uuid::Uuid;

/// Errors raised by task lifecycle transitions.
///
/// Guard violations always identify the task, its current status, and the
/// attempted action so the caller can reconcile state and decide on a retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateMachineError {
    #[error("invalid transition for task {task_id}: cannot {attempted} while {current}")]
    InvalidTransition {
        task_id: Uuid,
        current: TaskStatus,
        attempted: &'static str,
    },

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("task {task_id} has no usable pause record: {detail}")]
    CorruptPauseRecord { task_id: Uuid, detail: String },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
