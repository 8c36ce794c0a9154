use crate::collaborators::CollaboratorError;
use crate::state_machine::StateMachineError;
use std::fmt;

/// Top-level error taxonomy for the scheduling and routing core.
///
/// "No match" is deliberately absent: an empty candidate pool is a normal
/// scheduling outcome reported through `Option` / unassigned lists, not an
/// error. Per-task failures during a batch run are likewise reported inside
/// the batch outcome rather than raised.
#[derive(Debug, Clone, PartialEq)]
pub enum WmsError {
    /// A referenced task or worker does not exist; never retried internally
    NotFound { entity: &'static str, id: String },
    /// A state-machine guard rejected the requested transition
    StateTransition(StateMachineError),
    /// An injected collaborator failed or is not configured
    Collaborator(CollaboratorError),
    ConfigurationError(String),
}

impl fmt::Display for WmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WmsError::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            WmsError::StateTransition(err) => write!(f, "State transition error: {err}"),
            WmsError::Collaborator(err) => write!(f, "Collaborator error: {err}"),
            WmsError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for WmsError {}

impl From<StateMachineError> for WmsError {
    fn from(err: StateMachineError) -> Self {
        WmsError::StateTransition(err)
    }
}

impl From<CollaboratorError> for WmsError {
    fn from(err: CollaboratorError) -> Self {
        WmsError::Collaborator(err)
    }
}

pub type Result<T> = std::result::Result<T, WmsError>;
