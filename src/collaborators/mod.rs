//! # Boundary Collaborators
//!
//! Constructor-injected contracts for everything this core does not own:
//! task persistence, worker skills, and the storage hierarchy. Concrete wire
//! formats and storage engines belong to the host; in-memory implementations
//! for tests and lightweight hosts live in [`memory`].

pub mod memory;

use crate::models::{LocationNode, Task, TaskKind, WorkerProfile};
use crate::state_machine::TaskStatus;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::{InMemoryLocationIndex, InMemoryTaskStore, InMemoryWorkerDirectory};

/// Errors surfaced by injected collaborators
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    /// An optional richer collaborator is not configured; callers degrade to
    /// their documented basic mode
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator backend error: {0}")]
    Backend(String),
}

/// Filter for task store counts and queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub kind: Option<TaskKind>,
    pub assigned_worker_id: Option<String>,
}

impl TaskFilter {
    pub fn by_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self.kind.is_none_or(|k| task.kind == k)
            && self
                .assigned_worker_id
                .as_ref()
                .is_none_or(|w| task.assigned_worker_id.as_deref() == Some(w.as_str()))
    }
}

/// Filter for worker directory lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerFilter {
    pub skill_category: Option<String>,
}

/// Read/write access to task records. This core never deletes tasks;
/// archival is the host's concern.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Task>, CollaboratorError>;

    async fn save(&self, task: Task) -> Result<(), CollaboratorError>;

    async fn find_by_status(
        &self,
        status: TaskStatus,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, CollaboratorError>;

    async fn count(&self, filter: TaskFilter) -> Result<usize, CollaboratorError>;
}

/// Read-only access to worker skill profiles and current load
#[async_trait]
pub trait WorkerDirectory: Send + Sync {
    /// Active profiles only; inactive workers never reach scoring
    async fn find_active_workers(
        &self,
        filter: WorkerFilter,
    ) -> Result<Vec<WorkerProfile>, CollaboratorError>;

    async fn current_active_task_count(&self, worker_id: &str)
        -> Result<usize, CollaboratorError>;

    /// Historical completion quality in `[0,1]`; matching substitutes a
    /// neutral 0.5 when the directory has no record.
    async fn performance_score(&self, _worker_id: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(None)
    }
}

/// Resolves a location's shelf and zone for distance computation
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, location_id: i64) -> Result<Option<LocationNode>, CollaboratorError>;

    async fn zone_of_shelf(&self, shelf_id: i64) -> Result<Option<i64>, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKind;

    #[test]
    fn test_task_filter_matching() {
        let mut task = Task::new(TaskKind::Quality);
        task.assigned_worker_id = Some("w-9".to_string());

        assert!(TaskFilter::default().matches(&task));
        assert!(TaskFilter::by_status(TaskStatus::Pending).matches(&task));
        assert!(!TaskFilter::by_status(TaskStatus::Completed).matches(&task));

        let by_worker = TaskFilter {
            assigned_worker_id: Some("w-9".to_string()),
            ..TaskFilter::default()
        };
        assert!(by_worker.matches(&task));

        let wrong_kind = TaskFilter {
            kind: Some(TaskKind::Outbound),
            ..TaskFilter::default()
        };
        assert!(!wrong_kind.matches(&task));
    }
}
