use super::errors::{StateMachineError, StateMachineResult};
use super::events::TaskEvent;
use super::states::TaskStatus;
use crate::collaborators::TaskStore;
use crate::constants::{events, PAUSED_FROM_KEY};
use crate::events::EventPublisher;
use crate::models::{Payload, Task};
use chrono::Utc;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Task lifecycle service enforcing the at-most-once transition guarantee.
///
/// Every mutation re-loads the task and re-checks its status inside a
/// per-task lock before writing, so a second concurrent `assign` observes
/// the already-assigned state and fails with `InvalidTransition` instead of
/// double-committing. Lifecycle events are published fire-and-forget after
/// the store write succeeds.
pub struct TaskLifecycle {
    store: Arc<dyn TaskStore>,
    publisher: EventPublisher,
    transition_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl TaskLifecycle {
    pub fn new(store: Arc<dyn TaskStore>, publisher: EventPublisher) -> Self {
        Self {
            store,
            publisher,
            transition_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    /// Register a newly created task and announce it
    pub async fn create(&self, task: Task) -> StateMachineResult<Task> {
        self.store.save(task.clone()).await?;
        self.publisher.publish(
            events::TASK_CREATED,
            &task,
            "core",
            json!({ "kind": task.kind.to_string(), "priority": task.priority }),
        );
        debug!(task_id = %task.id, kind = %task.kind, "task created");
        Ok(task)
    }

    /// Assign a pending task to a worker
    pub async fn assign(&self, task_id: Uuid, worker_id: &str) -> StateMachineResult<Task> {
        self.transition(
            task_id,
            TaskEvent::Assign {
                worker_id: worker_id.to_string(),
            },
        )
        .await
    }

    /// Move an assigned task into execution
    pub async fn start(&self, task_id: Uuid) -> StateMachineResult<Task> {
        self.transition(task_id, TaskEvent::Start).await
    }

    /// Finish a task; the result payload replaces the task payload
    pub async fn complete(&self, task_id: Uuid, result: Payload) -> StateMachineResult<Task> {
        self.transition(task_id, TaskEvent::Complete { result }).await
    }

    /// Pause, recording the current status for later resume
    pub async fn pause(&self, task_id: Uuid, reason: &str) -> StateMachineResult<Task> {
        self.transition(
            task_id,
            TaskEvent::Pause {
                reason: reason.to_string(),
            },
        )
        .await
    }

    /// Restore the status recorded at pause time and clear the note
    pub async fn resume(&self, task_id: Uuid) -> StateMachineResult<Task> {
        self.transition(task_id, TaskEvent::Resume).await
    }

    /// Cancel from any non-terminal status
    pub async fn cancel(&self, task_id: Uuid, reason: &str) -> StateMachineResult<Task> {
        self.transition(
            task_id,
            TaskEvent::Cancel {
                reason: reason.to_string(),
            },
        )
        .await
    }

    /// Mark an assigned or in-progress task failed
    pub async fn fail(&self, task_id: Uuid, error: &str) -> StateMachineResult<Task> {
        self.transition(
            task_id,
            TaskEvent::Fail {
                error: error.to_string(),
            },
        )
        .await
    }

    /// Adjust priority by a delta, clamped to the valid range. Runs under
    /// the same per-task lock as status transitions.
    pub async fn adjust_priority(&self, task_id: Uuid, delta: i32) -> StateMachineResult<Task> {
        let lock = self.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self
            .store
            .find(task_id)
            .await?
            .ok_or(StateMachineError::TaskNotFound(task_id))?;
        let before = task.priority;
        task.set_priority(before.saturating_add(delta));
        self.store.save(task.clone()).await?;
        debug!(task_id = %task_id, before, after = task.priority, "priority adjusted");
        Ok(task)
    }

    /// Apply a lifecycle event, re-checking the guard under the task's lock.
    pub async fn transition(&self, task_id: Uuid, event: TaskEvent) -> StateMachineResult<Task> {
        let lock = self.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self
            .store
            .find(task_id)
            .await?
            .ok_or(StateMachineError::TaskNotFound(task_id))?;

        // Guard re-check: the status read here is authoritative for the
        // whole check-and-mutate step because the lock is held.
        let target = Self::determine_target_status(&task, &event)?;
        let from = task.status;
        Self::apply(&mut task, &event, target);
        self.store.save(task.clone()).await?;

        info!(
            task_id = %task_id,
            action = event.action(),
            from = %from,
            to = %target,
            "task transition"
        );
        self.publish_for(&task, &event, from);
        Ok(task)
    }

    fn lock_for(&self, task_id: Uuid) -> Arc<Mutex<()>> {
        self.transition_locks
            .entry(task_id)
            .or_default()
            .value()
            .clone()
    }

    /// Transition table. Violations never silently no-op.
    fn determine_target_status(task: &Task, event: &TaskEvent) -> StateMachineResult<TaskStatus> {
        use TaskStatus::{Assigned, Completed, Failed, InProgress, Paused, Pending};

        let target = match (task.status, event) {
            (Pending, TaskEvent::Assign { .. }) => Assigned,
            (Assigned, TaskEvent::Start) => InProgress,
            (Assigned | InProgress, TaskEvent::Complete { .. }) => Completed,
            (Assigned | InProgress, TaskEvent::Pause { .. }) => Paused,
            (Paused, TaskEvent::Resume) => Self::recorded_prior_status(task)?,
            (Assigned | InProgress, TaskEvent::Fail { .. }) => Failed,
            (current, TaskEvent::Cancel { .. }) if current.is_cancellable() => {
                TaskStatus::Cancelled
            }
            (current, event) => {
                return Err(StateMachineError::InvalidTransition {
                    task_id: task.id,
                    current,
                    attempted: event.action(),
                })
            }
        };
        Ok(target)
    }

    /// The pre-pause status stored in the payload under the reserved key
    fn recorded_prior_status(task: &Task) -> StateMachineResult<TaskStatus> {
        let recorded = task
            .payload
            .get(PAUSED_FROM_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| StateMachineError::CorruptPauseRecord {
                task_id: task.id,
                detail: "no recorded pre-pause status".to_string(),
            })?;
        recorded
            .parse()
            .map_err(|_| StateMachineError::CorruptPauseRecord {
                task_id: task.id,
                detail: format!("unrecognized recorded status '{recorded}'"),
            })
    }

    fn apply(task: &mut Task, event: &TaskEvent, target: TaskStatus) {
        match event {
            TaskEvent::Assign { worker_id } => {
                task.assigned_worker_id = Some(worker_id.clone());
                task.assigned_at = Some(Utc::now());
            }
            TaskEvent::Start => {
                task.started_at = Some(Utc::now());
            }
            TaskEvent::Complete { result } => {
                task.completed_at = Some(Utc::now());
                task.payload = result.clone();
            }
            TaskEvent::Pause { reason } => {
                task.payload
                    .insert(PAUSED_FROM_KEY.to_string(), json!(task.status.to_string()));
                task.notes = Some(reason.clone());
            }
            TaskEvent::Resume => {
                task.payload.remove(PAUSED_FROM_KEY);
                task.notes = None;
            }
            TaskEvent::Cancel { reason } => {
                task.notes = Some(reason.clone());
            }
            TaskEvent::Fail { error } => {
                task.completed_at = Some(Utc::now());
                task.notes = Some(error.clone());
            }
        }
        task.status = target;
        // Worker linkage exists only while the task is assigned, running,
        // or paused out of one of those states.
        if target.is_terminal() {
            task.assigned_worker_id = None;
        }
    }

    fn publish_for(&self, task: &Task, event: &TaskEvent, from: TaskStatus) {
        let context = json!({ "action": event.action(), "from": from.to_string() });
        match event {
            TaskEvent::Assign { worker_id } => {
                self.publisher
                    .publish(events::TASK_ASSIGNED, task, worker_id.as_str(), context);
            }
            TaskEvent::Complete { .. } => {
                self.publisher
                    .publish(events::TASK_COMPLETED, task, "core", context);
            }
            TaskEvent::Fail { error } => {
                warn!(task_id = %task.id, error = error.as_str(), "task failed");
                self.publisher.publish(
                    events::TASK_FAILED,
                    task,
                    "core",
                    json!({ "action": "fail", "from": from.to_string(), "error": error }),
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InMemoryTaskStore;
    use crate::models::TaskKind;

    fn lifecycle_with_store() -> (Arc<InMemoryTaskStore>, TaskLifecycle) {
        let store = InMemoryTaskStore::new();
        let lifecycle = TaskLifecycle::new(store.clone(), EventPublisher::default());
        (store, lifecycle)
    }

    #[tokio::test]
    async fn test_assign_only_from_pending() {
        let (_store, lifecycle) = lifecycle_with_store();
        let task = lifecycle.create(Task::new(TaskKind::Outbound)).await.unwrap();

        let assigned = lifecycle.assign(task.id, "w-1").await.unwrap();
        assert_eq!(assigned.status, TaskStatus::Assigned);
        assert_eq!(assigned.assigned_worker_id.as_deref(), Some("w-1"));
        assert!(assigned.assigned_at.is_some());

        let err = lifecycle.assign(task.id, "w-2").await.unwrap_err();
        assert_eq!(
            err,
            StateMachineError::InvalidTransition {
                task_id: task.id,
                current: TaskStatus::Assigned,
                attempted: "assign",
            }
        );
    }

    #[tokio::test]
    async fn test_complete_replaces_payload() {
        let (_store, lifecycle) = lifecycle_with_store();
        let task = lifecycle
            .create(Task::new(TaskKind::Inbound).with_payload_entry("sku", json!("A-100")))
            .await
            .unwrap();
        lifecycle.assign(task.id, "w-1").await.unwrap();

        let mut result = Payload::new();
        result.insert("received_units".to_string(), json!(48));
        let completed = lifecycle.complete(task.id, result).await.unwrap();

        assert_eq!(completed.status, TaskStatus::Completed);
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.payload.get("received_units"), Some(&json!(48)));
        assert!(!completed.payload.contains_key("sku"));
        assert!(completed.assigned_worker_id.is_none());
    }

    #[tokio::test]
    async fn test_pause_resume_restores_prior_status() {
        let (_store, lifecycle) = lifecycle_with_store();
        for start_first in [false, true] {
            let task = lifecycle.create(Task::new(TaskKind::Count)).await.unwrap();
            lifecycle.assign(task.id, "w-1").await.unwrap();
            let expected = if start_first {
                lifecycle.start(task.id).await.unwrap();
                TaskStatus::InProgress
            } else {
                TaskStatus::Assigned
            };

            let paused = lifecycle.pause(task.id, "shift change").await.unwrap();
            assert_eq!(paused.status, TaskStatus::Paused);
            assert_eq!(paused.notes.as_deref(), Some("shift change"));
            assert!(paused.payload.contains_key(PAUSED_FROM_KEY));

            let resumed = lifecycle.resume(task.id).await.unwrap();
            assert_eq!(resumed.status, expected);
            assert!(resumed.notes.is_none());
            assert!(!resumed.payload.contains_key(PAUSED_FROM_KEY));
        }
    }

    #[tokio::test]
    async fn test_resume_requires_pause_record() {
        let (store, lifecycle) = lifecycle_with_store();
        let mut task = Task::new(TaskKind::Quality);
        task.status = TaskStatus::Paused;
        store.insert(task.clone());

        let err = lifecycle.resume(task.id).await.unwrap_err();
        assert!(matches!(err, StateMachineError::CorruptPauseRecord { .. }));
    }

    #[tokio::test]
    async fn test_cancel_guards() {
        let (_store, lifecycle) = lifecycle_with_store();

        // Cancellable from any non-terminal status
        let task = lifecycle.create(Task::new(TaskKind::Transfer)).await.unwrap();
        let cancelled = lifecycle.cancel(task.id, "order voided").await.unwrap();
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
        assert_eq!(cancelled.notes.as_deref(), Some("order voided"));

        // Not cancellable twice
        let err = lifecycle.cancel(task.id, "again").await.unwrap_err();
        assert!(matches!(
            err,
            StateMachineError::InvalidTransition {
                attempted: "cancel",
                ..
            }
        ));

        // Not cancellable after completion
        let done = lifecycle.create(Task::new(TaskKind::Outbound)).await.unwrap();
        lifecycle.assign(done.id, "w-1").await.unwrap();
        lifecycle.complete(done.id, Payload::new()).await.unwrap();
        assert!(lifecycle.cancel(done.id, "too late").await.is_err());
    }

    #[tokio::test]
    async fn test_fail_from_in_progress() {
        let (_store, lifecycle) = lifecycle_with_store();
        let task = lifecycle.create(Task::new(TaskKind::Transfer)).await.unwrap();
        lifecycle.assign(task.id, "w-3").await.unwrap();
        lifecycle.start(task.id).await.unwrap();

        let failed = lifecycle.fail(task.id, "forklift unavailable").await.unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert_eq!(failed.notes.as_deref(), Some("forklift unavailable"));
    }

    #[tokio::test]
    async fn test_failed_is_a_final_resolution() {
        let (store, lifecycle) = lifecycle_with_store();
        let task = lifecycle.create(Task::new(TaskKind::Transfer)).await.unwrap();
        lifecycle.assign(task.id, "w-3").await.unwrap();
        lifecycle.fail(task.id, "pallet damaged").await.unwrap();

        // A task resolves exactly once; no second resolution via cancel
        let err = lifecycle.cancel(task.id, "written off").await.unwrap_err();
        assert_eq!(
            err,
            StateMachineError::InvalidTransition {
                task_id: task.id,
                current: TaskStatus::Failed,
                attempted: "cancel",
            }
        );
        let stored = store.find(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let (_store, lifecycle) = lifecycle_with_store();
        let missing = Uuid::new_v4();
        assert_eq!(
            lifecycle.start(missing).await.unwrap_err(),
            StateMachineError::TaskNotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_adjust_priority_clamps() {
        let (_store, lifecycle) = lifecycle_with_store();
        let task = lifecycle
            .create(Task::new(TaskKind::Outbound).with_priority(95))
            .await
            .unwrap();

        let bumped = lifecycle.adjust_priority(task.id, 50).await.unwrap();
        assert_eq!(bumped.priority, 100);
        let dropped = lifecycle.adjust_priority(task.id, -500).await.unwrap();
        assert_eq!(dropped.priority, 1);
    }
}
