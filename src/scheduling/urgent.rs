//! # Urgent Task Handler
//!
//! Fast-path insertion for urgent work, bypassing normal batch ordering.
//! When nobody is free and preemption is off, the task's priority is raised
//! (bounded) so the next batch pass picks it up first; with preemption on,
//! the handler will load up a busy worker and report whose work it crowded.

use super::matcher::{MatchOptions, WorkerMatcher};
use crate::config::UrgencyConfig;
use crate::error::{Result, WmsError};
use crate::models::Task;
use crate::state_machine::{TaskLifecycle, TaskStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of an urgent insertion attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentOutcome {
    pub task_id: Uuid,
    pub assigned: bool,
    pub worker_id: Option<String>,
    pub match_score: Option<f64>,
    /// Set when the fallback priority bump ran
    pub new_priority: Option<i32>,
    /// Active tasks already held by the chosen worker when preemption
    /// selected them; reassigning those is the caller's decision
    pub displaced_task_ids: Vec<Uuid>,
    /// Human-readable impact analysis
    pub impact: String,
}

/// Immediate single-task assignment sharing the batch path's matcher and
/// state-machine guards
pub struct UrgentTaskHandler {
    matcher: Arc<WorkerMatcher>,
    lifecycle: Arc<TaskLifecycle>,
}

impl UrgentTaskHandler {
    pub fn new(matcher: Arc<WorkerMatcher>, lifecycle: Arc<TaskLifecycle>) -> Self {
        Self { matcher, lifecycle }
    }

    /// Try to place an existing task right now.
    pub async fn handle(&self, task_id: Uuid, config: &UrgencyConfig) -> Result<UrgentOutcome> {
        let task = self
            .lifecycle
            .store()
            .find(task_id)
            .await
            .map_err(WmsError::from)?
            .ok_or_else(|| WmsError::NotFound {
                entity: "task",
                id: task_id.to_string(),
            })?;

        let direct = self
            .matcher
            .find_best_match(&task, &MatchOptions::default())
            .await
            .map_err(WmsError::from)?;
        let chosen = match direct {
            Some(chosen) => Some(chosen),
            // Preemption: retry scoring every candidate as if idle
            None if config.preempt_allowed => self
                .matcher
                .find_best_match(
                    &task,
                    &MatchOptions {
                        ignore_workload: true,
                        ..MatchOptions::default()
                    },
                )
                .await
                .map_err(WmsError::from)?,
            None => None,
        };

        if let Some(chosen) = chosen {
            // Work already on the chosen worker's plate is implicitly
            // displaced by the urgent insertion; reassigning it is the
            // caller's decision.
            let displaced = if chosen.current_workload > 0 {
                self.active_tasks_of(&chosen.worker_id).await?
            } else {
                Vec::new()
            };
            self.lifecycle.assign(task_id, &chosen.worker_id).await?;
            if displaced.is_empty() {
                info!(task_id = %task_id, worker_id = chosen.worker_id.as_str(), "urgent task assigned directly");
            } else {
                warn!(
                    task_id = %task_id,
                    worker_id = chosen.worker_id.as_str(),
                    displaced = displaced.len(),
                    "urgent task inserted ahead of active work"
                );
            }
            let impact = if displaced.is_empty() {
                format!("assigned to {} with no displacement", chosen.worker_id)
            } else {
                format!(
                    "assigned to {} ahead of {} already-active task(s)",
                    chosen.worker_id,
                    displaced.len()
                )
            };
            return Ok(UrgentOutcome {
                task_id,
                assigned: true,
                match_score: Some(chosen.match_score),
                new_priority: None,
                displaced_task_ids: displaced,
                impact,
                worker_id: Some(chosen.worker_id),
            });
        }

        // Nobody eligible: raise the priority (bounded) so the next batch
        // pass escalates this task instead.
        let boost = config.level.priority_boost();
        let updated = self.lifecycle.adjust_priority(task_id, boost).await?;
        info!(
            task_id = %task_id,
            new_priority = updated.priority,
            preempt_allowed = config.preempt_allowed,
            "no eligible worker for urgent task; priority raised"
        );
        Ok(UrgentOutcome {
            task_id,
            assigned: false,
            worker_id: None,
            match_score: None,
            new_priority: Some(updated.priority),
            displaced_task_ids: Vec::new(),
            impact: format!(
                "no eligible worker; priority raised to {} pending the next scheduling pass",
                updated.priority
            ),
        })
    }

    async fn active_tasks_of(&self, worker_id: &str) -> Result<Vec<Uuid>> {
        let store = self.lifecycle.store();
        let mut held = Vec::new();
        for status in [TaskStatus::Assigned, TaskStatus::InProgress] {
            held.extend(
                store
                    .find_by_status(status, None)
                    .await
                    .map_err(WmsError::from)?
                    .into_iter()
                    .filter(|task: &Task| task.assigned_worker_id.as_deref() == Some(worker_id))
                    .map(|task| task.id),
            );
        }
        Ok(held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{InMemoryTaskStore, InMemoryWorkerDirectory, TaskStore};
    use crate::config::UrgencyLevel;
    use crate::events::EventPublisher;
    use crate::models::{TaskKind, WorkerProfile};

    fn handler() -> (
        Arc<InMemoryTaskStore>,
        Arc<InMemoryWorkerDirectory>,
        UrgentTaskHandler,
    ) {
        let store = InMemoryTaskStore::new();
        let directory = InMemoryWorkerDirectory::new(store.clone());
        let lifecycle = Arc::new(TaskLifecycle::new(store.clone(), EventPublisher::default()));
        let matcher = Arc::new(WorkerMatcher::new(directory.clone()));
        (store, directory, UrgentTaskHandler::new(matcher, lifecycle))
    }

    #[tokio::test]
    async fn test_direct_assignment() {
        let (store, directory, handler) = handler();
        directory.insert(WorkerProfile::new("w-1", "picking").with_skill(4, 80));
        let task = Task::new(TaskKind::Outbound).with_priority(80);
        store.insert(task.clone());

        let outcome = handler.handle(task.id, &UrgencyConfig::default()).await.unwrap();
        assert!(outcome.assigned);
        assert_eq!(outcome.worker_id.as_deref(), Some("w-1"));
        assert!(outcome.displaced_task_ids.is_empty());
        assert_eq!(
            store.find(task.id).await.unwrap().unwrap().status,
            TaskStatus::Assigned
        );
    }

    #[tokio::test]
    async fn test_priority_bump_when_no_workers() {
        let (store, _directory, handler) = handler();
        let task = Task::new(TaskKind::Quality).with_priority(60);
        store.insert(task.clone());

        let config = UrgencyConfig {
            level: UrgencyLevel::Critical,
            preempt_allowed: false,
            max_delay_minutes: Some(15),
        };
        let outcome = handler.handle(task.id, &config).await.unwrap();
        assert!(!outcome.assigned);
        assert_eq!(outcome.new_priority, Some(100)); // 60 + 50 clamped
        assert!(outcome.impact.contains("priority raised"));
        assert_eq!(
            store.find(task.id).await.unwrap().unwrap().status,
            TaskStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_bump_is_bounded() {
        let (store, _directory, handler) = handler();
        let task = Task::new(TaskKind::Count).with_priority(99);
        store.insert(task.clone());

        let config = UrgencyConfig {
            level: UrgencyLevel::Low,
            ..UrgencyConfig::default()
        };
        let outcome = handler.handle(task.id, &config).await.unwrap();
        assert_eq!(outcome.new_priority, Some(100));
    }

    #[tokio::test]
    async fn test_preemption_reports_displaced_work() {
        let (store, directory, handler) = handler();
        directory.insert(WorkerProfile::new("w-1", "picking").with_skill(4, 80));

        let mut held = Task::new(TaskKind::Outbound);
        held.status = TaskStatus::InProgress;
        held.assigned_worker_id = Some("w-1".to_string());
        store.insert(held.clone());

        let urgent = Task::new(TaskKind::Outbound).with_priority(90);
        store.insert(urgent.clone());

        let outcome = handler
            .handle(
                urgent.id,
                &UrgencyConfig {
                    preempt_allowed: true,
                    ..UrgencyConfig::default()
                },
            )
            .await
            .unwrap();
        assert!(outcome.assigned);
        assert_eq!(outcome.worker_id.as_deref(), Some("w-1"));
        assert_eq!(outcome.displaced_task_ids, vec![held.id]);
        assert!(outcome.impact.contains("already-active"));
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let (_store, _directory, handler) = handler();
        let err = handler
            .handle(Uuid::new_v4(), &UrgencyConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WmsError::NotFound { entity: "task", .. }));
    }

    #[tokio::test]
    async fn test_non_pending_task_propagates_guard_error() {
        let (store, directory, handler) = handler();
        directory.insert(WorkerProfile::new("w-1", "picking").with_skill(4, 80));
        let mut task = Task::new(TaskKind::Outbound);
        task.status = TaskStatus::Completed;
        store.insert(task.clone());

        let err = handler.handle(task.id, &UrgencyConfig::default()).await.unwrap_err();
        assert!(matches!(err, WmsError::StateTransition(_)));
    }
}
