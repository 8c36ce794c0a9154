//! # Batch Scheduler
//!
//! Single-pass assignment over a snapshot of pending tasks. One task's
//! failure never aborts the pass: the task is recorded as skipped, the loop
//! moves on, and the outcome object always arrives well-formed so the
//! orchestrating layer can decide what to retry.

use super::matcher::{MatchOptions, WorkerMatcher};
use super::strategy::{BasicSchedulingStrategy, SchedulingStrategy};
use crate::config::SchedulingConstraints;
use crate::models::Task;
use crate::state_machine::{TaskLifecycle, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// One committed assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub task_id: Uuid,
    pub worker_id: String,
    pub match_score: f64,
    pub assignment_reason: String,
}

/// A task the pass could not process, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSkip {
    pub task_id: Uuid,
    pub reason: String,
}

/// Outcome of a batch pass. Always well-formed:
/// `assigned.len() + unassigned.len() == total_tasks`, and `skipped` details
/// the subset of `unassigned` that hit an error rather than a no-match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total_tasks: usize,
    pub assigned: Vec<AssignmentRecord>,
    /// Every task that left the pass without a worker, in scheduling order
    pub unassigned: Vec<Uuid>,
    pub skipped: Vec<BatchSkip>,
    /// `assigned / total`, 0.0 for an empty pass
    pub assignment_rate: f64,
    pub elapsed_ms: f64,
    pub recommendations: Vec<String>,
}

impl BatchOutcome {
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }
}

/// Assigns a snapshot of pending tasks through the matcher and lifecycle
pub struct BatchScheduler {
    matcher: Arc<WorkerMatcher>,
    lifecycle: Arc<TaskLifecycle>,
    strategy: Box<dyn SchedulingStrategy>,
}

impl BatchScheduler {
    pub fn new(matcher: Arc<WorkerMatcher>, lifecycle: Arc<TaskLifecycle>) -> Self {
        Self {
            matcher,
            lifecycle,
            strategy: Box::new(BasicSchedulingStrategy),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn SchedulingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run one scheduling pass over the supplied pending snapshot.
    ///
    /// The snapshot is re-ordered by the configured strategy first, so
    /// callers need not pre-sort. Already-committed assignments are never
    /// rolled back when a later task fails.
    pub async fn schedule(
        &self,
        mut tasks: Vec<Task>,
        constraints: &SchedulingConstraints,
    ) -> BatchOutcome {
        let started = Instant::now();
        self.strategy.order_pending(&mut tasks);
        let total_tasks = tasks.len();

        let mut assigned = Vec::new();
        let mut unassigned = Vec::new();
        let mut skipped = Vec::new();
        // Workers assigned during this pass, for the per-pass cap
        let mut pass_ledger: HashMap<String, usize> = HashMap::new();

        for task in &tasks {
            if task.status != TaskStatus::Pending {
                unassigned.push(task.id);
                skipped.push(BatchSkip {
                    task_id: task.id,
                    reason: format!("not pending (status {})", task.status),
                });
                continue;
            }
            if task
                .zone_id()
                .is_some_and(|zone| constraints.zone_restrictions.contains(&zone))
            {
                unassigned.push(task.id);
                skipped.push(BatchSkip {
                    task_id: task.id,
                    reason: "target zone restricted for this pass".to_string(),
                });
                continue;
            }

            let mut options = MatchOptions::from_constraints(constraints);
            if let Some(max) = constraints.max_tasks_per_worker {
                for (worker_id, count) in &pass_ledger {
                    if *count >= max && !options.exclude_workers.contains(worker_id) {
                        options.exclude_workers.push(worker_id.clone());
                    }
                }
            }

            match self.matcher.find_best_match(task, &options).await {
                Ok(Some(chosen)) => match self.lifecycle.assign(task.id, &chosen.worker_id).await {
                    Ok(_) => {
                        *pass_ledger.entry(chosen.worker_id.clone()).or_insert(0) += 1;
                        assigned.push(AssignmentRecord {
                            task_id: task.id,
                            worker_id: chosen.worker_id,
                            match_score: chosen.match_score,
                            assignment_reason: chosen.assignment_reason,
                        });
                    }
                    Err(err) => {
                        warn!(task_id = %task.id, error = %err, "assignment failed, continuing batch");
                        unassigned.push(task.id);
                        skipped.push(BatchSkip {
                            task_id: task.id,
                            reason: err.to_string(),
                        });
                    }
                },
                Ok(None) => unassigned.push(task.id),
                Err(err) => {
                    warn!(task_id = %task.id, error = %err, "matching failed, continuing batch");
                    unassigned.push(task.id);
                    skipped.push(BatchSkip {
                        task_id: task.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let assignment_rate = if total_tasks > 0 {
            assigned.len() as f64 / total_tasks as f64
        } else {
            0.0
        };
        let recommendations = Self::recommendations(total_tasks, &assigned, &unassigned);

        let outcome = BatchOutcome {
            total_tasks,
            assigned,
            unassigned,
            skipped,
            assignment_rate,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            recommendations,
        };
        info!(
            total = outcome.total_tasks,
            assigned = outcome.assigned.len(),
            unassigned = outcome.unassigned.len(),
            rate = outcome.assignment_rate,
            "batch scheduling pass complete"
        );
        outcome
    }

    fn recommendations(
        total: usize,
        assigned: &[AssignmentRecord],
        unassigned: &[Uuid],
    ) -> Vec<String> {
        if total == 0 {
            return vec!["no pending tasks to schedule".to_string()];
        }
        if unassigned.is_empty() {
            return vec![format!("all {} task(s) assigned", assigned.len())];
        }
        // Tasks are in scheduling order, so the first unassigned id is the
        // highest-priority one still waiting.
        vec![format!(
            "{} task(s) unassigned; highest-priority waiting task: {}",
            unassigned.len(),
            unassigned[0]
        )]
    }
}
