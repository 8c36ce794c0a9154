//! # Priority Calculator
//!
//! Recomputes pending-task priorities from a caller-supplied factor map.
//! Recomputation is deterministic for a given task set, factor map, and
//! reference time; adjustments clamp into `[1,100]` rather than wrap.

use crate::collaborators::{CollaboratorError, TaskStore};
use crate::models::Task;
use crate::state_machine::TaskStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Weighted contextual factors for a recomputation pass.
///
/// Recognized keys: `"all"` (every task), `"kind:<kind>"` (tasks of that
/// kind), `"zone:<zone_id>"` (tasks whose payload targets that zone), and
/// `"sla_breach"` (tasks older than `sla_age_secs`). Unknown keys are
/// ignored, which lets hosts pass through their own annotations harmlessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityContext {
    pub factors: BTreeMap<String, f64>,
    /// Age in seconds beyond which `sla_breach` applies
    pub sla_age_secs: i64,
}

impl Default for PriorityContext {
    fn default() -> Self {
        Self {
            factors: BTreeMap::new(),
            sla_age_secs: 3600,
        }
    }
}

impl PriorityContext {
    pub fn with_factor(mut self, key: impl Into<String>, weight: f64) -> Self {
        self.factors.insert(key.into(), weight);
        self
    }
}

/// Before/after record for one adjusted task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityChange {
    pub before: i32,
    pub after: i32,
}

/// Result of a recomputation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityRecalculation {
    pub trigger_reason: String,
    /// Tasks whose priority actually changed
    pub updated: usize,
    pub changes: BTreeMap<Uuid, PriorityChange>,
}

/// Recomputes priorities over the pending queue
pub struct PriorityCalculator {
    store: Arc<dyn TaskStore>,
}

impl PriorityCalculator {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Recompute every pending task's priority and persist the changes.
    ///
    /// `trigger_reason` is a free-form tag recorded for observability only.
    pub async fn recalculate_pending(
        &self,
        context: &PriorityContext,
        trigger_reason: &str,
    ) -> Result<PriorityRecalculation, CollaboratorError> {
        let now = Utc::now();
        let pending = self.store.find_by_status(TaskStatus::Pending, None).await?;

        let mut changes = BTreeMap::new();
        for mut task in pending {
            let before = task.priority;
            let after = adjusted_priority(&task, context, now);
            if after != before {
                task.set_priority(after);
                self.store.save(task.clone()).await?;
                changes.insert(task.id, PriorityChange { before, after });
            }
        }

        info!(
            trigger_reason,
            updated = changes.len(),
            factors = context.factors.len(),
            "priority recalculation complete"
        );
        Ok(PriorityRecalculation {
            trigger_reason: trigger_reason.to_string(),
            updated: changes.len(),
            changes,
        })
    }
}

/// Pure adjustment: sum the weights of the factors that apply to this task,
/// round, and clamp into the valid range.
pub fn adjusted_priority(task: &Task, context: &PriorityContext, now: DateTime<Utc>) -> i32 {
    let mut adjustment = 0.0;
    for (key, weight) in &context.factors {
        let applies = match key.as_str() {
            "all" => true,
            "sla_breach" => now - task.created_at >= Duration::seconds(context.sla_age_secs),
            key if key.starts_with("kind:") => task.kind.to_string() == key["kind:".len()..],
            key if key.starts_with("zone:") => task
                .zone_id()
                .is_some_and(|zone| zone.to_string() == key["zone:".len()..]),
            _ => false,
        };
        if applies {
            adjustment += weight;
        }
    }
    Task::clamp_priority(task.priority + adjustment.round() as i32)
}
