//! Queue health snapshots.
//!
//! The monitor reads the task store directly and never mutates it, so a
//! snapshot can be taken from a dashboard poller without touching the
//! scheduling path. Health is a coarse pending-depth check; richer
//! per-strategy insights ride along when the configured strategy offers
//! them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::collaborators::TaskStore;
use crate::config::MonitorConfig;
use crate::error::{Result, WmsError};
use crate::scheduling::strategy::{BasicSchedulingStrategy, SchedulingStrategy};
use crate::state_machine::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueHealth {
    Healthy,
    Warning,
}

/// Point-in-time view of the scheduling queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    pub pending_tasks: usize,
    pub active_tasks: usize,
    /// Active task count per assigned worker.
    pub worker_utilization: BTreeMap<String, usize>,
    pub queue_health: QueueHealth,
    /// Name of the strategy that produced any attached insights.
    pub mode: String,
    pub insights: Option<Value>,
    pub captured_at: DateTime<Utc>,
}

pub struct QueueMonitor {
    store: Arc<dyn TaskStore>,
    strategy: Arc<dyn SchedulingStrategy>,
    config: MonitorConfig,
}

impl QueueMonitor {
    /// Monitor with only the basic counters, no strategy insights.
    pub fn basic(store: Arc<dyn TaskStore>) -> Self {
        Self::new(
            store,
            Arc::new(BasicSchedulingStrategy),
            MonitorConfig::default(),
        )
    }

    pub fn new(
        store: Arc<dyn TaskStore>,
        strategy: Arc<dyn SchedulingStrategy>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            store,
            strategy,
            config,
        }
    }

    pub async fn snapshot(&self) -> Result<QueueSnapshot> {
        let pending = self
            .store
            .find_by_status(TaskStatus::Pending, None)
            .await
            .map_err(WmsError::from)?;

        let mut active = Vec::new();
        for status in [TaskStatus::Assigned, TaskStatus::InProgress] {
            active.extend(
                self.store
                    .find_by_status(status, None)
                    .await
                    .map_err(WmsError::from)?,
            );
        }

        let mut worker_utilization: BTreeMap<String, usize> = BTreeMap::new();
        for task in &active {
            if let Some(worker_id) = &task.assigned_worker_id {
                *worker_utilization.entry(worker_id.clone()).or_default() += 1;
            }
        }

        let queue_health = if pending.len() < self.config.pending_warning_threshold {
            QueueHealth::Healthy
        } else {
            warn!(
                pending = pending.len(),
                threshold = self.config.pending_warning_threshold,
                "pending queue depth above warning threshold"
            );
            QueueHealth::Warning
        };

        Ok(QueueSnapshot {
            pending_tasks: pending.len(),
            active_tasks: active.len(),
            worker_utilization,
            queue_health,
            mode: self.strategy.name().to_string(),
            insights: self.strategy.queue_insights(&pending),
            captured_at: Utc::now(),
        })
    }
}
