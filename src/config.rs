//! # Request-Scoped Configuration
//!
//! Ephemeral option objects callers pass into scheduling operations, plus
//! the host-facing defaults carrier. Nothing here is persisted and nothing
//! here reads the environment; environment sourcing is the host's job.

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Constraints applied to a batch scheduling pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConstraints {
    /// Host-supplied availability window data. Recognized for interface
    /// compatibility; this core does not interpret it.
    pub worker_availability: Option<Value>,
    /// Equipment tags recognized for interface compatibility; the matcher
    /// does not consult them.
    pub equipment_constraints: Vec<String>,
    /// Zones the pass must not schedule into
    pub zone_restrictions: Vec<i64>,
    /// Host-supplied time window data. Recognized for interface
    /// compatibility; this core does not interpret it.
    pub time_windows: Option<Value>,
    /// Workers excluded from matching for this pass
    pub exclude_workers: Vec<String>,
    /// Cap on tasks any single worker may hold after this pass
    pub max_tasks_per_worker: Option<usize>,
}

/// How hard the urgent path may push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    High,
    Critical,
}

impl UrgencyLevel {
    /// Priority increment applied when no worker can be found and
    /// preemption is not allowed
    pub fn priority_boost(&self) -> i32 {
        match self {
            Self::Low => 10,
            Self::High => 25,
            Self::Critical => 50,
        }
    }
}

/// Configuration for a single urgent insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyConfig {
    pub level: UrgencyLevel,
    /// Whether the handler may pick an already loaded worker and report the
    /// displaced work
    pub preempt_allowed: bool,
    /// Tolerated delay before the host should escalate further
    pub max_delay_minutes: Option<u32>,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            level: UrgencyLevel::High,
            preempt_allowed: false,
            max_delay_minutes: None,
        }
    }
}

/// Weights for the four match sub-scores.
///
/// Callers are not required to make these sum to 1.0; scoring re-normalizes
/// by the sum and falls back to the defaults when the sum is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub skill: f64,
    pub workload: f64,
    pub location: f64,
    pub performance: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skill: 0.4,
            workload: 0.2,
            location: 0.2,
            performance: 0.2,
        }
    }
}

impl MatchWeights {
    /// Defensive normalization: scale so the weights sum to 1.0
    pub fn normalized(self) -> Self {
        let sum = self.skill + self.workload + self.location + self.performance;
        if sum <= f64::EPSILON || !sum.is_finite() {
            return Self::default();
        }
        Self {
            skill: self.skill / sum,
            workload: self.workload / sum,
            location: self.location / sum,
            performance: self.performance / sum,
        }
    }
}

/// Queue monitor thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Pending-task count at which queue health becomes `warning`
    pub pending_warning_threshold: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            pending_warning_threshold: defaults::PENDING_WARNING_THRESHOLD,
        }
    }
}

/// Host-facing operational defaults. The host reads its environment and
/// overrides fields as needed; this core only consumes the values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub task_timeout_secs: u64,
    pub auto_assign_enabled: bool,
    pub max_concurrent_tasks: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: defaults::TASK_TIMEOUT_SECS,
            auto_assign_enabled: defaults::AUTO_ASSIGN_ENABLED,
            max_concurrent_tasks: defaults::MAX_CONCURRENT_TASKS,
        }
    }
}
