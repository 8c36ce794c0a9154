//! # Task Model
//!
//! The unit of warehouse work. A task carries a `kind` tag (one record type
//! for all work categories rather than a subtype hierarchy), a JSON payload
//! map for kind-specific data, and lifecycle timestamps. Status is mutated
//! only through [`crate::state_machine::TaskLifecycle`].

use crate::state_machine::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Open key/value map carrying kind-specific domain data
pub type Payload = serde_json::Map<String, Value>;

pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 100;

/// Work categories, each mapping to a required worker skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Receiving and putaway
    Inbound,
    /// Picking for shipment
    Outbound,
    /// Quality inspection
    Quality,
    /// Cycle counting
    Count,
    /// Internal stock transfer
    Transfer,
}

impl TaskKind {
    /// Skill category a worker needs for this kind of work
    pub fn required_skill_category(&self) -> &'static str {
        match self {
            Self::Inbound => "receiving",
            Self::Outbound => "picking",
            Self::Quality => "quality",
            Self::Count => "counting",
            Self::Transfer => "equipment",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
            Self::Quality => write!(f, "quality"),
            Self::Count => write!(f, "count"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

/// A warehouse work item with a status lifecycle and a bounded priority.
///
/// `assigned_worker_id` is set exactly while the task is in an assigned or
/// in-progress state (or paused out of one); the lifecycle service maintains
/// that invariant. Priority always stays within `[1, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub priority: i32,
    pub payload: Payload,
    pub assigned_worker_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Task {
    /// Create a pending task with default priority
    pub fn new(kind: TaskKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: TaskStatus::Pending,
            priority: MIN_PRIORITY,
            payload: Payload::new(),
            assigned_worker_id: None,
            created_at: Utc::now(),
            assigned_at: None,
            started_at: None,
            completed_at: None,
            notes: None,
        }
    }

    /// Builder-style priority, clamped to the valid range
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.set_priority(priority);
        self
    }

    /// Builder-style payload entry
    pub fn with_payload_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Clamp an arbitrary value into the valid priority range
    pub fn clamp_priority(value: i32) -> i32 {
        value.clamp(MIN_PRIORITY, MAX_PRIORITY)
    }

    /// Set priority, clamping rather than wrapping out-of-range values
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = Self::clamp_priority(priority);
    }

    /// Target zone carried in the payload, when the host recorded one
    pub fn zone_id(&self) -> Option<i64> {
        self.payload.get("zone_id").and_then(Value::as_i64)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
