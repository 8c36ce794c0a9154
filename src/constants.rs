//! # System Constants
//!
//! Core constants and enums that define the operational boundaries of the
//! warehouse scheduling and routing core: lifecycle event names, host-facing
//! defaults, status groupings, and the routing distance model.

pub use crate::state_machine::TaskStatus;

/// Lifecycle events emitted to the event sink collaborator
pub mod events {
    pub const TASK_CREATED: &str = "task.created";
    pub const TASK_ASSIGNED: &str = "task.assigned";
    pub const TASK_COMPLETED: &str = "task.completed";
    pub const TASK_FAILED: &str = "task.failed";
}

/// Documented defaults for host-sourced configuration
pub mod defaults {
    /// Seconds before the host should consider an in-flight task stuck
    pub const TASK_TIMEOUT_SECS: u64 = 3600;
    /// Whether batch scheduling runs without operator confirmation
    pub const AUTO_ASSIGN_ENABLED: bool = true;
    /// Upper bound on concurrently active tasks the host should enforce
    pub const MAX_CONCURRENT_TASKS: usize = 100;
    /// Pending-count threshold at which queue health degrades to warning
    pub const PENDING_WARNING_THRESHOLD: usize = 50;
}

/// Status groupings used by monitoring and store filters
pub mod status_groups {
    use crate::state_machine::TaskStatus;

    /// Statuses that count toward a worker's active workload
    pub const ACTIVE: [TaskStatus; 2] = [TaskStatus::Assigned, TaskStatus::InProgress];

    /// Terminal resolutions (exactly one per task)
    pub const TERMINAL: [TaskStatus; 3] = [
        TaskStatus::Completed,
        TaskStatus::Cancelled,
        TaskStatus::Failed,
    ];
}

/// Routing distance model for the zone/shelf/location hierarchy
pub mod routing {
    /// Average travel speed in distance-units per second
    pub const AVERAGE_TRAVEL_SPEED: f64 = 1.5;

    pub const SAME_LOCATION_DISTANCE: f64 = 0.0;
    pub const SAME_SHELF_DISTANCE: f64 = 1.0;
    pub const SAME_ZONE_DISTANCE: f64 = 3.0;
    /// Applies across zones and whenever hierarchy info is missing
    pub const CROSS_ZONE_DISTANCE: f64 = 10.0;

    // Tuning knobs for the `dynamic` strategy selector, preserved from
    // operational experience rather than derived from a model.
    pub const DYNAMIC_ZONE_RATIO: f64 = 2.0;
    pub const DYNAMIC_SHELF_THRESHOLD: usize = 3;
}

/// Reserved payload key recording the pre-pause status for `resume`
pub const PAUSED_FROM_KEY: &str = "__paused_from";
