use crate::models::Task;
use serde_json::Value;

/// Ordering and analysis strategy for scheduling passes.
///
/// Replaces the optional "full scheduling engine" collaborator with an
/// explicit interface: hosts with a richer engine implement this trait,
/// everyone else gets [`BasicSchedulingStrategy`] and the documented basic
/// mode, with no null-checks at the call sites.
pub trait SchedulingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Order a pending snapshot for assignment, most deserving first
    fn order_pending(&self, tasks: &mut Vec<Task>);

    /// Richer queue analysis; `None` means basic stats only
    fn queue_insights(&self, _pending: &[Task]) -> Option<Value> {
        None
    }
}

/// Default strategy: plain priority sort, no insights
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSchedulingStrategy;

impl SchedulingStrategy for BasicSchedulingStrategy {
    fn name(&self) -> &'static str {
        "basic"
    }

    /// Priority descending, then creation time ascending for fairness
    fn order_pending(&self, tasks: &mut Vec<Task>) {
        tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
    }
}
