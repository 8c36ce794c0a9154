//! Task scheduling: worker matching, batch assignment, priority
//! recalculation, urgent insertion, and queue monitoring.

pub mod batch;
pub mod matcher;
pub mod monitor;
pub mod priority;
pub mod strategy;
pub mod urgent;

pub use batch::{AssignmentRecord, BatchOutcome, BatchScheduler, BatchSkip};
pub use matcher::{MatchOptions, ScoreBreakdown, SkillAnalysis, WorkerMatch, WorkerMatcher};
pub use monitor::{QueueHealth, QueueMonitor, QueueSnapshot};
pub use priority::{PriorityCalculator, PriorityChange, PriorityContext, PriorityRecalculation};
pub use strategy::{BasicSchedulingStrategy, SchedulingStrategy};
pub use urgent::{UrgentOutcome, UrgentTaskHandler};
