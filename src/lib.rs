#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # WMS Core Rust
//!
//! Warehouse scheduling and routing core: priority-aware task assignment,
//! skill-based worker matching, and storage-hierarchy route optimization.
//!
//! ## Overview
//!
//! This crate is the embeddable engine behind a warehouse management
//! system. Host applications supply the persistence and directory
//! collaborators; the engine owns task lifecycle rules, batch
//! scheduling, urgent-task insertion, priority recalculation, queue
//! monitoring, and picking-route optimization over the
//! zone / shelf / location storage hierarchy.
//!
//! ## Module Organization
//!
//! - [`models`] - Tasks, worker profiles, and storage hierarchy types
//! - [`state_machine`] - Task lifecycle transitions with at-most-once assignment
//! - [`scheduling`] - Worker matching, batch passes, urgency, monitoring
//! - [`routing`] - Route strategies and the hierarchy distance metric
//! - [`collaborators`] - Host-supplied store and directory traits, plus
//!   in-memory implementations for tests and small deployments
//! - [`events`] - Lifecycle event broadcast
//! - [`config`] - Constraint and weight configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wms_core::collaborators::{InMemoryTaskStore, InMemoryWorkerDirectory};
//! use wms_core::events::EventPublisher;
//! use wms_core::models::{Task, TaskKind, WorkerProfile};
//! use wms_core::scheduling::{BatchScheduler, WorkerMatcher};
//! use wms_core::state_machine::TaskLifecycle;
//!
//! # async fn example() -> wms_core::Result<()> {
//! let store = InMemoryTaskStore::new();
//! let directory = InMemoryWorkerDirectory::new(store.clone());
//! directory.insert(WorkerProfile::new("w-1", "picking").with_skill(4, 85));
//! let task = Task::new(TaskKind::Outbound).with_priority(90);
//! store.insert(task.clone());
//!
//! let lifecycle = Arc::new(TaskLifecycle::new(store, EventPublisher::default()));
//! let matcher = Arc::new(WorkerMatcher::new(directory));
//! let scheduler = BatchScheduler::new(matcher, lifecycle);
//! let outcome = scheduler.schedule(vec![task], &Default::default()).await;
//! println!("assigned {} of {}", outcome.assigned.len(), outcome.total_tasks);
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod routing;
pub mod scheduling;
pub mod state_machine;

pub use config::{
    CoreConfig, MatchWeights, MonitorConfig, SchedulingConstraints, UrgencyConfig, UrgencyLevel,
};
pub use constants::{defaults, events as system_events, routing as routing_constants};
pub use error::{Result, WmsError};
pub use models::{Task, TaskKind, WorkerProfile};
pub use state_machine::{TaskEvent, TaskLifecycle, TaskStatus};
