//! Lifecycle event publishing.
//!
//! The core returns outcome objects and emits fire-and-forget events; it
//! never depends on anyone consuming them.

pub mod publisher;

pub use publisher::{EventPublisher, LifecycleEvent};
