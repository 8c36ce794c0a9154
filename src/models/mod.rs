//! Data model: tasks, worker profiles, and the storage hierarchy.

pub mod location;
pub mod task;
pub mod worker;

pub use location::{Location, LocationNode, Shelf, Zone};
pub use task::{Payload, Task, TaskKind, MAX_PRIORITY, MIN_PRIORITY};
pub use worker::WorkerProfile;
