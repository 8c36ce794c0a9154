//! Task lifecycle state machine.
//!
//! Typed states and events with a transition table and guard checks; the
//! lifecycle service serializes the check-and-mutate step per task to give
//! the at-most-once assignment guarantee.

pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::TaskEvent;
pub use lifecycle::TaskLifecycle;
pub use states::TaskStatus;
