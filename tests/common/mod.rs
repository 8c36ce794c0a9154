//! Shared fixtures for integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::Arc;

use serde_json::json;
use wms_core::collaborators::{InMemoryTaskStore, InMemoryWorkerDirectory};
use wms_core::events::EventPublisher;
use wms_core::models::{Task, TaskKind, WorkerProfile};
use wms_core::scheduling::WorkerMatcher;
use wms_core::state_machine::TaskLifecycle;

/// Fully wired in-memory engine for a single test.
pub struct TestHarness {
    pub store: Arc<InMemoryTaskStore>,
    pub directory: Arc<InMemoryWorkerDirectory>,
    pub lifecycle: Arc<TaskLifecycle>,
    pub matcher: Arc<WorkerMatcher>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = InMemoryTaskStore::new();
        let directory = InMemoryWorkerDirectory::new(store.clone());
        let lifecycle = Arc::new(TaskLifecycle::new(store.clone(), EventPublisher::default()));
        let matcher = Arc::new(WorkerMatcher::new(directory.clone()));
        Self {
            store,
            directory,
            lifecycle,
            matcher,
        }
    }

    /// Insert a pending task and return it.
    pub fn seed_task(&self, kind: TaskKind, priority: i32) -> Task {
        let task = Task::new(kind).with_priority(priority);
        self.store.insert(task.clone());
        task
    }

    /// Insert a pending task whose payload pins it to a zone.
    pub fn seed_task_in_zone(&self, kind: TaskKind, priority: i32, zone_id: i64) -> Task {
        let task = Task::new(kind)
            .with_priority(priority)
            .with_payload_entry("zone_id", json!(zone_id));
        self.store.insert(task.clone());
        task
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Active picker with strong skills, the usual best match.
pub fn picker(worker_id: &str) -> WorkerProfile {
    WorkerProfile::new(worker_id, "picking").with_skill(4, 85)
}

/// Active receiver for inbound work.
pub fn receiver(worker_id: &str) -> WorkerProfile {
    WorkerProfile::new(worker_id, "receiving").with_skill(3, 70)
}
