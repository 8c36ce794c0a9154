//! DashMap-backed collaborator implementations.
//!
//! Used by the integration tests and by hosts that keep scheduling state in
//! process. Each map entry is cloned out before any await point, so the
//! shard locks are never held across suspensions.

use super::{CollaboratorError, LocationResolver, TaskFilter, TaskStore, WorkerDirectory,
            WorkerFilter};
use crate::models::{Location, LocationNode, Shelf, Task, WorkerProfile, Zone};
use crate::state_machine::TaskStatus;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory task store
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: DashMap<Uuid, Task>,
}

impl InMemoryTaskStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Synchronous insert for fixtures and host bootstrap
    pub fn insert(&self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Snapshot of every task, unordered
    pub fn all(&self) -> Vec<Task> {
        self.tasks.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find(&self, id: Uuid) -> Result<Option<Task>, CollaboratorError> {
        Ok(self.tasks.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, task: Task) -> Result<(), CollaboratorError> {
        self.tasks.insert(task.id, task);
        Ok(())
    }

    async fn find_by_status(
        &self,
        status: TaskStatus,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, CollaboratorError> {
        let mut matching: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| entry.value().status == status)
            .map(|entry| entry.value().clone())
            .collect();
        // Stable output ordering for deterministic scheduling passes
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn count(&self, filter: TaskFilter) -> Result<usize, CollaboratorError> {
        Ok(self
            .tasks
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count())
    }
}

/// In-memory worker directory backed by the task store for load counts
#[derive(Debug)]
pub struct InMemoryWorkerDirectory {
    workers: DashMap<String, WorkerProfile>,
    performance: DashMap<String, f64>,
    store: Arc<InMemoryTaskStore>,
}

impl InMemoryWorkerDirectory {
    pub fn new(store: Arc<InMemoryTaskStore>) -> Arc<Self> {
        Arc::new(Self {
            workers: DashMap::new(),
            performance: DashMap::new(),
            store,
        })
    }

    pub fn insert(&self, profile: WorkerProfile) {
        self.workers.insert(profile.worker_id.clone(), profile);
    }

    pub fn set_performance(&self, worker_id: impl Into<String>, score: f64) {
        self.performance.insert(worker_id.into(), score.clamp(0.0, 1.0));
    }
}

#[async_trait]
impl WorkerDirectory for InMemoryWorkerDirectory {
    async fn find_active_workers(
        &self,
        filter: WorkerFilter,
    ) -> Result<Vec<WorkerProfile>, CollaboratorError> {
        let mut profiles: Vec<WorkerProfile> = self
            .workers
            .iter()
            .filter(|entry| entry.value().active)
            .filter(|entry| {
                filter
                    .skill_category
                    .as_ref()
                    .is_none_or(|category| &entry.value().skill_category == category)
            })
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        Ok(profiles)
    }

    async fn current_active_task_count(
        &self,
        worker_id: &str,
    ) -> Result<usize, CollaboratorError> {
        Ok(self
            .store
            .all()
            .iter()
            .filter(|task| {
                task.is_active() && task.assigned_worker_id.as_deref() == Some(worker_id)
            })
            .count())
    }

    async fn performance_score(&self, worker_id: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(self.performance.get(worker_id).map(|entry| *entry.value()))
    }
}

/// In-memory zone/shelf/location hierarchy
#[derive(Debug, Default)]
pub struct InMemoryLocationIndex {
    zones: DashMap<i64, Zone>,
    shelves: DashMap<i64, Shelf>,
    locations: DashMap<i64, Location>,
}

impl InMemoryLocationIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_zone(&self, zone_id: i64, name: impl Into<String>) {
        self.zones.insert(
            zone_id,
            Zone {
                zone_id,
                name: name.into(),
            },
        );
    }

    pub fn add_shelf(&self, shelf_id: i64, zone_id: i64) {
        self.shelves.insert(shelf_id, Shelf { shelf_id, zone_id });
    }

    pub fn add_location(&self, location_id: i64, shelf_id: Option<i64>) {
        self.locations
            .insert(location_id, Location { location_id, shelf_id });
    }
}

#[async_trait]
impl LocationResolver for InMemoryLocationIndex {
    async fn resolve(&self, location_id: i64) -> Result<Option<LocationNode>, CollaboratorError> {
        let Some(location) = self.locations.get(&location_id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        let shelf_id = location.shelf_id;
        let zone_id = match shelf_id {
            Some(shelf_id) => self.shelves.get(&shelf_id).map(|shelf| shelf.zone_id),
            None => None,
        };
        Ok(Some(LocationNode {
            location_id,
            shelf_id,
            zone_id,
        }))
    }

    async fn zone_of_shelf(&self, shelf_id: i64) -> Result<Option<i64>, CollaboratorError> {
        Ok(self.shelves.get(&shelf_id).map(|shelf| shelf.zone_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKind;

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = InMemoryTaskStore::new();
        let task = Task::new(TaskKind::Inbound);
        let id = task.id;
        store.save(task).await.unwrap();

        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.find(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_status_ordering_and_limit() {
        let store = InMemoryTaskStore::new();
        for _ in 0..5 {
            store.insert(Task::new(TaskKind::Outbound));
        }
        let pending = store.find_by_status(TaskStatus::Pending, None).await.unwrap();
        assert_eq!(pending.len(), 5);
        assert!(pending.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let limited = store
            .find_by_status(TaskStatus::Pending, Some(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_directory_counts_active_tasks() {
        let store = InMemoryTaskStore::new();
        let directory = InMemoryWorkerDirectory::new(store.clone());
        directory.insert(WorkerProfile::new("w-1", "picking"));

        let mut task = Task::new(TaskKind::Outbound);
        task.status = TaskStatus::Assigned;
        task.assigned_worker_id = Some("w-1".to_string());
        store.insert(task);

        assert_eq!(directory.current_active_task_count("w-1").await.unwrap(), 1);
        assert_eq!(directory.current_active_task_count("w-2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_directory_filters_inactive() {
        let store = InMemoryTaskStore::new();
        let directory = InMemoryWorkerDirectory::new(store);
        directory.insert(WorkerProfile::new("w-1", "picking"));
        directory.insert(WorkerProfile::new("w-2", "picking").inactive());

        let active = directory
            .find_active_workers(WorkerFilter::default())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].worker_id, "w-1");
    }

    #[tokio::test]
    async fn test_location_resolution() {
        let index = InMemoryLocationIndex::new();
        index.add_zone(1, "Zone A");
        index.add_shelf(10, 1);
        index.add_location(100, Some(10));
        index.add_location(200, None);

        let resolved = index.resolve(100).await.unwrap().unwrap();
        assert_eq!(resolved, LocationNode::on_shelf(100, 10, 1));

        let orphan = index.resolve(200).await.unwrap().unwrap();
        assert_eq!(orphan.zone_id, None);

        assert!(index.resolve(999).await.unwrap().is_none());
        assert_eq!(index.zone_of_shelf(10).await.unwrap(), Some(1));
    }
}
