//! Integration tests for the task lifecycle service: the at-most-once
//! assignment guarantee under real concurrency, and the lifecycle event
//! stream as a subscriber observes it.

mod common;

use common::TestHarness;
use serde_json::json;
use wms_core::collaborators::TaskStore;
use wms_core::models::{Payload, TaskKind};
use wms_core::state_machine::{StateMachineError, TaskStatus};
use wms_core::system_events;

#[tokio::test]
async fn test_concurrent_assign_commits_exactly_once() {
    let harness = TestHarness::new();
    let task = harness.seed_task(TaskKind::Outbound, 80);

    // Both assigns target the same pending task at the same time. The
    // per-task lock serializes them; the loser sees Assigned and fails.
    let first = {
        let lifecycle = harness.lifecycle.clone();
        let id = task.id;
        tokio::spawn(async move { lifecycle.assign(id, "w-1").await })
    };
    let second = {
        let lifecycle = harness.lifecycle.clone();
        let id = task.id;
        tokio::spawn(async move { lifecycle.assign(id, "w-2").await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1);

    let losing = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .unwrap();
    assert!(matches!(
        losing,
        StateMachineError::InvalidTransition {
            current: TaskStatus::Assigned,
            attempted: "assign",
            ..
        }
    ));

    // The committed worker is whichever task won, never a blend
    let stored = harness.store.find(task.id).await.unwrap().unwrap();
    let worker = stored.assigned_worker_id.as_deref().unwrap();
    assert!(worker == "w-1" || worker == "w-2");
}

#[tokio::test]
async fn test_full_lifecycle_walk() {
    let harness = TestHarness::new();
    let task = harness.seed_task(TaskKind::Inbound, 60);

    harness.lifecycle.assign(task.id, "w-9").await.unwrap();
    harness.lifecycle.start(task.id).await.unwrap();
    harness.lifecycle.pause(task.id, "lunch").await.unwrap();
    let resumed = harness.lifecycle.resume(task.id).await.unwrap();
    assert_eq!(resumed.status, TaskStatus::InProgress);

    let mut result = Payload::new();
    result.insert("putaway_location".to_string(), json!(412));
    let completed = harness.lifecycle.complete(task.id, result).await.unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);
    assert!(completed.assigned_worker_id.is_none());

    // Terminal means terminal
    assert!(harness.lifecycle.start(task.id).await.is_err());
    assert!(harness.lifecycle.cancel(task.id, "no").await.is_err());
}

#[tokio::test]
async fn test_assignment_event_carries_worker_actor() {
    let harness = TestHarness::new();
    let mut events = harness.lifecycle.publisher().subscribe();
    let task = harness.seed_task(TaskKind::Outbound, 70);

    harness.lifecycle.assign(task.id, "w-5").await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.name, system_events::TASK_ASSIGNED);
    assert_eq!(event.actor, "w-5");
    assert_eq!(event.task.id, task.id);
    assert_eq!(event.context["from"], json!("pending"));
}

#[tokio::test]
async fn test_failure_event_carries_error_context() {
    let harness = TestHarness::new();
    let task = harness.seed_task(TaskKind::Transfer, 50);
    harness.lifecycle.assign(task.id, "w-2").await.unwrap();

    let mut events = harness.lifecycle.publisher().subscribe();
    harness
        .lifecycle
        .fail(task.id, "pallet damaged")
        .await
        .unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.name, system_events::TASK_FAILED);
    assert_eq!(event.context["error"], json!("pallet damaged"));
}

#[tokio::test]
async fn test_publishing_without_subscribers_still_transitions() {
    let harness = TestHarness::new();
    let task = harness.seed_task(TaskKind::Quality, 40);

    // No receiver anywhere; transitions must not care
    let assigned = harness.lifecycle.assign(task.id, "w-1").await.unwrap();
    assert_eq!(assigned.status, TaskStatus::Assigned);
}
