//! # Worker Matcher
//!
//! Skill-based assignment scoring. For a task and the pool of active worker
//! profiles, each candidate gets a composite of four normalized sub-scores
//! (skill, workload, location, performance); the highest composite wins,
//! ties broken by lower current workload and then by worker id so repeated
//! runs over the same pool pick the same worker.
//!
//! An empty candidate pool is a normal outcome (`Ok(None)`), not an error:
//! escalation belongs to the caller.

use crate::collaborators::{CollaboratorError, WorkerDirectory, WorkerFilter};
use crate::config::{MatchWeights, SchedulingConstraints};
use crate::constants::routing::CROSS_ZONE_DISTANCE;
use crate::models::worker::{MAX_SKILL_LEVEL, MAX_SKILL_SCORE};
use crate::models::{Task, WorkerProfile};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const SCORE_EPSILON: f64 = 1e-9;
/// Historical completion quality when the directory has no record
const NEUTRAL_PERFORMANCE: f64 = 0.5;
/// Location sub-score when either zone is unknown
const NEUTRAL_LOCATION: f64 = 0.5;

/// Per-request matching options
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub exclude_workers: Vec<String>,
    /// Candidates at or above this active-task count are ineligible
    pub max_tasks_per_worker: Option<usize>,
    /// Weight overrides; re-normalized defensively
    pub weights: Option<MatchWeights>,
    /// Urgent preemption path: score as if every candidate were idle
    pub ignore_workload: bool,
}

impl MatchOptions {
    pub fn from_constraints(constraints: &SchedulingConstraints) -> Self {
        Self {
            exclude_workers: constraints.exclude_workers.clone(),
            max_tasks_per_worker: constraints.max_tasks_per_worker,
            weights: None,
            ignore_workload: false,
        }
    }
}

/// Required-vs-matched skill attributes for the winning candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub required_category: String,
    pub matched_category: String,
    pub category_match: bool,
    pub skill_level: u8,
    pub skill_score: u8,
}

/// The four sub-scores behind a composite match score, each in `[0,1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: f64,
    pub workload: f64,
    pub location: f64,
    pub performance: f64,
}

/// A successful match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerMatch {
    pub worker_id: String,
    pub match_score: f64,
    pub assignment_reason: String,
    pub skill_analysis: SkillAnalysis,
    pub breakdown: ScoreBreakdown,
    pub current_workload: usize,
}

/// Skill-based worker selection over the directory collaborator
pub struct WorkerMatcher {
    directory: Arc<dyn WorkerDirectory>,
    weights: MatchWeights,
}

impl WorkerMatcher {
    pub fn new(directory: Arc<dyn WorkerDirectory>) -> Self {
        Self {
            directory,
            weights: MatchWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights.normalized();
        self
    }

    /// Score every eligible candidate and pick the best.
    ///
    /// Candidate workload and performance lookups run concurrently; the
    /// decision itself is a pure fold over the scored pool.
    pub async fn find_best_match(
        &self,
        task: &Task,
        options: &MatchOptions,
    ) -> Result<Option<WorkerMatch>, CollaboratorError> {
        let mut weights = options.weights.map_or(self.weights, MatchWeights::normalized);
        if options.ignore_workload {
            weights.workload = 0.0;
            weights = weights.normalized();
        }

        let candidates: Vec<WorkerProfile> = self
            .directory
            .find_active_workers(WorkerFilter::default())
            .await?
            .into_iter()
            .filter(|profile| !options.exclude_workers.contains(&profile.worker_id))
            .collect();

        if candidates.is_empty() {
            debug!(task_id = %task.id, kind = %task.kind, "no active candidates for task");
            return Ok(None);
        }

        let lookups = candidates.into_iter().map(|profile| {
            let directory = self.directory.clone();
            async move {
                let workload = directory
                    .current_active_task_count(&profile.worker_id)
                    .await?;
                let performance = directory
                    .performance_score(&profile.worker_id)
                    .await?
                    .unwrap_or(NEUTRAL_PERFORMANCE);
                Ok::<_, CollaboratorError>((profile, workload, performance))
            }
        });

        let task_zone = task.zone_id();
        let required_category = task.kind.required_skill_category();
        let mut best: Option<WorkerMatch> = None;

        for lookup in join_all(lookups).await {
            let (profile, workload, performance) = lookup?;
            if options
                .max_tasks_per_worker
                .is_some_and(|max| workload >= max)
            {
                continue;
            }

            let (skill, category_match) = skill_subscore(required_category, &profile);
            let breakdown = ScoreBreakdown {
                skill,
                workload: if options.ignore_workload {
                    1.0
                } else {
                    workload_subscore(workload)
                },
                location: location_subscore(task_zone, profile.last_zone_id),
                performance,
            };
            let match_score = weights.skill * breakdown.skill
                + weights.workload * breakdown.workload
                + weights.location * breakdown.location
                + weights.performance * breakdown.performance;

            let candidate = WorkerMatch {
                assignment_reason: assignment_reason(
                    &profile,
                    required_category,
                    category_match,
                    match_score,
                    workload,
                ),
                skill_analysis: SkillAnalysis {
                    required_category: required_category.to_string(),
                    matched_category: profile.skill_category.clone(),
                    category_match,
                    skill_level: profile.skill_level,
                    skill_score: profile.skill_score,
                },
                worker_id: profile.worker_id,
                match_score,
                breakdown,
                current_workload: workload,
            };

            let take = match &best {
                None => true,
                Some(current) => {
                    if candidate.match_score > current.match_score + SCORE_EPSILON {
                        true
                    } else if (candidate.match_score - current.match_score).abs() <= SCORE_EPSILON {
                        candidate.current_workload < current.current_workload
                            || (candidate.current_workload == current.current_workload
                                && candidate.worker_id < current.worker_id)
                    } else {
                        false
                    }
                }
            };
            if take {
                best = Some(candidate);
            }
        }

        match &best {
            Some(winner) => info!(
                task_id = %task.id,
                worker_id = winner.worker_id.as_str(),
                match_score = winner.match_score,
                "selected worker for task"
            ),
            None => debug!(task_id = %task.id, "all candidates filtered out"),
        }
        Ok(best)
    }
}

/// Category match dominates; proficiency refines within the band. A worker
/// in the wrong category can still score a little on raw level, which keeps
/// desperate pools rankable.
fn skill_subscore(required_category: &str, profile: &WorkerProfile) -> (f64, bool) {
    let proficiency = 0.5 * (f64::from(profile.skill_level) / f64::from(MAX_SKILL_LEVEL))
        + 0.5 * (f64::from(profile.skill_score) / f64::from(MAX_SKILL_SCORE));
    if profile.skill_category == required_category {
        (0.5 + 0.5 * proficiency, true)
    } else {
        (0.2 * proficiency, false)
    }
}

/// Fewer active tasks, higher score
fn workload_subscore(active_tasks: usize) -> f64 {
    1.0 / (1.0 + active_tasks as f64)
}

/// Zone proximity via the routing metric, inverted and normalized. Unknown
/// zones on either side read as neutral rather than maximally distant.
fn location_subscore(task_zone: Option<i64>, worker_zone: Option<i64>) -> f64 {
    match (task_zone, worker_zone) {
        (Some(task_zone), Some(worker_zone)) => {
            let distance = if task_zone == worker_zone {
                0.0
            } else {
                CROSS_ZONE_DISTANCE
            };
            1.0 - distance / CROSS_ZONE_DISTANCE
        }
        _ => NEUTRAL_LOCATION,
    }
}

fn assignment_reason(
    profile: &WorkerProfile,
    required_category: &str,
    category_match: bool,
    match_score: f64,
    workload: usize,
) -> String {
    let category_note = if category_match {
        format!("matches required category '{required_category}'")
    } else {
        format!(
            "category '{}' substitutes for required '{required_category}'",
            profile.skill_category
        )
    };
    format!(
        "{} {} at level {} (score {}), composite {:.3}, {} active task(s)",
        profile.worker_id, category_note, profile.skill_level, profile.skill_score, match_score,
        workload
    )
}
