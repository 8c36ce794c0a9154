//! # Path Optimizer
//!
//! Orders a set of storage locations into an efficient visiting sequence.
//! All strategies are heuristics over the hierarchy distance metric; none
//! of them claims optimality, but `shortest` is near-optimal on the small
//! pick lists this warehouse produces.

use super::distance::{route_distance, travel_distance};
use crate::constants::routing::{
    AVERAGE_TRAVEL_SPEED, DYNAMIC_SHELF_THRESHOLD, DYNAMIC_ZONE_RATIO,
};
use crate::models::LocationNode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Route ordering strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    /// Greedy nearest-neighbor from the first input location
    Shortest,
    /// Zone-by-zone sweep, nearest-neighbor within each zone
    SShape,
    /// Shelf-by-shelf sweep, ascending location id within each shelf
    ZShape,
    /// Pick a strategy from the shape of the input
    Dynamic,
    /// Identity: keep the input ordering
    Unoptimized,
}

impl RouteStrategy {
    /// Parse a strategy tag; unrecognized tags mean "leave the route alone"
    pub fn parse(tag: &str) -> Self {
        match tag {
            "shortest" => Self::Shortest,
            "s_shape" => Self::SShape,
            "z_shape" => Self::ZShape,
            "dynamic" => Self::Dynamic,
            _ => Self::Unoptimized,
        }
    }
}

impl fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortest => write!(f, "shortest"),
            Self::SShape => write!(f, "s_shape"),
            Self::ZShape => write!(f, "z_shape"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::Unoptimized => write!(f, "unoptimized"),
        }
    }
}

/// Optional constraints on a route computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConstraints {
    /// Truncate the route before the hop that would exceed this distance
    pub max_distance: Option<f64>,
    /// Locations in these zones are dropped before ordering
    pub avoid_zones: Vec<i64>,
    /// Echoed into the plan; enforcement is the host's responsibility
    pub equipment_restrictions: Vec<String>,
}

/// The computed visiting sequence and its cost profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub requested: RouteStrategy,
    /// The strategy actually applied (`dynamic` resolves to a concrete one)
    pub applied: RouteStrategy,
    pub sequence: Vec<LocationNode>,
    pub total_distance: f64,
    /// Distance of the input ordering over the same location set
    pub original_distance: f64,
    /// `total_distance / average speed`, in seconds
    pub estimated_seconds: f64,
    /// Percentage saved relative to the input ordering
    pub improvement_pct: f64,
    pub equipment_restrictions: Vec<String>,
}

/// Aggregate result of optimizing many independent location sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRouteReport {
    pub optimized_tasks: usize,
    /// Sets that yielded zero locations; excluded from the mean
    pub skipped_tasks: usize,
    pub total_distance: f64,
    pub total_estimated_seconds: f64,
    pub total_distance_saved: f64,
    pub mean_improvement_pct: f64,
    pub plans: Vec<(Uuid, RoutePlan)>,
}

/// Storage-hierarchy route optimizer
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOptimizer;

impl PathOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Order a location set under the given strategy.
    ///
    /// Zero or one locations produce a zero-cost plan with the sequence
    /// unchanged. Improvement is measured against the input ordering of the
    /// same (constraint-filtered) set.
    pub fn optimize(
        &self,
        locations: &[LocationNode],
        strategy: RouteStrategy,
        constraints: &RouteConstraints,
    ) -> RoutePlan {
        let retained: Vec<LocationNode> = locations
            .iter()
            .filter(|node| {
                node.zone_id
                    .is_none_or(|zone| !constraints.avoid_zones.contains(&zone))
            })
            .copied()
            .collect();

        if retained.len() <= 1 {
            return RoutePlan {
                requested: strategy,
                applied: strategy,
                sequence: retained,
                total_distance: 0.0,
                original_distance: 0.0,
                estimated_seconds: 0.0,
                improvement_pct: 0.0,
                equipment_restrictions: constraints.equipment_restrictions.clone(),
            };
        }

        let applied = match strategy {
            RouteStrategy::Dynamic => Self::select_dynamic(&retained),
            other => other,
        };

        let mut sequence = match applied {
            RouteStrategy::Shortest => nearest_neighbor(&retained),
            RouteStrategy::SShape => s_shape(&retained),
            RouteStrategy::ZShape => z_shape(&retained),
            RouteStrategy::Dynamic | RouteStrategy::Unoptimized => retained.clone(),
        };

        if let Some(max_distance) = constraints.max_distance {
            sequence = truncate_by_distance(sequence, max_distance);
        }

        let original_distance = route_distance(&retained);
        let total_distance = route_distance(&sequence);
        let improvement_pct = if original_distance > 0.0 {
            (original_distance - total_distance) / original_distance * 100.0
        } else {
            0.0
        };

        debug!(
            requested = %strategy,
            applied = %applied,
            locations = retained.len(),
            total_distance,
            improvement_pct,
            "route optimized"
        );

        RoutePlan {
            requested: strategy,
            applied,
            sequence,
            total_distance,
            original_distance,
            estimated_seconds: total_distance / AVERAGE_TRAVEL_SPEED,
            improvement_pct,
            equipment_restrictions: constraints.equipment_restrictions.clone(),
        }
    }

    /// Optimize many independent per-task location sets with one strategy.
    pub fn optimize_batch(
        &self,
        sets: &[(Uuid, Vec<LocationNode>)],
        strategy: RouteStrategy,
        constraints: &RouteConstraints,
    ) -> BatchRouteReport {
        let mut report = BatchRouteReport {
            optimized_tasks: 0,
            skipped_tasks: 0,
            total_distance: 0.0,
            total_estimated_seconds: 0.0,
            total_distance_saved: 0.0,
            mean_improvement_pct: 0.0,
            plans: Vec::with_capacity(sets.len()),
        };

        let mut improvement_sum = 0.0;
        for (task_id, locations) in sets {
            if locations.is_empty() {
                report.skipped_tasks += 1;
                continue;
            }
            let plan = self.optimize(locations, strategy, constraints);
            report.optimized_tasks += 1;
            report.total_distance += plan.total_distance;
            report.total_estimated_seconds += plan.estimated_seconds;
            report.total_distance_saved += plan.original_distance - plan.total_distance;
            improvement_sum += plan.improvement_pct;
            report.plans.push((*task_id, plan));
        }

        if report.optimized_tasks > 0 {
            report.mean_improvement_pct = improvement_sum / report.optimized_tasks as f64;
        }
        report
    }

    /// Heuristic strategy selection for `dynamic`. The thresholds are tuning
    /// knobs preserved from operational use, not derived constants.
    fn select_dynamic(nodes: &[LocationNode]) -> RouteStrategy {
        let zones: HashSet<i64> = nodes.iter().filter_map(|node| node.zone_id).collect();
        let shelves: HashSet<i64> = nodes.iter().filter_map(|node| node.shelf_id).collect();

        if zones.len() > 1 && shelves.len() as f64 / zones.len() as f64 > DYNAMIC_ZONE_RATIO {
            RouteStrategy::SShape
        } else if shelves.len() > DYNAMIC_SHELF_THRESHOLD {
            RouteStrategy::ZShape
        } else {
            RouteStrategy::Shortest
        }
    }
}

/// Greedy nearest-neighbor starting at the first input location. Ties go to
/// the earlier input position.
fn nearest_neighbor(input: &[LocationNode]) -> Vec<LocationNode> {
    let mut remaining = input.to_vec();
    let mut ordered = Vec::with_capacity(remaining.len());
    ordered.push(remaining.remove(0));

    while !remaining.is_empty() {
        let current = *ordered.last().expect("ordered starts non-empty");
        let mut best_index = 0;
        let mut best_distance = travel_distance(&current, &remaining[0]);
        for (index, candidate) in remaining.iter().enumerate().skip(1) {
            let distance = travel_distance(&current, candidate);
            if distance < best_distance {
                best_index = index;
                best_distance = distance;
            }
        }
        ordered.push(remaining.remove(best_index));
    }
    ordered
}

/// Group by zone in first-encounter order, nearest-neighbor within each
/// group. Locations with no zone form their own group.
fn s_shape(input: &[LocationNode]) -> Vec<LocationNode> {
    let (keys, mut groups) = group_by(input, |node| node.zone_id);
    let mut ordered = Vec::with_capacity(input.len());
    for key in keys {
        let group = groups.remove(&key).expect("key recorded with group");
        if group.len() > 1 {
            ordered.extend(nearest_neighbor(&group));
        } else {
            ordered.extend(group);
        }
    }
    ordered
}

/// Group by shelf in first-encounter order, ascending location id within
/// each group.
fn z_shape(input: &[LocationNode]) -> Vec<LocationNode> {
    let (keys, mut groups) = group_by(input, |node| node.shelf_id);
    let mut ordered = Vec::with_capacity(input.len());
    for key in keys {
        let mut group = groups.remove(&key).expect("key recorded with group");
        group.sort_by_key(|node| node.location_id);
        ordered.extend(group);
    }
    ordered
}

fn group_by(
    input: &[LocationNode],
    key_fn: impl Fn(&LocationNode) -> Option<i64>,
) -> (Vec<Option<i64>>, HashMap<Option<i64>, Vec<LocationNode>>) {
    let mut keys = Vec::new();
    let mut groups: HashMap<Option<i64>, Vec<LocationNode>> = HashMap::new();
    for node in input {
        let key = key_fn(node);
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            keys.push(key);
        }
        group.push(*node);
    }
    (keys, groups)
}

/// Keep the longest prefix whose cumulative distance stays within the cap
fn truncate_by_distance(sequence: Vec<LocationNode>, max_distance: f64) -> Vec<LocationNode> {
    let mut kept = Vec::with_capacity(sequence.len());
    let mut running = 0.0;
    for node in sequence {
        if let Some(last) = kept.last() {
            let hop = travel_distance(last, &node);
            if running + hop > max_distance {
                break;
            }
            running += hop;
        }
        kept.push(node);
    }
    kept
}
