//! Worker skill profile, owned by an external HR/skills collaborator and
//! treated as read-only input to matching.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MIN_SKILL_LEVEL: u8 = 1;
pub const MAX_SKILL_LEVEL: u8 = 5;
pub const MAX_SKILL_SCORE: u8 = 100;

/// A worker's skill and availability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub worker_id: String,
    /// Skill tag such as "picking", "quality", "equipment"
    pub skill_category: String,
    /// Coarse proficiency, 1..=5
    pub skill_level: u8,
    /// Fine-grained proficiency, 1..=100
    pub skill_score: u8,
    /// Only active profiles are eligible for matching
    pub active: bool,
    pub certifications: serde_json::Map<String, Value>,
    /// Last known zone, used for the location proximity sub-score
    pub last_zone_id: Option<i64>,
}

impl WorkerProfile {
    pub fn new(worker_id: impl Into<String>, skill_category: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            skill_category: skill_category.into(),
            skill_level: MIN_SKILL_LEVEL,
            skill_score: 50,
            active: true,
            certifications: serde_json::Map::new(),
            last_zone_id: None,
        }
    }

    pub fn with_skill(mut self, level: u8, score: u8) -> Self {
        self.skill_level = level.clamp(MIN_SKILL_LEVEL, MAX_SKILL_LEVEL);
        self.skill_score = score.clamp(1, MAX_SKILL_SCORE);
        self
    }

    pub fn with_zone(mut self, zone_id: i64) -> Self {
        self.last_zone_id = Some(zone_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
