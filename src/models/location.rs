//! # Storage Hierarchy
//!
//! Three-level physical hierarchy: a `Location` belongs to exactly one
//! `Shelf`, which belongs to exactly one `Zone`. Routing operates on
//! [`LocationNode`] snapshots with the shelf and zone already resolved, so
//! the distance metric stays a pure function.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub shelf_id: i64,
    pub zone_id: i64,
}

/// A storage location record as the hierarchy collaborator stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: i64,
    pub shelf_id: Option<i64>,
}

/// A location with its hierarchy resolved, as routing consumes it.
///
/// Either level may be absent when the hierarchy is incomplete; missing
/// information pessimistically reads as maximum travel distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationNode {
    pub location_id: i64,
    pub shelf_id: Option<i64>,
    pub zone_id: Option<i64>,
}

impl LocationNode {
    /// A location with no hierarchy information
    pub fn detached(location_id: i64) -> Self {
        Self {
            location_id,
            shelf_id: None,
            zone_id: None,
        }
    }

    /// A fully resolved location
    pub fn on_shelf(location_id: i64, shelf_id: i64, zone_id: i64) -> Self {
        Self {
            location_id,
            shelf_id: Some(shelf_id),
            zone_id: Some(zone_id),
        }
    }
}
