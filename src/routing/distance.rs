use crate::constants::routing::{
    CROSS_ZONE_DISTANCE, SAME_LOCATION_DISTANCE, SAME_SHELF_DISTANCE, SAME_ZONE_DISTANCE,
};
use crate::models::LocationNode;

/// Travel distance between two locations in the storage hierarchy.
///
/// Symmetric and non-negative: 0 for the same location, 1 within a shelf,
/// 3 within a zone, 10 across zones or whenever either side is missing
/// hierarchy information.
pub fn travel_distance(a: &LocationNode, b: &LocationNode) -> f64 {
    if a.location_id == b.location_id {
        return SAME_LOCATION_DISTANCE;
    }
    if let (Some(shelf_a), Some(shelf_b)) = (a.shelf_id, b.shelf_id) {
        if shelf_a == shelf_b {
            return SAME_SHELF_DISTANCE;
        }
    }
    if let (Some(zone_a), Some(zone_b)) = (a.zone_id, b.zone_id) {
        if zone_a == zone_b {
            return SAME_ZONE_DISTANCE;
        }
    }
    CROSS_ZONE_DISTANCE
}

/// Total distance along a visiting sequence
pub fn route_distance(sequence: &[LocationNode]) -> f64 {
    sequence
        .windows(2)
        .map(|pair| travel_distance(&pair[0], &pair[1]))
        .sum()
}
