//! Route optimization over the zone/shelf/location hierarchy.

pub mod distance;
pub mod optimizer;

pub use distance::{route_distance, travel_distance};
pub use optimizer::{
    BatchRouteReport, PathOptimizer, RouteConstraints, RoutePlan, RouteStrategy,
};
