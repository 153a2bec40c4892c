//! Route estimation: three addresses in, driving distance out.
//!
//! The planner only needs one number from routing (the total distance
//! of origin → pickup → dropoff), so providers sit behind the
//! [`RouteEstimator`] trait and the rule engine never sees the network.

mod openroute;

pub use openroute::OpenRouteService;

use tracing::debug;

use crate::model::Coordinate;
use crate::rules::HosRules;

/// Errors from a routing provider. Passed to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("geocoding failed for address: {0}")]
    Geocoding(String),

    #[error("directions failed: {0}")]
    Directions(String),

    #[error("routing provider unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected routing response: {0}")]
    Response(#[from] serde_json::Error),
}

/// What a provider knows about a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEstimate {
    /// Resolved `[origin, pickup, dropoff]`, when the provider geocodes.
    pub waypoints: Vec<Coordinate>,
    pub distance_miles: f64,
}

/// A source of route distances.
pub trait RouteEstimator {
    /// Distance of the route origin → pickup → dropoff.
    fn estimate(
        &self,
        origin: &str,
        pickup: &str,
        dropoff: &str,
    ) -> Result<RouteEstimate, RoutingError>;
}

/// Route distance converted into the driving time the rule engine plans.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingEstimate {
    pub hours: f64,
    pub distance_miles: f64,
    pub waypoints: Vec<Coordinate>,
}

/// Asks `estimator` for the route and converts it to driving hours at the
/// rule set's average speed.
pub fn estimate_driving_hours(
    estimator: &dyn RouteEstimator,
    rules: &HosRules,
    origin: &str,
    pickup: &str,
    dropoff: &str,
) -> Result<DrivingEstimate, RoutingError> {
    let route = estimator.estimate(origin, pickup, dropoff)?;
    let hours = route.distance_miles / rules.average_speed;
    debug!(miles = route.distance_miles, hours, "estimated driving time");
    Ok(DrivingEstimate {
        hours,
        distance_miles: route.distance_miles,
        waypoints: route.waypoints,
    })
}

/// A route whose distance is already known. Never touches the network.
#[derive(Debug, Clone, Copy)]
pub struct FixedDistance {
    pub distance_miles: f64,
}

impl RouteEstimator for FixedDistance {
    fn estimate(&self, _: &str, _: &str, _: &str) -> Result<RouteEstimate, RoutingError> {
        Ok(RouteEstimate {
            waypoints: Vec::new(),
            distance_miles: self.distance_miles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_distance_at_average_speed() {
        let estimate = estimate_driving_hours(
            &FixedDistance {
                distance_miles: 1000.0,
            },
            &HosRules::default(),
            "Chicago, IL",
            "Gary, IN",
            "Denver, CO",
        )
        .unwrap();

        assert!((estimate.hours - 20.0).abs() < 1e-9);
        assert!((estimate.distance_miles - 1000.0).abs() < 1e-9);
        assert!(estimate.waypoints.is_empty());
    }

    #[test]
    fn provider_errors_pass_through() {
        struct Unresolvable;
        impl RouteEstimator for Unresolvable {
            fn estimate(&self, origin: &str, _: &str, _: &str) -> Result<RouteEstimate, RoutingError> {
                Err(RoutingError::Geocoding(origin.to_string()))
            }
        }

        let err = estimate_driving_hours(&Unresolvable, &HosRules::default(), "nowhere", "a", "b")
            .unwrap_err();
        assert_eq!(err.to_string(), "geocoding failed for address: nowhere");
    }
}
