//! Trip planning: route, simulate, quantize, record.
//!
//! Routing happens before any storage work, so a slow or failing provider
//! never holds the ledger's write lock. When the trip is planned against a
//! driver, simulation runs inside [`Storage::record_trip`] and sees the
//! ledger as it stands at commit time.

use jiff::Timestamp;
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::Trip;
use crate::quantize::quantize;
use crate::route::{DrivingEstimate, RouteEstimator, RoutingError, estimate_driving_hours};
use crate::rules::HosRules;
use crate::simulate::{SimulateError, simulate};
use crate::storage::{Storage, StorageError};

/// Errors from planning a trip. Each stage's error passes through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Simulate(#[from] SimulateError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The three addresses a trip is planned between.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
}

/// Where the cycle hours already used come from.
#[derive(Debug, Clone, Copy)]
pub enum CycleSource {
    /// A stored driver's ledger, which the trip is charged to.
    Driver(Uuid),
    /// A one-off figure; the trip is saved without a driver.
    Hours(f64),
}

/// Plans a trip and records it.
pub fn plan_trip(
    estimator: &dyn RouteEstimator,
    storage: &Storage,
    rules: &HosRules,
    request: &TripRequest,
    cycle: CycleSource,
) -> Result<Trip, PlanError> {
    let route = estimate_driving_hours(
        estimator,
        rules,
        &request.current_location,
        &request.pickup_location,
        &request.dropoff_location,
    )?;
    info!(
        from = %request.current_location,
        pickup = %request.pickup_location,
        dropoff = %request.dropoff_location,
        miles = route.distance_miles,
        hours = route.hours,
        "routed trip"
    );

    let trip = match cycle {
        CycleSource::Driver(id) => storage.record_trip(id, |driver| {
            build_trip(rules, request, &route, Some(driver.id), driver.cycle_hours_used)
        })?,
        CycleSource::Hours(used) => {
            let trip = build_trip(rules, request, &route, None, used)?;
            storage.save_trip(&trip)?;
            trip
        }
    };

    info!(
        trip = %trip.id,
        days = trip.logs.len(),
        on_duty = trip.cycle_hours_used,
        outcome = trip.outcome.label(),
        "planned trip"
    );
    Ok(trip)
}

/// Simulates and quantizes a routed trip. Nothing is stored.
pub fn build_trip(
    rules: &HosRules,
    request: &TripRequest,
    route: &DrivingEstimate,
    driver_id: Option<Uuid>,
    cycle_hours_used: f64,
) -> Result<Trip, PlanError> {
    let result = simulate(rules, route.hours, cycle_hours_used)?;
    let eld_form = quantize(&result.daily_logs);

    Ok(Trip {
        id: Uuid::new_v4(),
        driver_id,
        current_location: request.current_location.clone(),
        pickup_location: request.pickup_location.clone(),
        dropoff_location: request.dropoff_location.clone(),
        cycle_hours_before: cycle_hours_used,
        cycle_hours_used: result.on_duty_hours,
        distance_miles: route.distance_miles,
        route: route.waypoints.clone(),
        logs: result.daily_logs,
        fuel_stops: result.fuel_stops,
        eld_form,
        outcome: result.outcome,
        created_at: Timestamp::now(),
    })
}

/// Reads a cycle-hours figure typed by a person.
///
/// Anything that isn't a finite number counts as no hours used. Negative
/// numbers are passed on and rejected by [`simulate`].
pub fn parse_cycle_hours(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    match raw.parse::<f64>() {
        Ok(hours) if hours.is_finite() => hours,
        _ => {
            warn!(input = raw, "unreadable cycle hours, assuming 0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use jiff::civil::date;
    use tempfile::TempDir;

    use crate::model::{Driver, DutyStatus, Outcome};
    use crate::route::{FixedDistance, RouteEstimate};

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        (dir, storage)
    }

    fn request() -> TripRequest {
        TripRequest {
            current_location: "Chicago, IL".into(),
            pickup_location: "Gary, IN".into(),
            dropoff_location: "Denver, CO".into(),
        }
    }

    fn driver(used: f64) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            name: "Dana".into(),
            cycle_hours_used: used,
            cycle_started_on: date(2026, 10, 12),
            created_at: Timestamp::now(),
        }
    }

    /// Counts calls and returns a fixed route with waypoints.
    struct CountingEstimator {
        calls: Cell<u32>,
        miles: f64,
    }

    impl RouteEstimator for CountingEstimator {
        fn estimate(&self, _: &str, _: &str, _: &str) -> Result<RouteEstimate, RoutingError> {
            self.calls.set(self.calls.get() + 1);
            Ok(RouteEstimate {
                waypoints: vec![[-87.6, 41.8], [-87.3, 41.6], [-104.9, 39.7]],
                distance_miles: self.miles,
            })
        }
    }

    struct Offline;

    impl RouteEstimator for Offline {
        fn estimate(&self, _: &str, _: &str, _: &str) -> Result<RouteEstimate, RoutingError> {
            Err(RoutingError::Unavailable("no network".into()))
        }
    }

    #[test]
    fn ad_hoc_hours_trip_is_saved_without_driver() {
        let (_dir, storage) = test_storage();
        let estimator = CountingEstimator {
            calls: Cell::new(0),
            miles: 500.0,
        };

        let trip = plan_trip(
            &estimator,
            &storage,
            &HosRules::default(),
            &request(),
            CycleSource::Hours(10.0),
        )
        .unwrap();

        assert_eq!(estimator.calls.get(), 1);
        assert_eq!(trip.driver_id, None);
        assert_eq!(trip.cycle_hours_before, 10.0);
        assert_eq!(trip.route.len(), 3);
        assert_eq!(trip.distance_miles, 500.0);
        assert_eq!(trip.outcome, Outcome::Completed);
        // Pickup, 10h driving, breaks after hours 8 and 9, dropoff.
        assert!((trip.cycle_hours_used - 13.0).abs() < 1e-9);
        assert_eq!(trip.eld_form.len(), trip.logs.len());

        let stored = storage.load_trip(trip.id).unwrap();
        assert_eq!(stored.logs, trip.logs);
    }

    #[test]
    fn driver_trip_is_charged_to_ledger() {
        let (_dir, storage) = test_storage();
        let dana = driver(30.0);
        storage.create_driver(&dana).unwrap();

        let trip = plan_trip(
            &FixedDistance {
                distance_miles: 100.0,
            },
            &storage,
            &HosRules::default(),
            &request(),
            CycleSource::Driver(dana.id),
        )
        .unwrap();

        assert_eq!(trip.driver_id, Some(dana.id));
        assert_eq!(trip.cycle_hours_before, 30.0);
        // Pickup, 2h driving, dropoff.
        assert!((trip.cycle_hours_used - 4.0).abs() < 1e-9);
        let after = storage.load_driver(dana.id).unwrap().cycle_hours_used;
        assert!((after - 34.0).abs() < 1e-9);
    }

    #[test]
    fn consecutive_trips_plan_against_the_updated_ledger() {
        let (_dir, storage) = test_storage();
        let dana = driver(60.0);
        storage.create_driver(&dana).unwrap();
        let estimator = FixedDistance {
            distance_miles: 300.0,
        };
        let rules = HosRules::default();

        let first = plan_trip(&estimator, &storage, &rules, &request(), CycleSource::Driver(dana.id))
            .unwrap();
        let second =
            plan_trip(&estimator, &storage, &rules, &request(), CycleSource::Driver(dana.id))
                .unwrap();

        assert_eq!(first.outcome, Outcome::Completed);
        assert!((second.cycle_hours_before - 68.0).abs() < 1e-9);
        assert_eq!(second.outcome, Outcome::CycleExhausted);
        let last_day = second.eld_form.last().unwrap();
        assert!(last_day.timeline.contains(&DutyStatus::CycleLimitReached));
    }

    #[test]
    fn routing_failure_stores_nothing() {
        let (_dir, storage) = test_storage();
        let dana = driver(5.0);
        storage.create_driver(&dana).unwrap();

        let err = plan_trip(
            &Offline,
            &storage,
            &HosRules::default(),
            &request(),
            CycleSource::Driver(dana.id),
        )
        .unwrap_err();

        assert!(matches!(err, PlanError::Routing(RoutingError::Unavailable(_))));
        assert!(storage.list_trips(None).unwrap().is_empty());
        assert_eq!(storage.load_driver(dana.id).unwrap().cycle_hours_used, 5.0);
    }

    #[test]
    fn unknown_driver_is_storage_error() {
        let (_dir, storage) = test_storage();
        let err = plan_trip(
            &FixedDistance {
                distance_miles: 100.0,
            },
            &storage,
            &HosRules::default(),
            &request(),
            CycleSource::Driver(Uuid::new_v4()),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PlanError::Storage(StorageError::DriverNotFound(_))
        ));
    }

    #[test]
    fn negative_cycle_hours_are_rejected_before_saving() {
        let (_dir, storage) = test_storage();
        let err = plan_trip(
            &FixedDistance {
                distance_miles: 100.0,
            },
            &storage,
            &HosRules::default(),
            &request(),
            CycleSource::Hours(-3.0),
        )
        .unwrap_err();

        assert!(matches!(err, PlanError::Simulate(SimulateError::InvalidInput(_))));
        assert!(storage.list_trips(None).unwrap().is_empty());
    }

    #[test]
    fn parses_cycle_hours_permissively() {
        assert_eq!(parse_cycle_hours("12.5"), 12.5);
        assert_eq!(parse_cycle_hours(" 40 "), 40.0);
        assert_eq!(parse_cycle_hours(""), 0.0);
        assert_eq!(parse_cycle_hours("lots"), 0.0);
        assert_eq!(parse_cycle_hours("NaN"), 0.0);
        assert_eq!(parse_cycle_hours("inf"), 0.0);
        assert_eq!(parse_cycle_hours("-4"), -4.0);
    }
}
