//! OpenRouteService provider: geocoding plus driving directions.
//!
//! Requests go through the `curl` executable, one call per address and one
//! for the directions. The API key is handed to curl as a config file on
//! stdin, never on the command line. Responses are parsed into the minimal
//! JSON shapes below; everything else in them is ignored.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Coordinate;

use super::{RouteEstimate, RouteEstimator, RoutingError};

const GEOCODE_URL: &str = "https://api.openrouteservice.org/geocode/search";
const DIRECTIONS_URL: &str = "https://api.openrouteservice.org/v2/directions/driving-car";
const METERS_PER_MILE: f64 = 1609.34;
const REQUEST_TIMEOUT_SECS: &str = "30";

/// Routes through the OpenRouteService HTTP API.
pub struct OpenRouteService {
    api_key: String,
}

impl OpenRouteService {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Resolves an address to its best-match `[lng, lat]`.
    fn geocode(&self, address: &str) -> Result<Coordinate, RoutingError> {
        let body = self.geocode_request(address).run().map_err(|e| {
            e.into_routing(|message| {
                debug!(address, %message, "geocode request failed");
                RoutingError::Geocoding(address.to_string())
            })
        })?;

        let coordinate =
            parse_geocode(&body)?.ok_or_else(|| RoutingError::Geocoding(address.to_string()))?;
        debug!(address, lng = coordinate[0], lat = coordinate[1], "geocoded");
        Ok(coordinate)
    }

    /// Driving distance in meters through `coordinates`, in order.
    fn directions(&self, coordinates: &[Coordinate]) -> Result<f64, RoutingError> {
        let payload = serde_json::to_string(&DirectionsRequest { coordinates })?;
        let body = self
            .directions_request(&payload)
            .run()
            .map_err(|e| e.into_routing(RoutingError::Directions))?;

        parse_directions(&body)
    }

    fn geocode_request(&self, address: &str) -> CurlRequest {
        CurlRequest::new(&["--get", GEOCODE_URL])
            .secret("data-urlencode", &format!("api_key={}", self.api_key))
            .arg("--data-urlencode")
            .arg(&format!("text={address}"))
            .arg("--data-urlencode")
            .arg("size=1")
    }

    fn directions_request(&self, payload: &str) -> CurlRequest {
        CurlRequest::new(&["--request", "POST", DIRECTIONS_URL])
            .secret("header", &format!("Authorization: {}", self.api_key))
            .arg("--header")
            .arg("Content-Type: application/json")
            .arg("--data-binary")
            .arg(payload)
    }
}

impl RouteEstimator for OpenRouteService {
    fn estimate(
        &self,
        origin: &str,
        pickup: &str,
        dropoff: &str,
    ) -> Result<RouteEstimate, RoutingError> {
        let waypoints = vec![
            self.geocode(origin)?,
            self.geocode(pickup)?,
            self.geocode(dropoff)?,
        ];
        let meters = self.directions(&waypoints)?;
        Ok(RouteEstimate {
            waypoints,
            distance_miles: meters / METERS_PER_MILE,
        })
    }
}

// ── curl ──

enum CurlFailure {
    /// `curl` itself could not be started.
    NotRun(String),
    /// The request failed; carries the response body or curl's message.
    Request(String),
}

impl CurlFailure {
    fn into_routing(self, on_request: impl FnOnce(String) -> RoutingError) -> RoutingError {
        match self {
            Self::NotRun(message) => RoutingError::Unavailable(message),
            Self::Request(message) => on_request(message),
        }
    }
}

/// One `curl` invocation. Options that carry credentials are written to
/// curl's stdin as config lines (`--config -`) so they stay out of the
/// process list.
struct CurlRequest {
    args: Vec<String>,
    config: String,
}

impl CurlRequest {
    fn new(args: &[&str]) -> Self {
        let base = [
            "--silent",
            "--show-error",
            "--fail-with-body",
            "--max-time",
            REQUEST_TIMEOUT_SECS,
            "--config",
            "-",
        ];
        Self {
            args: base.iter().chain(args).map(ToString::to_string).collect(),
            config: String::new(),
        }
    }

    fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Adds `--<option> <value>` through the stdin config.
    fn secret(mut self, option: &str, value: &str) -> Self {
        self.config.push_str(&format!("{option} = \"{}\"\n", quote_config(value)));
        self
    }

    /// Runs `curl` and returns the response body.
    fn run(&self) -> Result<String, CurlFailure> {
        let mut child = Command::new("curl")
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CurlFailure::NotRun(format!("failed to run curl: {e}")))?;

        // Dropping the handle closes stdin so curl stops reading config.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(self.config.as_bytes())
                .map_err(|e| CurlFailure::Request(format!("failed to pass config to curl: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| CurlFailure::NotRun(format!("failed to wait for curl: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let message = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            stdout.trim().to_string()
        };
        Err(CurlFailure::Request(message))
    }
}

/// Escapes a value for a double-quoted curl config string.
fn quote_config(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted
}

// ── Response shapes ──

/// Body of a directions request.
#[derive(Serialize)]
struct DirectionsRequest<'a> {
    coordinates: &'a [Coordinate],
}

/// JSON shape returned by `/geocode/search`.
#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Coordinate,
}

/// JSON shape returned by `/v2/directions/driving-car`.
#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    summary: RouteSummary,
}

#[derive(Deserialize)]
struct RouteSummary {
    /// Omitted by the API for zero-length routes.
    #[serde(default)]
    distance: f64,
}

/// First feature's coordinates, or `None` when nothing matched.
fn parse_geocode(body: &str) -> Result<Option<Coordinate>, RoutingError> {
    let response: GeocodeResponse = serde_json::from_str(body)?;
    Ok(response
        .features
        .into_iter()
        .next()
        .map(|f| f.geometry.coordinates))
}

fn parse_directions(body: &str) -> Result<f64, RoutingError> {
    let response: DirectionsResponse = serde_json::from_str(body)?;
    response
        .routes
        .first()
        .map(|r| r.summary.distance)
        .ok_or_else(|| RoutingError::Directions("no route found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "5b3ce3597851110001cf6248-secret";

    fn leaks_key(request: &CurlRequest) -> bool {
        request.args.iter().any(|arg| arg.contains(KEY))
    }

    #[test]
    fn geocode_key_stays_off_the_command_line() {
        let request = OpenRouteService::new(KEY).geocode_request("Gary, IN");

        assert!(!leaks_key(&request));
        assert!(request.args.windows(2).any(|w| w[0] == "--config" && w[1] == "-"));
        assert!(request.args.contains(&"text=Gary, IN".to_string()));
        assert_eq!(
            request.config,
            format!("data-urlencode = \"api_key={KEY}\"\n")
        );
    }

    #[test]
    fn directions_key_stays_off_the_command_line() {
        let request = OpenRouteService::new(KEY).directions_request(r#"{"coordinates":[]}"#);

        assert!(!leaks_key(&request));
        assert!(request.args.contains(&DIRECTIONS_URL.to_string()));
        assert_eq!(request.config, format!("header = \"Authorization: {KEY}\"\n"));
    }

    #[test]
    fn config_values_are_escaped() {
        assert_eq!(quote_config("plain"), "plain");
        assert_eq!(quote_config(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(quote_config("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn parses_first_geocode_feature() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"geometry": {"type": "Point", "coordinates": [-87.6298, 41.8781]},
                 "properties": {"label": "Chicago, IL, USA"}},
                {"geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
            ]
        }"#;
        assert_eq!(parse_geocode(body).unwrap(), Some([-87.6298, 41.8781]));
    }

    #[test]
    fn no_features_is_none() {
        assert_eq!(parse_geocode(r#"{"features": []}"#).unwrap(), None);
        assert_eq!(parse_geocode("{}").unwrap(), None);
    }

    #[test]
    fn malformed_geocode_is_response_error() {
        let err = parse_geocode("<html>").unwrap_err();
        assert!(matches!(err, RoutingError::Response(_)));
    }

    #[test]
    fn parses_route_distance() {
        let body = r#"{"routes": [{"summary": {"distance": 160934.0, "duration": 5400.2}}]}"#;
        let meters = parse_directions(body).unwrap();
        assert!((meters / METERS_PER_MILE - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_length_route_has_no_distance_field() {
        let body = r#"{"routes": [{"summary": {}}]}"#;
        assert!(parse_directions(body).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn empty_routes_is_directions_error() {
        let err = parse_directions(r#"{"routes": []}"#).unwrap_err();
        assert!(matches!(err, RoutingError::Directions(ref m) if m == "no route found"));
    }

    #[test]
    fn directions_request_body() {
        let coords = [[-87.6, 41.8], [-104.9, 39.7]];
        let json = serde_json::to_string(&DirectionsRequest {
            coordinates: &coords,
        })
        .unwrap();
        assert_eq!(json, r#"{"coordinates":[[-87.6,41.8],[-104.9,39.7]]}"#);
    }
}
