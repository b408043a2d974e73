//! OpenRouteService HTTP adapter for driving directions.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{BlockedSegment, DEFAULT_AVOID_BUFFER_DEG, Point};
use crate::route::{Provenance, Route};
use crate::traits::{Credential, DirectionsProvider};

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub profile: String,
    /// Whole-request timeout. `None` waits for the provider indefinitely.
    pub timeout_secs: Option<u64>,
    /// Lateral buffer of the avoidance polygon sent with each request.
    pub avoid_buffer_deg: f64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            profile: "driving-car".to_string(),
            timeout_secs: Some(10),
            avoid_buffer_deg: DEFAULT_AVOID_BUFFER_DEG,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(std::time::Duration::from_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OrsConfig {
        &self.config
    }

    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }

    fn fetch(
        &self,
        body: &DirectionsRequest,
        credential: &Credential,
    ) -> Result<Route, FetchError> {
        let response = self
            .client
            .post(self.directions_url())
            .header(reqwest::header::AUTHORIZATION, credential.as_str())
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let collection = response.json::<FeatureCollection>()?;
        collection.into_route().ok_or(FetchError::MissingGeometry)
    }
}

impl DirectionsProvider for OrsClient {
    fn request_route(
        &self,
        waypoints: &[Point],
        credential: Option<&Credential>,
        avoid: Option<&BlockedSegment>,
    ) -> Option<Route> {
        let Some(credential) = credential else {
            debug!("no directions credential, skipping provider");
            return None;
        };
        if waypoints.len() < 2 {
            debug!(waypoints = waypoints.len(), "too few waypoints, skipping provider");
            return None;
        }

        let body = DirectionsRequest::new(waypoints, avoid, self.config.avoid_buffer_deg);

        match self.fetch(&body, credential) {
            Ok(route) => {
                debug!(points = route.len(), "provider route received");
                Some(route)
            }
            Err(err) => {
                warn!(error = %err, "directions provider returned no route");
                None
            }
        }
    }
}

/// Reasons a provider call yields no route. Never surfaced to callers.
#[derive(Debug)]
enum FetchError {
    Http(reqwest::Error),
    Status(StatusCode),
    MissingGeometry,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "transport error: {}", err),
            FetchError::Status(status) => write!(f, "provider responded {}", status),
            FetchError::MissingGeometry => f.write_str("response has no usable geometry"),
        }
    }
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<DirectionsOptions>,
}

impl DirectionsRequest {
    fn new(waypoints: &[Point], avoid: Option<&BlockedSegment>, buffer_deg: f64) -> Self {
        let coordinates = waypoints.iter().map(|point| point.to_lng_lat()).collect();
        let options = avoid.map(|segment| DirectionsOptions {
            avoid_polygons: MultiPolygon {
                kind: "MultiPolygon",
                coordinates: vec![vec![segment.avoidance_polygon(buffer_deg).to_lng_lat()]],
            },
        });

        Self {
            coordinates,
            options,
        }
    }
}

#[derive(Debug, Serialize)]
struct DirectionsOptions {
    avoid_polygons: MultiPolygon,
}

#[derive(Debug, Serialize)]
struct MultiPolygon {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<Vec<Vec<[f64; 2]>>>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

impl FeatureCollection {
    /// First feature's line, converted back to `(lat, lng)` points.
    /// Positions may carry a third (elevation) component, which is dropped.
    fn into_route(self) -> Option<Route> {
        let geometry = self.features.into_iter().next()?.geometry?;
        let points = geometry
            .coordinates
            .into_iter()
            .map(|position| match position.as_slice() {
                [lng, lat, ..] => Some(Point::from_lng_lat([*lng, *lat])),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Route::new(points, Provenance::Provider)
    }
}
