//! Test fixtures for detour-engine.
//!
//! Provides:
//! - Real Cochabamba street coordinates around a closed stretch
//! - A wiremock directions server runnable from blocking tests
//! - In-process directions providers that count or hold back calls

#![allow(dead_code)]

pub mod cochabamba_locations;

pub use cochabamba_locations::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use tokio::runtime::Runtime;
use wiremock::MockServer;

use detour_engine::geometry::{BlockedSegment, Point};
use detour_engine::route::{Provenance, Route};
use detour_engine::traits::{Credential, DirectionsProvider};

pub const DIRECTIONS_PATH: &str = "/v2/directions/driving-car/geojson";
pub const TEST_KEY: &str = "test-key";

/// Starts a mock server. The runtime must outlive the server; the server
/// itself runs on its own thread, so blocking clients can call it directly.
pub fn mock_server() -> (Runtime, MockServer) {
    let runtime = Runtime::new().expect("build tokio runtime");
    let server = runtime.block_on(MockServer::start());
    (runtime, server)
}

/// GeoJSON feature collection with one line through `points`.
pub fn feature_collection(points: &[Point]) -> serde_json::Value {
    let coordinates = points
        .iter()
        .map(|point| serde_json::json!([point.lng, point.lat]))
        .collect::<Vec<_>>();
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "LineString", "coordinates": coordinates }
        }]
    })
}

/// `n` points evenly spaced between `from` and `to`, both included exactly.
pub fn straight_line(from: Point, to: Point, n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            if i + 1 == n {
                return to;
            }
            let t = i as f64 / (n - 1) as f64;
            Point::new(
                from.lat + (to.lat - from.lat) * t,
                from.lng + (to.lng - from.lng) * t,
            )
        })
        .collect()
}

/// Provider that records how often it was asked and answers with a
/// straight provider route between the first and last waypoint.
#[derive(Default)]
pub struct CountingProvider {
    calls: AtomicUsize,
    answer: bool,
}

impl CountingProvider {
    pub fn answering() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: true,
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DirectionsProvider for CountingProvider {
    fn request_route(
        &self,
        waypoints: &[Point],
        credential: Option<&Credential>,
        _avoid: Option<&BlockedSegment>,
    ) -> Option<Route> {
        if credential.is_none() || waypoints.len() < 2 {
            return None;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.answer {
            return None;
        }
        Route::new(
            straight_line(waypoints[0], waypoints[waypoints.len() - 1], 5),
            Provenance::Provider,
        )
    }
}

/// Provider that holds requests for `gated_destination` until released;
/// all other requests answer immediately. Every call is counted.
pub struct GatedProvider {
    gated_destination: Point,
    gate: Mutex<Receiver<()>>,
    entered: Mutex<Sender<()>>,
    calls: AtomicUsize,
}

/// Test-side handles of a [`GatedProvider`].
pub struct Gate {
    /// Lets one held request continue.
    pub release: Sender<()>,
    /// Receives a message each time a request starts being held.
    pub entered: Receiver<()>,
}

impl GatedProvider {
    pub fn new(gated_destination: Point) -> (Self, Gate) {
        let (release, gate) = mpsc::channel();
        let (entered_tx, entered) = mpsc::channel();
        let provider = Self {
            gated_destination,
            gate: Mutex::new(gate),
            entered: Mutex::new(entered_tx),
            calls: AtomicUsize::new(0),
        };
        (provider, Gate { release, entered })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DirectionsProvider for GatedProvider {
    fn request_route(
        &self,
        waypoints: &[Point],
        _credential: Option<&Credential>,
        _avoid: Option<&BlockedSegment>,
    ) -> Option<Route> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let destination = *waypoints.last()?;
        if destination == self.gated_destination {
            let gate = self.gate.lock().ok()?;
            self.entered.lock().ok()?.send(()).ok()?;
            gate.recv().ok()?;
        }
        Route::new(straight_line(waypoints[0], destination, 4), Provenance::Provider)
    }
}

/// Asserts two polylines match point by point within `1e-12` degrees.
pub fn assert_points_close(actual: &[Point], expected: &[Point]) {
    assert_eq!(actual.len(), expected.len(), "point count");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a.lat - e.lat).abs() < 1e-12 && (a.lng - e.lng).abs() < 1e-12,
            "point {} differs: {:?} vs {:?}",
            index,
            a,
            e
        );
    }
}
