//! Route representation for rendering.
//!
//! A route is replaced wholesale whenever a new computation is adopted; it
//! is never edited in place.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::haversine;

/// Where an adopted route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Street-following geometry returned by the directions provider.
    Provider,
    /// `[origin, bypass, destination]` synthesized locally.
    Fallback,
}

/// An ordered polyline of at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<Point>,
    provenance: Provenance,
}

impl Route {
    /// Creates a route, or `None` when fewer than two points are given.
    pub fn new(points: Vec<Point>, provenance: Provenance) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self { points, provenance })
    }

    /// Three-point detour through a bypass point.
    pub fn fallback(origin: Point, bypass: Point, destination: Point) -> Self {
        Self {
            points: vec![origin, bypass, destination],
            provenance: Provenance::Fallback,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ground length of the polyline.
    pub fn length_km(&self) -> f64 {
        haversine::path_length_km(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_points() {
        let points = vec![Point::new(-17.40, -66.16), Point::new(-17.38, -66.15)];
        let route = Route::new(points.clone(), Provenance::Provider).unwrap();
        assert_eq!(route.points(), &points[..]);
        assert_eq!(route.provenance(), Provenance::Provider);
    }

    #[test]
    fn test_rejects_single_point() {
        assert!(Route::new(vec![Point::new(1.0, 2.0)], Provenance::Provider).is_none());
        assert!(Route::new(Vec::new(), Provenance::Fallback).is_none());
    }

    #[test]
    fn test_fallback_shape() {
        let origin = Point::new(0.0, 0.0);
        let bypass = Point::new(0.5, 0.1);
        let destination = Point::new(1.0, 0.0);
        let route = Route::fallback(origin, bypass, destination);
        assert_eq!(route.into_points(), vec![origin, bypass, destination]);
    }

    #[test]
    fn test_length_is_positive() {
        let route = Route::fallback(
            Point::new(-17.40, -66.16),
            Point::new(-17.39, -66.157),
            Point::new(-17.38, -66.15),
        );
        assert!(route.length_km() > 2.0 && route.length_km() < 4.0);
    }
}
