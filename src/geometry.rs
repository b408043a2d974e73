//! Planar geometry for detours around a blocked segment.
//!
//! All math runs directly in coordinate-degree space: latitude and longitude
//! are treated as a flat plane. Offsets are small (a few hundred metres), so
//! the distortion is irrelevant for building a bypass or an avoidance region.

use serde::{Deserialize, Serialize};

/// Default lateral offset of a bypass point (~200 m at mid-latitudes).
pub const DEFAULT_BYPASS_OFFSET_DEG: f64 = 0.002;

/// Default lateral buffer of an avoidance polygon (~130 m).
pub const DEFAULT_AVOID_BUFFER_DEG: f64 = 0.0012;

/// A geographic coordinate in degrees.
///
/// Equality is exact on both fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Wire order used by GeoJSON providers: `[lng, lat]`.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_lng_lat([lng, lat]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// A closed road stretch. Direction only matters for the sign of lateral
/// offsets; the avoidance region it produces is symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockedSegment {
    pub start: Point,
    pub end: Point,
}

impl BlockedSegment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> Point {
        midpoint(self.start, self.end)
    }

    pub fn avoidance_polygon(&self, buffer_deg: f64) -> AvoidancePolygon {
        compute_avoidance_polygon(self.start, self.end, buffer_deg)
    }
}

/// Closed five-point ring around a blocked segment (`ring[0] == ring[4]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidancePolygon {
    ring: [Point; 5],
}

impl AvoidancePolygon {
    pub fn ring(&self) -> &[Point; 5] {
        &self.ring
    }

    /// The ring in `[lng, lat]` order, ready to embed in a GeoJSON geometry.
    pub fn to_lng_lat(&self) -> Vec<[f64; 2]> {
        self.ring.iter().map(|point| point.to_lng_lat()).collect()
    }
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}

/// Length of a direction vector, with zero (or NaN) replaced by 1 so that
/// degenerate inputs never divide by zero.
fn guarded_length(d_lat: f64, d_lng: f64) -> f64 {
    let len = (d_lat * d_lat + d_lng * d_lng).sqrt();
    if len > 0.0 { len } else { 1.0 }
}

/// Unit vector perpendicular to the `obstacle -> destination` line.
fn unit_perpendicular(obstacle: Point, destination: Point) -> (f64, f64) {
    let d_lat = destination.lat - obstacle.lat;
    let d_lng = destination.lng - obstacle.lng;
    let perp_lat = d_lng;
    let perp_lng = -d_lat;
    let len = guarded_length(perp_lat, perp_lng);
    (perp_lat / len, perp_lng / len)
}

/// Signed lateral position of `point` relative to the line through
/// `obstacle` heading to `destination`. Non-negative and negative values
/// identify the two sides of the road.
pub fn lateral_side(point: Point, obstacle: Point, destination: Point) -> f64 {
    let (n_lat, n_lng) = unit_perpendicular(obstacle, destination);
    (point.lat - obstacle.lat) * n_lat + (point.lng - obstacle.lng) * n_lng
}

/// Point `offset_deg` away from `obstacle`, perpendicular to the
/// obstacle -> destination direction, on the same side as `origin`.
///
/// When obstacle and destination coincide the perpendicular is undefined
/// and the obstacle itself is returned.
pub fn compute_bypass_point(
    origin: Point,
    destination: Point,
    obstacle: Point,
    offset_deg: f64,
) -> Point {
    let (n_lat, n_lng) = unit_perpendicular(obstacle, destination);
    let sign = if lateral_side(origin, obstacle, destination) >= 0.0 {
        1.0
    } else {
        -1.0
    };

    Point::new(
        obstacle.lat + sign * offset_deg * n_lat,
        obstacle.lng + sign * offset_deg * n_lng,
    )
}

/// Quadrilateral covering `start..end` with `buffer_deg` on each side.
///
/// Corners are displaced laterally only, never along the segment, so both
/// endpoints stay on the polygon boundary and remain routable.
pub fn compute_avoidance_polygon(start: Point, end: Point, buffer_deg: f64) -> AvoidancePolygon {
    let d_lat = end.lat - start.lat;
    let d_lng = end.lng - start.lng;
    let len = guarded_length(d_lat, d_lng);

    let off_lat = -d_lng / len * buffer_deg;
    let off_lng = d_lat / len * buffer_deg;

    let p1 = Point::new(start.lat + off_lat, start.lng + off_lng);
    let p2 = Point::new(end.lat + off_lat, end.lng + off_lng);
    let p3 = Point::new(end.lat - off_lat, end.lng - off_lng);
    let p4 = Point::new(start.lat - off_lat, start.lng - off_lng);

    AvoidancePolygon {
        ring: [p1, p2, p3, p4, p1],
    }
}
