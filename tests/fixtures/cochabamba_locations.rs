//! Cochabamba (Bolivia) coordinates used across tests.

use detour_engine::geometry::{BlockedSegment, Point};

/// Driver position south-west of the closure.
pub const ORIGIN: Point = Point::new(-17.40, -66.16);

/// Destination north-east of the closure.
pub const DESTINATION: Point = Point::new(-17.38, -66.15);

/// Alternative destination, as if the pin had been dragged.
pub const DRAGGED_DESTINATION: Point = Point::new(-17.383, -66.141);

/// Obstacle between origin and destination.
pub const OBSTACLE: Point = Point::new(-17.39, -66.155);

/// Closed stretch centred on [`OBSTACLE`].
pub const CLOSURE: BlockedSegment = BlockedSegment::new(
    Point::new(-17.392, -66.156),
    Point::new(-17.388, -66.154),
);
