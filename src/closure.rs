//! Road closure records as stored by the surrounding application.
//!
//! Stored rows are flat (`lat_obra`/`lng_obra` for the start of the closed
//! stretch, `lat_desvio`/`lng_desvio` for its end); [`ClosureRecord`] reads
//! and writes that shape through [`ClosureRow`].

use serde::{Deserialize, Serialize};

use crate::controller::RouteInputs;
use crate::geometry::{BlockedSegment, Point};
use crate::traits::Credential;

/// A published road closure: the blocked stretch plus free-text metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClosureRow", into = "ClosureRow")]
pub struct ClosureRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Where the closed stretch begins.
    pub start: Point,
    /// Where the closed stretch ends; also the default destination.
    pub end: Point,
    pub photos: Vec<String>,
    pub created_at: Option<String>,
}

/// Storage layout of a closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureRow {
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    pub lat_obra: f64,
    pub lng_obra: f64,
    pub lat_desvio: f64,
    pub lng_desvio: f64,
    #[serde(rename = "fotos", default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<ClosureRow> for ClosureRecord {
    fn from(row: ClosureRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            start: Point::new(row.lat_obra, row.lng_obra),
            end: Point::new(row.lat_desvio, row.lng_desvio),
            photos: row.photos,
            created_at: row.created_at,
        }
    }
}

impl From<ClosureRecord> for ClosureRow {
    fn from(record: ClosureRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            lat_obra: record.start.lat,
            lng_obra: record.start.lng,
            lat_desvio: record.end.lat,
            lng_desvio: record.end.lng,
            photos: record.photos,
            created_at: record.created_at,
        }
    }
}

impl ClosureRecord {
    pub fn segment(&self) -> BlockedSegment {
        BlockedSegment::new(self.start, self.end)
    }

    pub fn map_center(&self) -> Point {
        self.segment().midpoint()
    }

    pub fn default_destination(&self) -> Point {
        self.end
    }

    pub fn is_default_destination(&self, destination: Point) -> bool {
        destination == self.end
    }

    /// Routing inputs for a driver viewing this closure. Without a known
    /// position the closure start is the origin; without a chosen
    /// destination the closure end is used.
    pub fn route_inputs(
        &self,
        position: Option<Point>,
        destination: Option<Point>,
        credential: Option<Credential>,
    ) -> RouteInputs {
        RouteInputs::new(
            position.unwrap_or(self.start),
            destination.unwrap_or(self.end),
            self.segment(),
            credential,
        )
    }
}
