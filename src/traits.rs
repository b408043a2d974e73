//! Seams between the detour engine and the outside world.

use std::fmt;

use crate::geometry::{BlockedSegment, Point};
use crate::route::Route;

/// API key for a directions provider.
///
/// Never constructed from a blank string: an absent credential is a
/// supported mode (fallback only), not an error.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Reads a credential from an environment variable. Unset, non-unicode,
    /// and blank values all count as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Computes street-following routes.
///
/// Implementations never fail: every provider-side problem resolves to
/// `None` ("no route"), and callers fall back to synthesized geometry.
pub trait DirectionsProvider {
    /// Route through `waypoints` in order, avoiding `avoid` when given.
    ///
    /// Must return `None` without any network access when fewer than two
    /// waypoints or no credential are supplied.
    fn request_route(
        &self,
        waypoints: &[Point],
        credential: Option<&Credential>,
        avoid: Option<&BlockedSegment>,
    ) -> Option<Route>;
}
