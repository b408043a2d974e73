//! detour-engine
//!
//! Routes a driver around a closed road segment: asks a directions provider
//! for a route that avoids the segment and falls back to a locally built
//! bypass when the provider is unavailable.

pub mod geometry;
pub mod haversine;
pub mod route;
pub mod traits;
pub mod ors;
pub mod controller;
pub mod session;
pub mod closure;
