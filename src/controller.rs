//! Route controller: decides between provider and fallback routes and makes
//! sure only the most recent computation is ever adopted.
//!
//! Each recompute allocates a new [`Generation`]. The network step runs
//! outside the controller (see [`RouteRequest::execute`]) and comes back as a
//! [`Resolution`]; [`RouteController::resolve`] adopts it only if its
//! generation is still the current one. Results are therefore applied in
//! "last request wins" order, regardless of which request resolves last.

use std::fmt;

use tracing::{debug, info};

use crate::geometry::{BlockedSegment, DEFAULT_BYPASS_OFFSET_DEG, Point, compute_bypass_point};
use crate::route::{Provenance, Route};
use crate::traits::{Credential, DirectionsProvider};

/// Tunable fallback geometry, in coordinate degrees. The avoidance polygon
/// buffer belongs to the provider (see `OrsConfig::avoid_buffer_deg`).
#[derive(Debug, Clone, Copy)]
pub struct DetourParams {
    /// Distance of the fallback bypass point from the obstacle.
    pub bypass_offset_deg: f64,
}

impl Default for DetourParams {
    fn default() -> Self {
        Self {
            bypass_offset_deg: DEFAULT_BYPASS_OFFSET_DEG,
        }
    }
}

/// Everything a route depends on. Compared by value to detect changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInputs {
    pub origin: Point,
    pub destination: Point,
    pub blocked: BlockedSegment,
    pub credential: Option<Credential>,
}

impl RouteInputs {
    pub fn new(
        origin: Point,
        destination: Point,
        blocked: BlockedSegment,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            origin,
            destination,
            blocked,
            credential,
        }
    }
}

/// Monotonically increasing request counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A provider request waiting to be executed.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    generation: Generation,
    waypoints: Vec<Point>,
    credential: Credential,
    avoid: BlockedSegment,
    fallback: Route,
}

impl RouteRequest {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Performs the provider call. This is the only step that may block.
    pub fn execute<P>(self, provider: &P) -> Resolution
    where
        P: DirectionsProvider + ?Sized,
    {
        let route =
            provider.request_route(&self.waypoints, Some(&self.credential), Some(&self.avoid));
        Resolution {
            generation: self.generation,
            route,
            fallback: self.fallback,
        }
    }

    /// Resolves without calling the provider. Used for requests already
    /// superseded before they ran; the controller discards the result.
    pub fn skip(self) -> Resolution {
        Resolution {
            generation: self.generation,
            route: None,
            fallback: self.fallback,
        }
    }
}

/// Outcome of an executed [`RouteRequest`], ready to hand back to the
/// controller.
#[derive(Debug, Clone)]
pub struct Resolution {
    generation: Generation,
    route: Option<Route>,
    fallback: Route,
}

impl Resolution {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }
}

/// Result of feeding new inputs to the controller.
#[derive(Debug)]
pub enum Recompute {
    /// Inputs equal the previous ones; nothing happened.
    Unchanged,
    /// No credential: the fallback route was adopted synchronously.
    Adopted(Generation),
    /// A provider request must be executed and resolved. The previously
    /// adopted route stays current meanwhile.
    Pending(RouteRequest),
}

/// Terminal state of a recompute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AdoptedRemote,
    AdoptedFallback,
    Superseded,
}

type Listener = Box<dyn FnMut(Generation, &Route) + Send>;

pub struct RouteController {
    params: DetourParams,
    generation: Generation,
    last_inputs: Option<RouteInputs>,
    current: Option<(Generation, Route)>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for RouteController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteController")
            .field("params", &self.params)
            .field("generation", &self.generation)
            .field("last_inputs", &self.last_inputs)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for RouteController {
    fn default() -> Self {
        Self::new(DetourParams::default())
    }
}

impl RouteController {
    pub fn new(params: DetourParams) -> Self {
        Self {
            params,
            generation: Generation::default(),
            last_inputs: None,
            current: None,
            listeners: Vec::new(),
        }
    }

    pub fn params(&self) -> &DetourParams {
        &self.params
    }

    /// Latest allocated generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The route to display, if any computation has been adopted yet.
    pub fn current_route(&self) -> Option<&Route> {
        self.current.as_ref().map(|(_, route)| route)
    }

    /// Generation whose result is currently displayed.
    pub fn adopted_generation(&self) -> Option<Generation> {
        self.current.as_ref().map(|(generation, _)| *generation)
    }

    /// Registers a callback invoked with every newly adopted route.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(Generation, &Route) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Local detour for `inputs`: origin, a point beside the middle of the
    /// blocked segment, destination.
    pub fn fallback_route(&self, inputs: &RouteInputs) -> Route {
        let bypass = compute_bypass_point(
            inputs.origin,
            inputs.destination,
            inputs.blocked.midpoint(),
            self.params.bypass_offset_deg,
        );
        Route::fallback(inputs.origin, bypass, inputs.destination)
    }

    /// Recomputes only when `inputs` differ from the previous call.
    pub fn update(&mut self, inputs: RouteInputs) -> Recompute {
        if self.last_inputs.as_ref() == Some(&inputs) {
            return Recompute::Unchanged;
        }
        self.recompute(inputs)
    }

    /// Starts a new cycle unconditionally, superseding any pending one.
    pub fn recompute(&mut self, inputs: RouteInputs) -> Recompute {
        self.generation = self.generation.next();
        let generation = self.generation;
        let fallback = self.fallback_route(&inputs);

        let recompute = match &inputs.credential {
            None => {
                debug!(%generation, "no credential, adopting fallback");
                self.adopt(generation, fallback);
                Recompute::Adopted(generation)
            }
            Some(credential) => Recompute::Pending(RouteRequest {
                generation,
                waypoints: vec![inputs.origin, inputs.destination],
                credential: credential.clone(),
                avoid: inputs.blocked,
                fallback,
            }),
        };

        self.last_inputs = Some(inputs);
        recompute
    }

    /// Applies a resolution if it belongs to the current generation.
    pub fn resolve(&mut self, resolution: Resolution) -> Outcome {
        if resolution.generation != self.generation {
            debug!(
                generation = %resolution.generation,
                current = %self.generation,
                "discarding superseded resolution"
            );
            return Outcome::Superseded;
        }

        match resolution.route {
            Some(route) => {
                self.adopt(resolution.generation, route);
                Outcome::AdoptedRemote
            }
            None => {
                self.adopt(resolution.generation, resolution.fallback);
                Outcome::AdoptedFallback
            }
        }
    }

    /// Blocking convenience: update, execute the provider call if needed,
    /// and resolve.
    pub fn run<P>(&mut self, inputs: RouteInputs, provider: &P) -> Option<Outcome>
    where
        P: DirectionsProvider + ?Sized,
    {
        match self.update(inputs) {
            Recompute::Unchanged => None,
            Recompute::Adopted(_) => Some(Outcome::AdoptedFallback),
            Recompute::Pending(request) => Some(self.resolve(request.execute(provider))),
        }
    }

    fn adopt(&mut self, generation: Generation, route: Route) {
        info!(
            %generation,
            provenance = ?route.provenance(),
            points = route.len(),
            length_km = route.length_km(),
            "adopting route"
        );
        for listener in &mut self.listeners {
            listener(generation, &route);
        }
        self.current = Some((generation, route));
    }
}

impl Outcome {
    pub fn provenance(self) -> Option<Provenance> {
        match self {
            Outcome::AdoptedRemote => Some(Provenance::Provider),
            Outcome::AdoptedFallback => Some(Provenance::Fallback),
            Outcome::Superseded => None,
        }
    }
}
