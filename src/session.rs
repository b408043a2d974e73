//! Background execution of provider requests.
//!
//! Network calls run on a rayon pool; their resolutions travel back over a
//! channel and are applied by the thread that owns the session. The
//! controller itself is never touched from a worker. A queued request that
//! has been superseded by the time a worker picks it up is not sent to the
//! provider, so bursts of input changes cost at most the running calls plus
//! the latest one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::controller::{
    DetourParams, Generation, Outcome, Recompute, Resolution, RouteController, RouteInputs,
};
use crate::route::Route;
use crate::traits::DirectionsProvider;

pub struct DetourSession<P> {
    controller: RouteController,
    provider: Arc<P>,
    latest: Arc<AtomicU64>,
    pool: rayon::ThreadPool,
    tx: Sender<Resolution>,
    rx: Receiver<Resolution>,
    in_flight: usize,
}

impl<P> DetourSession<P>
where
    P: DirectionsProvider + Send + Sync + 'static,
{
    /// Session backed by a pool of `threads` workers.
    pub fn with_threads(
        provider: P,
        params: DetourParams,
        threads: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("detour-route-{}", index))
            .build()?;
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            controller: RouteController::new(params),
            provider: Arc::new(provider),
            latest: Arc::new(AtomicU64::new(0)),
            pool,
            tx,
            rx,
            in_flight: 0,
        })
    }

    pub fn controller(&self) -> &RouteController {
        &self.controller
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.controller.current_route()
    }

    /// Number of dispatched requests whose resolution has not arrived yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Feeds new inputs; dispatches the provider call when one is needed.
    /// Returns the generation allocated, or `None` when inputs are unchanged.
    pub fn update(&mut self, inputs: RouteInputs) -> Option<Generation> {
        let recompute = self.controller.update(inputs);
        self.latest.store(self.controller.generation().value(), Ordering::SeqCst);

        match recompute {
            Recompute::Unchanged => None,
            Recompute::Adopted(generation) => Some(generation),
            Recompute::Pending(request) => {
                let generation = request.generation();
                let provider = Arc::clone(&self.provider);
                let latest = Arc::clone(&self.latest);
                let tx = self.tx.clone();
                self.in_flight += 1;
                debug!(%generation, "dispatching provider request");
                self.pool.spawn(move || {
                    let resolution = if generation.value() < latest.load(Ordering::SeqCst) {
                        debug!(%generation, "skipping superseded provider request");
                        request.skip()
                    } else {
                        request.execute(&*provider)
                    };
                    // The session may be gone; its result is moot then.
                    let _ = tx.send(resolution);
                });
                Some(generation)
            }
        }
    }

    /// Applies every resolution that has already arrived, without blocking.
    pub fn poll(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Ok(resolution) = self.rx.try_recv() {
            outcomes.push(self.apply(resolution));
        }
        outcomes
    }

    /// Blocks for the next resolution and applies it. `None` when nothing
    /// is in flight.
    pub fn recv_next(&mut self) -> Option<Outcome> {
        if self.in_flight == 0 {
            return None;
        }
        match self.rx.recv() {
            Ok(resolution) => Some(self.apply(resolution)),
            Err(err) => {
                warn!(error = %err, "resolution channel closed");
                None
            }
        }
    }

    /// Blocks until the latest generation has reached a terminal state and
    /// returns the displayed route.
    pub fn wait_latest(&mut self) -> Option<&Route> {
        while self.controller.adopted_generation() != Some(self.controller.generation()) {
            if self.recv_next().is_none() {
                break;
            }
        }
        self.controller.current_route()
    }

    fn apply(&mut self, resolution: Resolution) -> Outcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.controller.resolve(resolution)
    }
}
