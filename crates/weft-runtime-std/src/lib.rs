//! Standard scheduling services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `weft-core`. Applications construct a
//! [`StdRuntime`], hand its scheduler to a
//! [`weft_core::Renderer`], and grant idle slots from their own event
//! loop whenever the request flag is set.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use weft_core::{Clock, Deadline, HostError, HostTree, IdleScheduler, Renderer};

/// Idle scheduler that coalesces requests into a flag and optionally wakes
/// a host event loop.
pub struct StdIdleScheduler {
    idle_requested: AtomicBool,
    waker: RwLock<Option<Arc<dyn Fn() + Send + Sync + 'static>>>,
}

impl StdIdleScheduler {
    pub fn new() -> Self {
        Self {
            idle_requested: AtomicBool::new(false),
            waker: RwLock::new(None),
        }
    }

    /// Returns whether an idle slot has been requested since the last call.
    pub fn take_idle_request(&self) -> bool {
        self.idle_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker invoked whenever a new idle slot is requested.
    pub fn set_idle_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.waker.write().unwrap() = Some(Arc::new(waker));
    }

    /// Clears any registered waker.
    pub fn clear_idle_waker(&self) {
        *self.waker.write().unwrap() = None;
    }

    fn wake(&self) {
        let waker = self.waker.read().unwrap().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdIdleScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdIdleScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdIdleScheduler")
            .field(
                "idle_requested",
                &self.idle_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl IdleScheduler for StdIdleScheduler {
    fn schedule_idle(&self) {
        self.idle_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Default, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed_millis(&self, since: Self::Instant) -> u64 {
        since.elapsed().as_millis() as u64
    }
}

impl StdClock {
    /// Returns the elapsed time as a [`Duration`] for convenience.
    pub fn elapsed(&self, since: Instant) -> Duration {
        since.elapsed()
    }
}

/// Wall-clock deadline: asks the work loop to yield once the pass has run
/// for `budget_millis`.
pub struct TimeBudget<C: Clock> {
    clock: C,
    started: C::Instant,
    budget_millis: u64,
}

impl<C: Clock> TimeBudget<C> {
    pub fn start_with(clock: C, budget_millis: u64) -> Self {
        let started = clock.now();
        Self {
            clock,
            started,
            budget_millis,
        }
    }
}

impl TimeBudget<StdClock> {
    pub fn start(budget_millis: u64) -> Self {
        Self::start_with(StdClock, budget_millis)
    }
}

impl<C: Clock> Deadline for TimeBudget<C> {
    fn should_yield(&self) -> bool {
        self.clock.elapsed_millis(self.started) >= self.budget_millis
    }
}

/// Convenience container bundling the standard scheduler and clock.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdIdleScheduler>,
    clock: Arc<StdClock>,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self {
            scheduler: Arc::new(StdIdleScheduler::default()),
            clock: Arc::new(StdClock),
        }
    }

    /// Returns the scheduler implementation, ready to hand to
    /// [`Renderer::with_scheduler`].
    pub fn scheduler(&self) -> Arc<StdIdleScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns the clock implementation.
    pub fn clock(&self) -> Arc<StdClock> {
        Arc::clone(&self.clock)
    }

    /// Returns whether an idle slot was requested since the last poll.
    pub fn take_idle_request(&self) -> bool {
        self.scheduler.take_idle_request()
    }

    /// Registers a waker called when the renderer requests an idle slot.
    pub fn set_idle_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_idle_waker(waker);
    }

    /// Clears any previously registered waker.
    pub fn clear_idle_waker(&self) {
        self.scheduler.clear_idle_waker();
    }

    /// A fresh wall-clock deadline for one idle slot.
    pub fn idle_deadline(&self, budget_millis: u64) -> TimeBudget<StdClock> {
        TimeBudget::start(budget_millis)
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Grants idle slots of `slice_millis` until the renderer runs out of
/// work, draining the request flag the way a host event loop would.
pub fn drive_to_completion<H: HostTree>(
    runtime: &StdRuntime,
    renderer: &mut Renderer<H>,
    slice_millis: u64,
) -> Result<(), HostError> {
    while renderer.has_pending_work() {
        runtime.take_idle_request();
        renderer.run_idle_pass(&runtime.idle_deadline(slice_millis))?;
    }
    Ok(())
}
