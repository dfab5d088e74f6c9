use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Abstraction over time sources.
/// Implementations: SystemClock (production), ManualClock (testing and headless runs),
/// PausableClock (wraps either and freezes while paused).
pub trait Clock {
    /// Milliseconds elapsed since the clock's epoch. Never decreases.
    fn ticks(&self) -> i64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn ticks(&self) -> i64 {
        (**self).ticks()
    }
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn ticks(&self) -> i64 {
        (**self).ticks()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn ticks(&self) -> i64 {
        (**self).ticks()
    }
}

/// Monotonic clock backed by `std::time::Instant`; the epoch is construction time.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn ticks(&self) -> i64 {
        self.start.elapsed().as_millis() as i64
    }
}

/// Manually driven clock for deterministic tests and stepped simulation.
#[derive(Debug, Default)]
pub struct ManualClock {
    current: Cell<i64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(tick: i64) -> Self {
        Self {
            current: Cell::new(tick),
        }
    }

    /// Jump to `tick`. Earlier values are ignored so readings stay monotonic.
    pub fn set(&self, tick: i64) {
        if tick > self.current.get() {
            self.current.set(tick);
        }
    }

    pub fn advance(&self, delta: i64) {
        self.current.set(self.current.get() + delta.max(0));
    }
}

impl Clock for ManualClock {
    fn ticks(&self) -> i64 {
        self.current.get()
    }
}

/// Clock that stops advancing while paused.
///
/// Readings are the inner clock minus the total time spent paused, so a
/// resumed session continues from the tick it was paused at.
pub struct PausableClock<C> {
    inner: C,
    paused_at: Cell<Option<i64>>,
    paused_total: Cell<i64>,
}

impl<C: Clock> PausableClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            paused_at: Cell::new(None),
            paused_total: Cell::new(0),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.get().is_some()
    }

    pub fn pause(&self) {
        if self.paused_at.get().is_none() {
            self.paused_at.set(Some(self.inner.ticks()));
        }
    }

    pub fn resume(&self) {
        if let Some(at) = self.paused_at.take() {
            let stalled = self.inner.ticks() - at;
            self.paused_total.set(self.paused_total.get() + stalled);
        }
    }

    /// Total milliseconds spent paused, excluding a pause still in progress.
    pub fn paused_total(&self) -> i64 {
        self.paused_total.get()
    }
}

impl<C: Clock> Clock for PausableClock<C> {
    fn ticks(&self) -> i64 {
        let now = self.paused_at.get().unwrap_or_else(|| self.inner.ticks());
        now - self.paused_total.get()
    }
}
