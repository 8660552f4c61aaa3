use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Tick rate of [`HostTicks`]: one tick per nanosecond.
pub const HOST_TICK_HZ: u64 = 1_000_000_000;

/// A free-running, monotonic hardware tick counter.
///
/// Reads must have no side effects; implementations that are `Sync` may be read from any number
/// of threads at once.
pub trait TickSource {
    /// Returns the current raw tick count.
    fn now(&self) -> u64;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    #[inline]
    fn now(&self) -> u64 {
        (**self).now()
    }
}

impl<T: TickSource + ?Sized> TickSource for Arc<T> {
    #[inline]
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Host monotonic clock, counting nanoseconds since the source was created.
#[derive(Debug, Clone, Copy)]
pub struct HostTicks {
    origin: Instant,
}

impl HostTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for HostTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for HostTicks {
    fn now(&self) -> u64 {
        // ~584 years of nanoseconds before this saturates.
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Deterministic tick counter driven explicitly by the caller.
///
/// Clones share the same counter, so a test can hand one clone to a [`crate::Clock`] and keep
/// another to advance time.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    ticks: Arc<AtomicU64>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ticks: u64) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(ticks)),
        }
    }

    /// Advances the counter by `ticks`, saturating at `u64::MAX`.
    pub fn advance(&self, ticks: u64) {
        let _ = self
            .ticks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                Some(cur.saturating_add(ticks))
            });
    }

    /// Moves the counter forward to `ticks`. Earlier values are ignored so the counter stays
    /// monotonic.
    pub fn set(&self, ticks: u64) {
        self.ticks.fetch_max(ticks, Ordering::AcqRel);
    }
}

impl TickSource for ManualTicks {
    #[inline]
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}
