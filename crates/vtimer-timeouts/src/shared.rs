use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use vtimer_clock::TickSource;

use crate::{Result, TimeoutHandle, TimerEvent, TimerService};

struct Inner<S, const ENTRIES: usize> {
    service: Mutex<TimerService<S, ENTRIES>>,
    wake: Condvar,
}

/// A [`TimerService`] that several threads may arm and cancel timeouts on.
///
/// Every operation holds one lock for its whole duration, so no thread ever observes a
/// half-spliced list. One thread (the timer loop) calls [`wait`](Self::wait); arming an earlier
/// deadline from any other thread wakes it so it can shorten its sleep.
pub struct SharedTimerService<S, const ENTRIES: usize> {
    inner: Arc<Inner<S, ENTRIES>>,
}

impl<S, const ENTRIES: usize> Clone for SharedTimerService<S, ENTRIES> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TickSource, const ENTRIES: usize> SharedTimerService<S, ENTRIES> {
    pub fn new(service: TimerService<S, ENTRIES>) -> Self {
        Self {
            inner: Arc::new(Inner {
                service: Mutex::new(service),
                wake: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerService<S, ENTRIES>> {
        // List operations validate before mutating, so a panicking holder cannot leave a
        // half-updated ring behind.
        self.inner
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Wakes the timer loop so it re-reads the clock, e.g. after a deterministic tick source was
    /// advanced.
    pub fn notify(&self) {
        // Taking the lock orders this wakeup after any check the waiter is in the middle of.
        drop(self.lock());
        self.inner.wake.notify_all();
    }

    /// Runs `f` with exclusive access to the service, then wakes the timer loop.
    pub fn with<R>(&self, f: impl FnOnce(&mut TimerService<S, ENTRIES>) -> R) -> R {
        let result = f(&mut self.lock());
        self.notify();
        result
    }

    pub fn alloc(&self) -> Result<TimeoutHandle> {
        self.lock().alloc()
    }

    pub fn arm_at(&self, handle: TimeoutHandle, deadline: u64) -> Result<bool> {
        let head_changed = self.lock().arm_at(handle, deadline)?;
        if head_changed {
            self.notify();
        }
        Ok(head_changed)
    }

    pub fn arm_in(&self, handle: TimeoutHandle, delta: u64, frequency: u64) -> Result<bool> {
        let head_changed = self.lock().arm_in(handle, delta, frequency)?;
        if head_changed {
            self.notify();
        }
        Ok(head_changed)
    }

    pub fn cancel(&self, handle: TimeoutHandle) -> Result<bool> {
        let was_head = self.lock().cancel(handle)?;
        if was_head {
            self.notify();
        }
        Ok(was_head)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.lock().next_deadline()
    }

    pub fn is_armed(&self, handle: TimeoutHandle) -> bool {
        self.lock().timeouts().is_armed(handle)
    }

    /// Disarms and returns every timeout due now, without blocking.
    pub fn expire(&self) -> Vec<TimerEvent> {
        self.lock().expire()
    }

    /// Blocks until at least one timeout is due, then disarms and returns all due timeouts.
    pub fn wait(&self) -> Vec<TimerEvent> {
        let mut service = self.lock();
        loop {
            let events = service.expire();
            if !events.is_empty() {
                return events;
            }
            let next = service.time_until_next();
            service = match next {
                Some(dur) => {
                    self.inner
                        .wake
                        .wait_timeout(service, dur)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .inner
                    .wake
                    .wait(service)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `max` of host time and returns whatever is
    /// due at that point (possibly nothing).
    ///
    /// A bound too large to represent as an [`Instant`] waits without a limit.
    pub fn wait_timeout(&self, max: Duration) -> Vec<TimerEvent> {
        let Some(give_up) = Instant::now().checked_add(max) else {
            return self.wait();
        };
        let mut service = self.lock();
        loop {
            let events = service.expire();
            let remaining = give_up.saturating_duration_since(Instant::now());
            if !events.is_empty() || remaining.is_zero() {
                return events;
            }
            let dur = service
                .time_until_next()
                .map_or(remaining, |next| next.min(remaining));
            service = self
                .inner
                .wake
                .wait_timeout(service, dur)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
