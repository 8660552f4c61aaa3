use std::time::Duration;

use vtimer_clock::{Clock, ClockOptions, TickSource};

use crate::{Result, TimeoutHandle, TimeoutList};

/// A timeout that came due, as returned by [`TimerService::expire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerEvent {
    pub handle: TimeoutHandle,
    /// The tick deadline the handle was armed for.
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimerServiceOptions {
    pub clock: ClockOptions,
}

/// The timer-service side of the monitor: one [`Clock`] plus the [`TimeoutList`] of every
/// emulated timer source, owned by a single control loop.
///
/// The service uses event delivery rather than callbacks; the loop keeps its own
/// `TimeoutHandle -> device` mapping and dispatches the events returned by
/// [`expire`](Self::expire).
#[derive(Debug)]
pub struct TimerService<S, const ENTRIES: usize> {
    clock: Clock<S>,
    timeouts: TimeoutList<ENTRIES>,
}

impl<S: TickSource, const ENTRIES: usize> TimerService<S, ENTRIES> {
    pub fn new(clock: Clock<S>) -> Self {
        Self {
            clock,
            timeouts: TimeoutList::new(),
        }
    }

    pub fn with_options(source: S, options: TimerServiceOptions) -> vtimer_clock::Result<Self> {
        Ok(Self::new(Clock::with_options(source, options.clock)?))
    }

    pub fn clock(&self) -> &Clock<S> {
        &self.clock
    }

    pub fn timeouts(&self) -> &TimeoutList<ENTRIES> {
        &self.timeouts
    }

    pub fn timeouts_mut(&mut self) -> &mut TimeoutList<ENTRIES> {
        &mut self.timeouts
    }

    /// Borrows the clock and the list at the same time, e.g. for
    /// [`crate::PeriodicTimeout::on_fire`].
    pub fn split_mut(&mut self) -> (&Clock<S>, &mut TimeoutList<ENTRIES>) {
        (&self.clock, &mut self.timeouts)
    }

    pub fn alloc(&mut self) -> Result<TimeoutHandle> {
        self.timeouts.alloc()
    }

    /// Arms `handle` for the absolute tick `deadline`. Returns whether the earliest deadline
    /// changed.
    pub fn arm_at(&mut self, handle: TimeoutHandle, deadline: u64) -> Result<bool> {
        self.timeouts.request(handle, deadline)
    }

    /// Arms `handle` to fire `delta` units of the `frequency` domain from now.
    pub fn arm_in(&mut self, handle: TimeoutHandle, delta: u64, frequency: u64) -> Result<bool> {
        let deadline = self.clock.deadline_from_delta(delta, frequency);
        self.timeouts.request(handle, deadline)
    }

    pub fn cancel(&mut self, handle: TimeoutHandle) -> Result<bool> {
        self.timeouts.cancel(handle)
    }

    /// The earliest armed deadline, or `None` when nothing is armed.
    pub fn next_deadline(&self) -> Option<u64> {
        if self.timeouts.is_empty() {
            None
        } else {
            Some(self.timeouts.next_deadline())
        }
    }

    /// Host time until the earliest deadline; zero if it is already due, `None` if there is
    /// nothing to wait for.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .and_then(|deadline| self.clock.duration_until(deadline))
    }

    /// Disarms and returns every timeout due at the current tick, in firing order.
    pub fn expire(&mut self) -> Vec<TimerEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();
        while let Some(handle) = self.timeouts.poll(now) {
            let deadline = self.timeouts.next_deadline();
            if let Err(err) = self.timeouts.cancel(handle) {
                tracing::warn!(%handle, "failed to disarm expired timeout: {err}");
                break;
            }
            tracing::trace!(%handle, deadline, now, "timeout fired");
            events.push(TimerEvent { handle, deadline });
        }
        events
    }

    /// Parks the calling thread until the earliest deadline, or indefinitely if nothing is armed.
    ///
    /// Another thread that arms an earlier deadline on the loop's behalf should
    /// [`unpark`](std::thread::Thread::unpark) the loop thread so it re-evaluates. Spurious
    /// wakeups are possible; callers re-check with [`expire`](Self::expire).
    pub fn park_until_next(&self) {
        match self.time_until_next() {
            Some(dur) if dur.is_zero() => {}
            Some(dur) => std::thread::park_timeout(dur),
            None => std::thread::park(),
        }
    }
}
