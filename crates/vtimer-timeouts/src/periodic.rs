use vtimer_clock::{Clock, TickSource};

use crate::{Result, TimeoutError, TimeoutHandle, TimeoutList};

/// Re-arms one timeout slot at a fixed rate, e.g. an emulated PIT rate generator or the RTC
/// periodic interrupt.
///
/// Deadlines are computed from the tick at which the timer was started plus a whole number of
/// periods, never from the time the previous expiry happened to be serviced. Late servicing
/// therefore does not stretch the period, and rounding from the device's domain into ticks
/// does not accumulate.
#[derive(Debug, Clone)]
pub struct PeriodicTimeout {
    handle: TimeoutHandle,
    frequency: u64,
    period: u64,
    start_tick: u64,
    fired: u64,
    next_deadline: Option<u64>,
}

impl PeriodicTimeout {
    /// A timer firing every `period` units of the `frequency` domain.
    ///
    /// `frequency` must be non-zero.
    pub fn new(handle: TimeoutHandle, frequency: u64, period: u64) -> Self {
        Self {
            handle,
            frequency,
            period,
            start_tick: 0,
            fired: 0,
            next_deadline: None,
        }
    }

    pub fn handle(&self) -> TimeoutHandle {
        self.handle
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Number of expiries handled since the last [`start`](Self::start).
    pub fn fired(&self) -> u64 {
        self.fired
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.next_deadline
    }

    pub fn is_running(&self) -> bool {
        self.next_deadline.is_some()
    }

    /// Arms the first expiry one period from now. Returns whether the list head changed.
    pub fn start<S: TickSource, const ENTRIES: usize>(
        &mut self,
        clock: &Clock<S>,
        list: &mut TimeoutList<ENTRIES>,
    ) -> Result<bool> {
        self.start_tick = clock.now();
        self.fired = 0;
        self.arm(clock, list)
    }

    /// Handles an expiry of this timer and arms the following one.
    ///
    /// If the timer was never started this behaves like [`start`](Self::start).
    pub fn on_fire<S: TickSource, const ENTRIES: usize>(
        &mut self,
        clock: &Clock<S>,
        list: &mut TimeoutList<ENTRIES>,
    ) -> Result<bool> {
        if self.next_deadline.is_none() {
            return self.start(clock, list);
        }
        self.fired = self.fired.saturating_add(1);
        self.arm(clock, list)
    }

    /// Disarms the timer. Returns `true` if it was at the head of the list.
    pub fn stop<const ENTRIES: usize>(&mut self, list: &mut TimeoutList<ENTRIES>) -> Result<bool> {
        self.next_deadline = None;
        match list.cancel(self.handle) {
            Err(TimeoutError::NotArmed { .. }) => Ok(false),
            other => other,
        }
    }

    fn arm<S: TickSource, const ENTRIES: usize>(
        &mut self,
        clock: &Clock<S>,
        list: &mut TimeoutList<ENTRIES>,
    ) -> Result<bool> {
        let units = self.fired.saturating_add(1).saturating_mul(self.period);
        let deadline = self
            .start_tick
            .saturating_add(clock.ticks_for(units, self.frequency));
        let head_changed = list.request(self.handle, deadline)?;
        self.next_deadline = Some(deadline);
        Ok(head_changed)
    }
}
