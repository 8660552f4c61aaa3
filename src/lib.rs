//! Timeout-management core for emulated timer devices.
//!
//! - [`clock`]: the hardware tick counter and conversion into device frequency domains.
//! - [`timeouts`]: the fixed-capacity sorted timeout list and the timer loop built on it.

pub use vtimer_clock as clock;
pub use vtimer_timeouts as timeouts;

pub use vtimer_clock::{Clock, ClockError, ClockOptions, HostTicks, ManualTicks, TickSource};
pub use vtimer_timeouts::{
    PeriodicTimeout, SharedTimerService, TimeoutError, TimeoutHandle, TimeoutList, TimerEvent,
    TimerService, TimerServiceOptions, NO_DEADLINE,
};
