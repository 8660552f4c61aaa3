//! Fixed-capacity sorted timeout queue for emulated timer devices.
//!
//! [`TimeoutList`] tracks up to `ENTRIES - 1` independent timers (one per emulated timer source)
//! and always knows the single earliest deadline among them. Deadlines are absolute tick values,
//! normally produced by [`vtimer_clock::Clock::deadline_from_delta`].
//!
//! The list itself never reads the time. A driving loop asks for [`TimeoutList::next_deadline`],
//! waits until then, and calls [`TimeoutList::poll`] to find out which handle is due.
//! [`TimerService`] and [`SharedTimerService`] package that loop for single-owner and
//! lock-protected multi-writer use respectively.

#![forbid(unsafe_code)]

mod error;
mod handle;
mod list;
mod periodic;
mod service;
mod shared;

pub use error::{Result, TimeoutError};
pub use handle::TimeoutHandle;
pub use list::{Iter, TimeoutList, NO_DEADLINE};
pub use periodic::PeriodicTimeout;
pub use service::{TimerEvent, TimerService, TimerServiceOptions};
pub use shared::SharedTimerService;
