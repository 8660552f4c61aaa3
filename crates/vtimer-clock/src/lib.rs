//! Hardware tick counter and time-domain conversion.
//!
//! Every timer device in the monitor (PIT, RTC, local APIC, HPET) expresses its deadlines in its
//! own frequency domain. [`Clock`] wraps a single free-running tick counter (a [`TickSource`])
//! together with the counter's reference frequency, and converts between the counter and any
//! caller-chosen domain using 128-bit intermediates so the scaling can never overflow before the
//! division.
//!
//! Deadlines produced by [`Clock::deadline_from_delta`] are absolute counter values, which makes
//! them directly comparable across components regardless of which domain they were armed in.

#![forbid(unsafe_code)]

mod clock;
mod error;
pub mod math;
mod source;

pub use clock::{Clock, ClockOptions};
pub use error::{ClockError, Result};
pub use source::{HostTicks, ManualTicks, TickSource, HOST_TICK_HZ};
