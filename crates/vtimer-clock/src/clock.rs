use std::time::Duration;

use crate::math::{mul_div, mul_div_ceil};
use crate::source::{HostTicks, TickSource, HOST_TICK_HZ};
use crate::{ClockError, Result};

/// Construction options for [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClockOptions {
    /// Tick rate of the underlying counter, in ticks per second.
    pub reference_frequency_hz: u64,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            reference_frequency_hz: HOST_TICK_HZ,
        }
    }
}

/// A tick counter paired with its reference frequency.
///
/// `Clock` is immutable after construction and only reads its source, so a shared `&Clock` can
/// be used from any number of threads when `S: Sync`.
#[derive(Debug, Clone)]
pub struct Clock<S> {
    source: S,
    reference_frequency: u64,
}

impl Clock<HostTicks> {
    /// A clock backed by the host monotonic clock, ticking in nanoseconds.
    pub fn host() -> Self {
        Self::with_valid_frequency(HostTicks::new(), HOST_TICK_HZ)
    }
}

impl<S: TickSource> Clock<S> {
    pub fn new(reference_frequency: u64, source: S) -> Result<Self> {
        if reference_frequency == 0 {
            return Err(ClockError::ZeroReferenceFrequency);
        }
        Ok(Self::with_valid_frequency(source, reference_frequency))
    }

    fn with_valid_frequency(source: S, reference_frequency: u64) -> Self {
        debug_assert!(reference_frequency != 0);
        tracing::debug!(reference_frequency, "clock source initialised");
        Self {
            source,
            reference_frequency,
        }
    }

    pub fn with_options(source: S, options: ClockOptions) -> Result<Self> {
        Self::new(options.reference_frequency_hz, source)
    }

    #[inline]
    pub fn reference_frequency(&self) -> u64 {
        self.reference_frequency
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current raw tick count.
    #[inline]
    pub fn now(&self) -> u64 {
        self.source.now()
    }

    /// Current time expressed in the domain ticking at `frequency`.
    ///
    /// `frequency` must be non-zero; this is not checked at runtime outside debug builds.
    #[inline]
    pub fn in_domain(&self, frequency: u64) -> u64 {
        mul_div(self.now(), frequency, self.reference_frequency)
    }

    /// Converts `delta` units of the `frequency` domain into raw ticks.
    #[inline]
    pub fn ticks_for(&self, delta: u64, frequency: u64) -> u64 {
        debug_assert!(frequency != 0, "zero timer frequency");
        mul_div(delta, self.reference_frequency, frequency)
    }

    /// Absolute tick deadline `delta` units of `frequency` from now.
    ///
    /// A deadline past the end of the counter's range saturates to `u64::MAX`, which timeout
    /// lists treat as "never".
    #[inline]
    pub fn deadline_from_delta(&self, delta: u64, frequency: u64) -> u64 {
        self.now().saturating_add(self.ticks_for(delta, frequency))
    }

    /// Ticks remaining until `deadline`, or 0 if it is already due.
    pub fn ticks_until(&self, deadline: u64) -> u64 {
        deadline.saturating_sub(self.now())
    }

    /// Host wall time until `deadline`, rounded up to the next nanosecond.
    ///
    /// Returns `None` for `u64::MAX`, the "no deadline" value.
    pub fn duration_until(&self, deadline: u64) -> Option<Duration> {
        if deadline == u64::MAX {
            return None;
        }
        let ticks = self.ticks_until(deadline);
        let nanos = mul_div_ceil(ticks, HOST_TICK_HZ, self.reference_frequency);
        Some(Duration::from_nanos(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualTicks;
    use std::io;
    use std::sync::{Arc, Mutex};

    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn zero_reference_frequency_is_rejected() {
        let err = Clock::new(0, ManualTicks::new()).unwrap_err();
        assert_eq!(err, ClockError::ZeroReferenceFrequency);
    }

    #[test]
    fn fifty_hertz_in_gigahertz_domain() {
        let clock = Clock::new(1_000_000_000, ManualTicks::new()).unwrap();
        assert_eq!(clock.deadline_from_delta(1, 50), 20_000_000);
    }

    #[test]
    fn deadline_is_relative_to_now() {
        let ticks = ManualTicks::new();
        let clock = Clock::new(1_000, ticks.clone()).unwrap();
        ticks.advance(500);
        assert_eq!(clock.deadline_from_delta(3, 10), 800);
    }

    #[test]
    fn in_domain_scales_current_ticks() {
        let ticks = ManualTicks::starting_at(3_000_000_000);
        let clock = Clock::new(1_000_000_000, ticks).unwrap();
        assert_eq!(clock.in_domain(1_000), 3_000);
        assert_eq!(clock.in_domain(1_193_182), 3_579_546);
    }

    #[test]
    fn in_domain_near_counter_limit_does_not_overflow() {
        let ticks = ManualTicks::starting_at(u64::MAX);
        let clock = Clock::new(u64::MAX, ticks).unwrap();
        assert_eq!(clock.in_domain(u64::MAX), u64::MAX);
        assert_eq!(clock.in_domain(1), 1);
    }

    #[test]
    fn deadline_saturates_instead_of_wrapping() {
        let ticks = ManualTicks::starting_at(u64::MAX - 10);
        let clock = Clock::new(u64::MAX, ticks).unwrap();
        assert_eq!(clock.deadline_from_delta(u64::MAX, 1), u64::MAX);
        assert_eq!(clock.deadline_from_delta(1, u64::MAX), u64::MAX - 9);
    }

    #[test]
    fn duration_until_rounds_up_and_handles_idle() {
        let ticks = ManualTicks::new();
        let clock = Clock::new(3, ticks.clone()).unwrap();
        // 1 tick at 3 Hz is 333_333_333.33.. ns.
        assert_eq!(clock.duration_until(1), Some(Duration::from_nanos(333_333_334)));
        assert_eq!(clock.duration_until(u64::MAX), None);

        ticks.advance(5);
        assert_eq!(clock.duration_until(2), Some(Duration::ZERO));
        assert_eq!(clock.ticks_until(2), 0);
    }

    #[test]
    fn host_clock_logs_its_reference_frequency() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer({
                let buf = buf.clone();
                move || Capture(buf.clone())
            })
            .finish();

        let clock = tracing::subscriber::with_default(subscriber, Clock::host);
        assert_eq!(clock.reference_frequency(), HOST_TICK_HZ);

        let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(out.contains("clock source initialised"), "{out}");
        assert!(out.contains("reference_frequency=1000000000"), "{out}");
    }

    #[test]
    fn options_default_to_host_ticks() {
        let clock = Clock::with_options(ManualTicks::new(), ClockOptions::default()).unwrap();
        assert_eq!(clock.reference_frequency(), HOST_TICK_HZ);
    }
}
