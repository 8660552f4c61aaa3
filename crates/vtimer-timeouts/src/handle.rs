use std::fmt;
use std::num::NonZeroU32;

/// Identifies one timer slot in a [`crate::TimeoutList`].
///
/// Slot 0 is reserved for the list's sentinel, so a handle is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TimeoutHandle(NonZeroU32);

impl TimeoutHandle {
    /// Wraps a raw slot number, e.g. one restored from a device's saved state.
    ///
    /// Returns `None` for 0. Whether the slot is valid for a particular list is checked when the
    /// handle is used.
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0.get() as usize
    }
}

impl fmt::Display for TimeoutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<TimeoutHandle> for u32 {
    fn from(handle: TimeoutHandle) -> Self {
        handle.get()
    }
}
