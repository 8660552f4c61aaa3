use std::fmt;

use crate::{Result, TimeoutError, TimeoutHandle};

/// Deadline reported by [`TimeoutList::next_deadline`] when nothing is armed.
///
/// This is the sentinel's deadline. It means "no pending timeout" and must not be treated as a
/// real point in time to wait for.
pub const NO_DEADLINE: u64 = u64::MAX;

const SENTINEL: usize = 0;

#[derive(Debug, Clone, Copy)]
struct Slot {
    next: usize,
    prev: usize,
    deadline: u64,
}

/// A fixed pool of `ENTRIES` timeout slots kept on one sorted, circular, doubly-linked ring.
///
/// Slot 0 is a permanent sentinel whose deadline is [`NO_DEADLINE`]; it anchors the ring and
/// terminates every insertion scan. The remaining `ENTRIES - 1` slots are handed out by
/// [`alloc`](Self::alloc). A slot whose links point at itself is not armed.
///
/// Walking the ring forward from the sentinel visits armed slots in firing order: ascending by
/// deadline, and in arming order among equal deadlines.
///
/// Handles are issued from an increasing counter and are never recycled, so the capacity must
/// cover every timer created over the list's lifetime.
#[derive(Clone)]
pub struct TimeoutList<const ENTRIES: usize> {
    slots: [Slot; ENTRIES],
    allocated: usize,
    armed: usize,
}

impl<const ENTRIES: usize> TimeoutList<ENTRIES> {
    const HAS_SENTINEL: () = assert!(ENTRIES >= 1, "a timeout list needs its sentinel slot");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::HAS_SENTINEL;

        let mut slots: [Slot; ENTRIES] = std::array::from_fn(|i| Slot {
            next: i,
            prev: i,
            deadline: 0,
        });
        slots[SENTINEL].deadline = NO_DEADLINE;
        Self {
            slots,
            allocated: 0,
            armed: 0,
        }
    }

    /// Number of handles this list can ever issue (`ENTRIES - 1`).
    #[inline]
    pub const fn capacity(&self) -> usize {
        ENTRIES - 1
    }

    /// Number of handles issued so far.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Number of currently armed timeouts.
    #[inline]
    pub fn len(&self) -> usize {
        self.armed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.armed == 0
    }

    /// Issues a new handle, strictly greater than every handle issued before it.
    pub fn alloc(&mut self) -> Result<TimeoutHandle> {
        let capacity = self.capacity();
        let next = self.allocated + 1;
        let handle = match u32::try_from(next).ok().and_then(TimeoutHandle::new) {
            Some(handle) if self.allocated < capacity => handle,
            _ => {
                tracing::warn!(
                    allocated = self.allocated,
                    entries = ENTRIES,
                    "cannot allocate a timeout handle"
                );
                return Err(TimeoutError::CapacityExhausted { capacity });
            }
        };
        self.allocated = next;
        Ok(handle)
    }

    /// Disarms `handle`.
    ///
    /// Returns `true` if the handle was at the head of the list, i.e. the earliest deadline has
    /// changed and a waiter keyed on it should re-evaluate.
    pub fn cancel(&mut self, handle: TimeoutHandle) -> Result<bool> {
        let idx = self.slot_index(handle)?;
        if !self.is_linked(idx) {
            return Err(TimeoutError::NotArmed {
                handle: handle.get(),
            });
        }
        let was_head = self.head() == idx;
        self.unlink(idx);
        tracing::trace!(%handle, was_head, "timeout cancelled");
        Ok(was_head)
    }

    /// Arms `handle` to fire at the absolute tick `deadline`, replacing any previous arming.
    ///
    /// Among equal deadlines the handle armed first fires first. Returns `true` if the earliest
    /// deadline in the list differs from what it was before the call.
    pub fn request(&mut self, handle: TimeoutHandle, deadline: u64) -> Result<bool> {
        let idx = self.slot_index(handle)?;
        let before = self.next_deadline();
        if self.is_linked(idx) {
            self.unlink(idx);
        }

        // The sentinel holds the largest deadline, so the walk always stops on or before it.
        let mut at = self.head();
        while at != SENTINEL && self.slots[at].deadline <= deadline {
            at = self.slots[at].next;
        }

        let prev = self.slots[at].prev;
        self.slots[idx] = Slot {
            next: at,
            prev,
            deadline,
        };
        self.slots[prev].next = idx;
        self.slots[at].prev = idx;
        self.armed += 1;

        let head_changed = self.next_deadline() != before;
        tracing::trace!(%handle, deadline, head_changed, "timeout requested");
        Ok(head_changed)
    }

    /// The earliest armed deadline, or [`NO_DEADLINE`] if nothing is armed.
    #[inline]
    pub fn next_deadline(&self) -> u64 {
        self.slots[self.head()].deadline
    }

    /// Returns the head handle if its deadline is due at `now`.
    ///
    /// The handle stays armed; the caller disarms it with [`cancel`](Self::cancel) or re-arms it
    /// with [`request`](Self::request) once it has been handled.
    pub fn poll(&self, now: u64) -> Option<TimeoutHandle> {
        let head = self.head();
        if head == SENTINEL || now < self.slots[head].deadline {
            return None;
        }
        Self::handle_at(head)
    }

    /// Whether `handle` is currently armed. Invalid handles are never armed.
    pub fn is_armed(&self, handle: TimeoutHandle) -> bool {
        self.slot_index(handle)
            .map(|idx| self.is_linked(idx))
            .unwrap_or(false)
    }

    /// The deadline `handle` is armed for, if it is armed.
    pub fn deadline(&self, handle: TimeoutHandle) -> Option<u64> {
        let idx = self.slot_index(handle).ok()?;
        self.is_linked(idx).then(|| self.slots[idx].deadline)
    }

    /// Armed `(handle, deadline)` pairs in firing order.
    pub fn iter(&self) -> Iter<'_, ENTRIES> {
        Iter {
            list: self,
            at: self.head(),
        }
    }

    fn slot_index(&self, handle: TimeoutHandle) -> Result<usize> {
        let idx = handle.index();
        if idx >= ENTRIES || idx > self.allocated {
            return Err(TimeoutError::InvalidHandle {
                handle: handle.get(),
            });
        }
        Ok(idx)
    }

    #[inline]
    fn head(&self) -> usize {
        self.slots[SENTINEL].next
    }

    #[inline]
    fn is_linked(&self, idx: usize) -> bool {
        self.slots[idx].next != idx
    }

    fn unlink(&mut self, idx: usize) {
        let Slot { next, prev, .. } = self.slots[idx];
        self.slots[next].prev = prev;
        self.slots[prev].next = next;
        self.slots[idx].next = idx;
        self.slots[idx].prev = idx;
        self.armed -= 1;
    }

    fn handle_at(idx: usize) -> Option<TimeoutHandle> {
        u32::try_from(idx).ok().and_then(TimeoutHandle::new)
    }
}

impl<const ENTRIES: usize> Default for TimeoutList<ENTRIES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ENTRIES: usize> fmt::Debug for TimeoutList<ENTRIES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutList")
            .field("entries", &ENTRIES)
            .field("allocated", &self.allocated)
            .field("armed", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, const ENTRIES: usize> IntoIterator for &'a TimeoutList<ENTRIES> {
    type Item = (TimeoutHandle, u64);
    type IntoIter = Iter<'a, ENTRIES>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over armed timeouts in firing order, returned by [`TimeoutList::iter`].
pub struct Iter<'a, const ENTRIES: usize> {
    list: &'a TimeoutList<ENTRIES>,
    at: usize,
}

impl<const ENTRIES: usize> Iterator for Iter<'_, ENTRIES> {
    type Item = (TimeoutHandle, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == SENTINEL {
            return None;
        }
        let slot = self.list.slots[self.at];
        let handle = TimeoutList::<ENTRIES>::handle_at(self.at)?;
        self.at = slot.next;
        Some((handle, slot.deadline))
    }
}
