use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimeoutError>;

/// Errors reported by [`crate::TimeoutList`].
///
/// Every operation validates its arguments before touching the list, so an error never leaves
/// the list in a partially updated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeoutError {
    #[error("timeout list exhausted: all {capacity} handles are allocated")]
    CapacityExhausted { capacity: usize },

    #[error("invalid timeout handle {handle}")]
    InvalidHandle { handle: u32 },

    #[error("timeout handle {handle} is not armed")]
    NotArmed { handle: u32 },
}
