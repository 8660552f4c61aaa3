use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClockError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("reference frequency must be non-zero")]
    ZeroReferenceFrequency,
}
