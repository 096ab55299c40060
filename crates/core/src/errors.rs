use thiserror::Error;

/// Application-level failure taxonomy used at the orchestration boundary.
/// Transport and persistence crates carry their own error types; periodic
/// tasks fold them into this enum before logging.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}
