use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Rolling window must be a positive integer, got {0}")]
pub struct InvalidWindowError(pub usize);
