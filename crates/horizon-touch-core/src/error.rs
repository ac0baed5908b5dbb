//! Error types for Horizon Touch core.

use thiserror::Error;

/// Timer-specific errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid or has already fired or been cancelled.
    #[error("invalid or expired timer ID")]
    InvalidTimerId,
}

/// Handler registration errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler ID is invalid or has already been removed.
    #[error("invalid or removed handler ID")]
    InvalidHandler,
}

/// The main error type for core operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Timer-related error.
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),
    /// Handler-related error.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
