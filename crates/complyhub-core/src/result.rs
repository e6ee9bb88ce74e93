//! Application result alias.

use crate::error::AppError;

/// Result type used across every ComplyHub crate.
pub type AppResult<T> = Result<T, AppError>;
