//! Result type alias for Amnesia

use super::errors::AmnesiaError;

/// Result type alias for Amnesia operations
///
/// Convenience alias that uses [`AmnesiaError`] as the error type. Use this
/// throughout the codebase for fallible operations.
pub type Result<T> = std::result::Result<T, AmnesiaError>;
