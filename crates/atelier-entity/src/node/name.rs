//! Node name validation.

use atelier_core::error::AppError;
use atelier_core::result::AppResult;

/// The path separator. Names must never contain it so that resolved paths
/// stay unambiguous.
pub const SEPARATOR: char = '/';

/// Validate a node name: non-empty after trimming, within the length
/// bound, and free of the path separator.
pub fn validate(name: &str, max_length: usize) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Node name cannot be empty"));
    }
    if name.len() > max_length {
        return Err(AppError::validation(format!(
            "Node name exceeds {max_length} bytes"
        )));
    }
    if name.contains(SEPARATOR) {
        return Err(AppError::validation(format!(
            "Node name cannot contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}
