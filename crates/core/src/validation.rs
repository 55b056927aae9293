//! Client-side task validation
//!
//! Mirrors the backend's constraints so that obviously invalid input is
//! rejected before a request is ever issued.

use thiserror::Error;

/// Maximum title length accepted by the backend
pub const TITLE_MAX_LEN: usize = 100;

/// Reasons a task title is rejected locally
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("title must not be empty")]
    Empty,

    #[error("title must be at most {TITLE_MAX_LEN} characters, got {0}")]
    TooLong(usize),
}

/// Validate a task title before submission
///
/// A title consisting only of whitespace counts as empty. Length is measured
/// in characters, matching the backend's `max_length` semantics.
pub fn validate_title(title: &str) -> Result<(), TitleError> {
    if title.trim().is_empty() {
        return Err(TitleError::Empty);
    }
    let len = title.chars().count();
    if len > TITLE_MAX_LEN {
        return Err(TitleError::TooLong(len));
    }
    Ok(())
}
