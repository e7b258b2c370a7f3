//! Input validation for intents, locations, and playlist groups.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty value where one is required.
    Empty(String),
    /// Neither a playlist list nor a playlist group was supplied.
    MissingPlaylistSource,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::MissingPlaylistSource => {
                write!(f, "either playlists or playlist_group is required")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Require a non-blank value for `field`.
pub fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    Ok(())
}

/// Require a value of at least one character. Whitespace counts.
pub fn require_present(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    Ok(())
}

/// Drop blank entries from a playlist list, keeping order.
pub fn clean_playlists<I, S>(playlists: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    playlists
        .into_iter()
        .filter(|p| !p.as_ref().trim().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect()
}
