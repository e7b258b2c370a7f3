//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{clean_playlists, ValidationError};

/// A named trigger that resolves to one playlist at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Unique intent name (e.g., "christmas").
    pub name: String,
    /// Direct playlists, or the referenced group's members when grouped.
    pub playlists: Vec<String>,
    /// Referenced playlist group, if the intent uses one.
    pub playlist_group: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl Intent {
    /// First playlist, kept for clients that only understand a single playlist.
    pub fn primary_playlist(&self) -> Option<&str> {
        self.playlists.first().map(String::as_str)
    }
}

/// Raw `intent` row as stored.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct IntentRow {
    pub id: i64,
    pub name: String,
    pub playlist: String,
    pub playlist_group: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl IntentRow {
    /// The group reference, if set and non-empty.
    pub fn group(&self) -> Option<&str> {
        self.playlist_group
            .as_deref()
            .filter(|group| !group.is_empty())
    }
}

/// A named place that resolves to one speaker entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Location {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Unique location name (e.g., "garage").
    pub name: String,
    /// Opaque actuator identifier (e.g., "media_player.garage").
    pub speaker_entity: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A named, reusable set of playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistGroup {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Unique group name.
    pub name: String,
    /// Member playlists, ordered by playlist identifier.
    pub playlists: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Raw `playlist_group` row as stored.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PlaylistGroupRow {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PlaylistGroupRow {
    pub fn with_playlists(self, playlists: Vec<String>) -> PlaylistGroup {
        PlaylistGroup {
            id: self.id,
            name: self.name,
            playlists,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Where an intent gets its playlists from. Exactly one form is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// An ordered list of playlist identifiers.
    Direct(Vec<String>),
    /// The name of a playlist group.
    Group(String),
}

impl PlaylistSource {
    /// Build a source from loosely-typed input.
    ///
    /// A non-empty group wins over any playlists. Otherwise blank playlist
    /// entries are dropped and at least one must remain.
    pub fn from_parts<I, S>(playlists: I, group: Option<&str>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(group) = group.map(str::trim).filter(|g| !g.is_empty()) {
            return Ok(PlaylistSource::Group(group.to_string()));
        }

        let playlists = clean_playlists(playlists);
        if playlists.is_empty() {
            return Err(ValidationError::MissingPlaylistSource);
        }
        Ok(PlaylistSource::Direct(playlists))
    }

    /// Direct playlists from a list.
    pub fn direct<I, S>(playlists: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_parts(playlists, None)
    }

    /// Reference to a playlist group.
    pub fn group(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::from_parts(Vec::<String>::new(), Some(name.as_ref()))
    }
    /// Re-check a source that may have been built from its variants directly.
    ///
    /// Returns the source with blank playlists dropped, or
    /// `MissingPlaylistSource` if nothing usable is left.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        match self {
            PlaylistSource::Direct(playlists) => Self::from_parts(playlists, None),
            PlaylistSource::Group(group) => Self::group(group),
        }
    }
}
