//! Wire and state types for the notes client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NotesError;

// ============================================================================
// Wire Types
// ============================================================================

/// A note as returned by the remote API.
///
/// The API is document-store backed and names the identifier `_id`;
/// `id` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// View Parameters
// ============================================================================

/// Ordering of the derived view by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Más nuevas",
            SortOrder::Oldest => "Más viejas",
        }
    }

    pub fn variants() -> &'static [SortOrder] {
        &[SortOrder::Newest, SortOrder::Oldest]
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Oldest => write!(f, "oldest"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            other => Err(NotesError::Validation(format!(
                "unknown sort order '{}', expected newest or oldest",
                other
            ))),
        }
    }
}

// ============================================================================
// Draft / Editing State
// ============================================================================

/// Which operation a submit performs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Submit creates a new note.
    #[default]
    Idle,
    /// Submit updates the note with this id.
    Editing(String),
}

/// Unsaved form values held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub editing_note_id: Option<String>,
    pub notification_time: Option<DateTime<Utc>>,
}

impl Draft {
    pub fn mode(&self) -> EditMode {
        match &self.editing_note_id {
            Some(id) => EditMode::Editing(id.clone()),
            None => EditMode::Idle,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Draft::default()
    }
}
