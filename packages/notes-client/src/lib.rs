//! Client-side note store for a remote notes REST API.
//!
//! The store mirrors the server's note collection, derives a searchable and
//! sortable view from it, and can arm one-shot local reminders for new notes.
//! Every write goes to the API and is followed by a full refresh; the store
//! never edits its list locally.
//!
//! # Example
//!
//! ```rust,ignore
//! use notes_client::{ClientConfig, NoteStore, SortOrder};
//!
//! let store = NoteStore::from_config(ClientConfig::from_env()?)?;
//! store.refresh().await?;
//!
//! store.create("Compras", "Leche y pan", None).await?;
//!
//! store.apply_search("comp").await?;
//! for note in store.apply_sort(SortOrder::Newest).await? {
//!     println!("{}", note.title);
//! }
//! ```
//!
//! # Modules
//!
//! - [`store`] - The note store controller
//! - [`api`] - `NotesApi` trait and its HTTP implementation
//! - [`view`] - Search and sort derivation
//! - [`reminder`] - Cancellable one-shot reminders
//! - [`format`] - Display dates
//! - [`testing`] - Mock implementations for testing

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod reminder;
pub mod store;
pub mod testing;
pub mod types;
pub mod view;

pub use api::{HttpNotesApi, NotesApi};
pub use config::ClientConfig;
pub use error::{NotesError, Result};
pub use format::{format_created_at, format_timestamp};
pub use reminder::{
    parse_local_datetime, LogNotifier, Notification, Notifier, ReminderHandle,
    ReminderScheduler, REMINDER_TITLE,
};
pub use store::NoteStore;
pub use types::{Draft, EditMode, Note, NoteInput, SortOrder};
pub use view::{derive_view, filter_by_title, sort_by_created, ViewQuery};
