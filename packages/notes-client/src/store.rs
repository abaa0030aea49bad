//! Note store: a client-side mirror of the remote note collection.
//!
//! The store never edits its note list locally. Every mutation goes to the
//! API and is followed by a full refresh, so the list is always a server
//! response and the view is always derived from it:
//!
//! ```text
//! create / update / remove ──► NotesApi ──► refresh() ──► notes ──► view
//!                                                           ▲
//!                               apply_search / apply_sort ──┘ (view only)
//! ```
//!
//! Refreshes carry a sequence number. A response that arrives after a newer
//! refresh was applied is dropped with `NotesError::Superseded`. A newer
//! refresh that failed does not make an older response stale.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{HttpNotesApi, NotesApi};
use crate::config::ClientConfig;
use crate::error::{NotesError, Result};
use crate::reminder::{LogNotifier, Notifier, ReminderHandle, ReminderScheduler};
use crate::types::{Draft, EditMode, Note, NoteInput, SortOrder};
use crate::view::{derive_view, ViewQuery};

#[derive(Debug, Default)]
struct ListState {
    /// Sequence number of the refresh that produced `notes`.
    applied_seq: u64,
    notes: Vec<Note>,
    view: Vec<Note>,
    search_query: String,
    sort_order: SortOrder,
}

/// Client-side note store.
///
/// Operations take `&self`; share the store behind an `Arc` to run them
/// concurrently.
pub struct NoteStore {
    api: Arc<dyn NotesApi>,
    config: ClientConfig,
    list: RwLock<ListState>,
    draft: RwLock<Draft>,
    refresh_seq: AtomicU64,
    reminders: ReminderScheduler,
}

impl NoteStore {
    /// Create an empty store over `api`. Reminders go to the log until a
    /// notifier is set with [`NoteStore::with_notifier`].
    pub fn new(api: Arc<dyn NotesApi>, config: ClientConfig) -> Self {
        Self {
            api,
            config,
            list: RwLock::new(ListState::default()),
            draft: RwLock::new(Draft::default()),
            refresh_seq: AtomicU64::new(0),
            reminders: ReminderScheduler::new(Arc::new(LogNotifier)),
        }
    }

    /// Create a store talking HTTP to `config.api_base_url`.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let api = HttpNotesApi::new(&config)?;
        Ok(Self::new(Arc::new(api), config))
    }

    /// Deliver reminders to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.reminders = ReminderScheduler::new(notifier);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    // ========================================================================
    // Remote operations
    // ========================================================================

    /// Fetch the full collection and replace the local list with it.
    ///
    /// On failure the previous list is kept.
    pub async fn refresh(&self) -> Result<Vec<Note>> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "Refreshing notes");

        let notes = match self.api.list().await {
            Ok(notes) => notes,
            Err(e) => {
                warn!(seq, error = %e, "Refresh failed, keeping previous notes");
                return Err(e);
            }
        };

        let mut list = self.list.write().await;
        if seq < list.applied_seq {
            debug!(seq, applied = list.applied_seq, "Discarding stale refresh response");
            return Err(NotesError::Superseded { seq });
        }

        list.applied_seq = seq;
        list.notes = notes;
        self.recompute_view(&mut list);
        info!(seq, count = list.notes.len(), "Notes refreshed");
        Ok(list.notes.clone())
    }

    /// Create a note, then refresh.
    ///
    /// On success the draft is cleared and, if `notification_time` is given,
    /// a reminder is armed for it. A rejected create changes nothing.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        notification_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<Note>> {
        let input = NoteInput::new(title, content);
        let created = match self.api.create(&input).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Create failed");
                return Err(e);
            }
        };
        let note_id = created.map(|note| note.id);
        info!(note_id = ?note_id, "Note created");

        self.reset_draft().await;

        if let Some(target) = notification_time {
            self.reminders
                .schedule_at(target, note_id, input.title.as_str())
                .await;
        }

        self.refresh_after_mutation().await
    }

    /// Replace a note's title and content, then refresh.
    ///
    /// On success the draft is cleared and reminders armed for the note are
    /// cancelled, since they carry the old title.
    pub async fn update(&self, id: &str, title: &str, content: &str) -> Result<Vec<Note>> {
        let input = NoteInput::new(title, content);
        if let Err(e) = self.api.update(id, &input).await {
            warn!(note_id = id, error = %e, "Update failed");
            return Err(e);
        }
        info!(note_id = id, "Note updated");

        self.reminders.cancel_for_note(id).await;
        self.reset_draft().await;

        self.refresh_after_mutation().await
    }

    /// Delete a note and refresh whether or not the delete succeeded.
    ///
    /// Returns the delete error, if any, after the refresh has run.
    pub async fn remove(&self, id: &str) -> Result<Vec<Note>> {
        let deleted = self.api.delete(id).await;
        match &deleted {
            Ok(()) => {
                info!(note_id = id, "Note deleted");
                self.reminders.cancel_for_note(id).await;
                let mut draft = self.draft.write().await;
                if draft.editing_note_id.as_deref() == Some(id) {
                    *draft = Draft::default();
                }
            }
            Err(e) => warn!(note_id = id, error = %e, "Delete failed, refreshing anyway"),
        }

        let refreshed = self.refresh_after_mutation().await;
        deleted?;
        refreshed
    }

    /// Submit the draft: create when idle, update when editing.
    pub async fn submit(&self) -> Result<Vec<Note>> {
        let draft = self.draft().await;
        if draft.title.trim().is_empty() {
            return Err(NotesError::Validation("title is required".into()));
        }
        if draft.content.trim().is_empty() {
            return Err(NotesError::Validation("content is required".into()));
        }

        match draft.mode() {
            EditMode::Idle => {
                self.create(&draft.title, &draft.content, draft.notification_time)
                    .await
            }
            EditMode::Editing(id) => self.update(&id, &draft.title, &draft.content).await,
        }
    }

    /// A mutation already went through. A superseded refresh means a newer
    /// list, fetched after the mutation, is already in place.
    async fn refresh_after_mutation(&self) -> Result<Vec<Note>> {
        match self.refresh().await {
            Err(NotesError::Superseded { .. }) => Ok(self.notes().await),
            other => other,
        }
    }

    // ========================================================================
    // Draft state
    // ========================================================================

    /// Load a note into the draft and switch to editing it.
    pub async fn begin_edit(&self, note: &Note) {
        let mut draft = self.draft.write().await;
        draft.title = note.title.clone();
        draft.content = note.content.clone();
        draft.editing_note_id = Some(note.id.clone());
        debug!(note_id = %note.id, "Editing note");
    }

    pub async fn reset_draft(&self) {
        *self.draft.write().await = Draft::default();
    }

    pub async fn set_draft_title(&self, title: impl Into<String>) {
        self.draft.write().await.title = title.into();
    }

    pub async fn set_draft_content(&self, content: impl Into<String>) {
        self.draft.write().await.content = content.into();
    }

    pub async fn set_notification_time(&self, at: Option<DateTime<Utc>>) {
        self.draft.write().await.notification_time = at;
    }

    pub async fn draft(&self) -> Draft {
        self.draft.read().await.clone()
    }

    pub async fn edit_mode(&self) -> EditMode {
        self.draft.read().await.mode()
    }

    // ========================================================================
    // Reminders
    // ========================================================================

    /// Arm a reminder for `note_title` at `target`.
    ///
    /// A time that is not in the future is ignored and yields `None`.
    pub async fn schedule_reminder(
        &self,
        target: DateTime<Utc>,
        note_title: &str,
    ) -> Option<ReminderHandle> {
        self.reminders.schedule_at(target, None, note_title).await
    }

    pub async fn pending_reminders(&self) -> Vec<ReminderHandle> {
        self.reminders.pending().await
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Filter the view by title. The note list itself is untouched.
    pub async fn apply_search(&self, query: &str) -> Result<Vec<Note>> {
        if !self.config.enable_search {
            return Err(NotesError::FeatureDisabled("search"));
        }
        let mut list = self.list.write().await;
        list.search_query = query.to_string();
        self.recompute_view(&mut list);
        debug!(query, matches = list.view.len(), "Search applied");
        Ok(list.view.clone())
    }

    /// Order the view by creation date.
    pub async fn apply_sort(&self, order: SortOrder) -> Result<Vec<Note>> {
        if !self.config.enable_sort {
            return Err(NotesError::FeatureDisabled("sort"));
        }
        let mut list = self.list.write().await;
        list.sort_order = order;
        self.recompute_view(&mut list);
        debug!(%order, "Sort applied");
        Ok(list.view.clone())
    }

    /// Full note list from the last applied refresh.
    pub async fn notes(&self) -> Vec<Note> {
        self.list.read().await.notes.clone()
    }

    /// Filtered and sorted view for display.
    pub async fn view(&self) -> Vec<Note> {
        self.list.read().await.view.clone()
    }

    pub async fn search_query(&self) -> String {
        self.list.read().await.search_query.clone()
    }

    pub async fn sort_order(&self) -> SortOrder {
        self.list.read().await.sort_order
    }

    /// Find a note in the current list.
    pub async fn get(&self, id: &str) -> Option<Note> {
        self.list
            .read()
            .await
            .notes
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    fn recompute_view(&self, list: &mut ListState) {
        let query = ViewQuery {
            search: self
                .config
                .enable_search
                .then(|| list.search_query.clone()),
            sort: self.config.enable_sort.then_some(list.sort_order),
        };
        list.view = derive_view(&list.notes, &query);
    }
}
