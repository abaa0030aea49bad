//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the notes client
//! without a running notes API.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use tokio::sync::{oneshot, Notify};

use crate::api::NotesApi;
use crate::error::{NotesError, Result};
use crate::reminder::{Notification, Notifier};
use crate::types::{Note, NoteInput};

/// API operation, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    List,
    Create,
    Update,
    Delete,
}

/// Record of a call made to the mock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockApiCall {
    List,
    Create { title: String, content: String },
    Update { id: String, title: String, content: String },
    Delete { id: String },
}

impl MockApiCall {
    pub fn op(&self) -> MockOp {
        match self {
            MockApiCall::List => MockOp::List,
            MockApiCall::Create { .. } => MockOp::Create,
            MockApiCall::Update { .. } => MockOp::Update,
            MockApiCall::Delete { .. } => MockOp::Delete,
        }
    }
}

/// Holds a paused `list` response until released.
pub struct ListGate {
    tx: oneshot::Sender<()>,
}

impl ListGate {
    pub fn release(self) {
        let _ = self.tx.send(());
    }
}

/// In-memory stand-in for the remote notes API.
///
/// Assigns ids (`note-1`, `note-2`, ...) and minute-spaced `created_at`
/// timestamps the way the real server would, and records every call.
pub struct MockNotesApi {
    notes: RwLock<Vec<Note>>,
    next_id: AtomicU64,
    epoch: DateTime<Utc>,
    echo_created: bool,
    failures: RwLock<HashMap<MockOp, VecDeque<u16>>>,
    list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    calls: RwLock<Vec<MockApiCall>>,
}

impl Default for MockNotesApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotesApi {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            echo_created: true,
            failures: RwLock::new(HashMap::new()),
            list_gates: Mutex::new(VecDeque::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Seed the server-side collection.
    pub fn with_notes(self, notes: Vec<Note>) -> Self {
        *self.notes.write().unwrap() = notes;
        self
    }

    /// Whether create responses carry the created note (default `true`).
    pub fn with_echo_created(mut self, echo: bool) -> Self {
        self.echo_created = echo;
        self
    }

    /// Make the next call of `op` fail with `status`.
    pub fn fail_next(&self, op: MockOp, status: u16) {
        self.failures
            .write()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(status);
    }

    /// Hold the next `list` response until the gate is released.
    ///
    /// The collection is snapshotted when the request arrives, not when it
    /// is released.
    pub fn pause_next_list(&self) -> ListGate {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().push_back(rx);
        ListGate { tx }
    }

    /// Add a note server-side without going through the API, as another
    /// client would.
    pub fn insert_note(&self, title: &str, content: &str) -> Note {
        let note = self.make_note(title, content);
        self.notes.write().unwrap().push(note.clone());
        note
    }

    /// Current server-side collection.
    pub fn stored_notes(&self) -> Vec<Note> {
        self.notes.read().unwrap().clone()
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockApiCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self, op: MockOp) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn make_note(&self, title: &str, content: &str) -> Note {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Note {
            id: format!("note-{}", n),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Some(self.epoch + Duration::minutes(n as i64)),
        }
    }

    fn record(&self, call: MockApiCall) -> Result<()> {
        let op = call.op();
        self.calls.write().unwrap().push(call);
        let injected = self
            .failures
            .write()
            .unwrap()
            .get_mut(&op)
            .and_then(|queue| queue.pop_front());
        match injected {
            Some(status) => Err(NotesError::Api {
                status,
                message: format!("injected {:?} failure", op),
            }),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> NotesError {
        NotesError::Api {
            status: 404,
            message: format!("Note {} not found", id),
        }
    }
}

#[async_trait]
impl NotesApi for MockNotesApi {
    async fn list(&self) -> Result<Vec<Note>> {
        self.record(MockApiCall::List)?;
        let snapshot = self.stored_notes();
        let gate = self.list_gates.lock().unwrap().pop_front();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        Ok(snapshot)
    }

    async fn create(&self, input: &NoteInput) -> Result<Option<Note>> {
        self.record(MockApiCall::Create {
            title: input.title.clone(),
            content: input.content.clone(),
        })?;
        let note = self.insert_note(&input.title, &input.content);
        Ok(self.echo_created.then_some(note))
    }

    async fn update(&self, id: &str, input: &NoteInput) -> Result<()> {
        self.record(MockApiCall::Update {
            id: id.to_string(),
            title: input.title.clone(),
            content: input.content.clone(),
        })?;
        let mut notes = self.notes.write().unwrap();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        note.title = input.title.clone();
        note.content = input.content.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record(MockApiCall::Delete { id: id.to_string() })?;
        let mut notes = self.notes.write().unwrap();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

/// Notifier that keeps every notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    signal: Notify,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` notifications were delivered.
    pub async fn wait_for(&self, count: usize) {
        loop {
            if self.sent.lock().unwrap().len() >= count {
                return;
            }
            self.signal.notified().await;
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
        self.signal.notify_one();
    }
}
