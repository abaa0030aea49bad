//! In-process notes API for integration tests.
//!
//! Serves the same routes and document shape as the production API
//! (`_id`, `createdAt`, `__v`) on an ephemeral localhost port.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

#[derive(Default)]
struct ServerState {
    notes: Vec<Value>,
    next_id: u64,
    fail_next: Option<StatusCode>,
    echo_created: bool,
    list_delay: Option<StdDuration>,
    html_next_list: bool,
}

#[derive(Deserialize)]
struct NoteBody {
    title: String,
    content: String,
}

/// Handle to a running test server.
#[derive(Clone)]
pub struct TestServer {
    pub addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl TestServer {
    /// Start a server with an empty collection.
    pub async fn start() -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let state = Arc::new(Mutex::new(ServerState {
            echo_created: true,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/notes", get(list_notes).post(create_note))
            .route("/api/notes/:id", put(update_note).delete(delete_note))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Test server has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server crashed");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Add a note directly, as another client would.
    pub fn seed(&self, title: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        insert(&mut state, title, content)
    }

    pub fn fail_next(&self, status: StatusCode) {
        self.state.lock().unwrap().fail_next = Some(status);
    }

    /// Answer creates with a plain-text body instead of the created note.
    pub fn plain_text_creates(&self) {
        self.state.lock().unwrap().echo_created = false;
    }

    /// Answer the next list with a 200 HTML page instead of JSON.
    pub fn html_next_list(&self) {
        self.state.lock().unwrap().html_next_list = true;
    }

    pub fn delay_lists(&self, delay: StdDuration) {
        self.state.lock().unwrap().list_delay = Some(delay);
    }

    pub fn stored_titles(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .notes
            .iter()
            .map(|n| n["title"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn insert(state: &mut ServerState, title: &str, content: &str) -> String {
    state.next_id += 1;
    let id = format!("66f1c0a2{:016x}", state.next_id);
    let created_at = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
        + Duration::hours(state.next_id as i64);
    state.notes.push(json!({
        "_id": id,
        "title": title,
        "content": content,
        "createdAt": created_at.to_rfc3339(),
        "__v": 0,
    }));
    id
}

fn take_failure(state: &Mutex<ServerState>) -> Option<Response> {
    state
        .lock()
        .unwrap()
        .fail_next
        .take()
        .map(|status| (status, json!({"message": "injected failure"}).to_string()).into_response())
}

async fn list_notes(State(state): State<Arc<Mutex<ServerState>>>) -> Response {
    if let Some(resp) = take_failure(&state) {
        return resp;
    }
    let (notes, delay, html) = {
        let mut state = state.lock().unwrap();
        let html = std::mem::take(&mut state.html_next_list);
        (state.notes.clone(), state.list_delay, html)
    };
    if html {
        return (StatusCode::OK, "<html>oops</html>").into_response();
    }
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(notes).into_response()
}

async fn create_note(
    State(state): State<Arc<Mutex<ServerState>>>,
    Json(body): Json<NoteBody>,
) -> Response {
    if let Some(resp) = take_failure(&state) {
        return resp;
    }
    let mut state = state.lock().unwrap();
    let id = insert(&mut state, &body.title, &body.content);
    if !state.echo_created {
        return (StatusCode::CREATED, "created").into_response();
    }
    let created = state
        .notes
        .iter()
        .find(|n| n["_id"] == id)
        .cloned()
        .unwrap_or(Value::Null);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_note(
    State(state): State<Arc<Mutex<ServerState>>>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Response {
    if let Some(resp) = take_failure(&state) {
        return resp;
    }
    let mut state = state.lock().unwrap();
    match state.notes.iter_mut().find(|n| n["_id"] == id.as_str()) {
        Some(note) => {
            note["title"] = json!(body.title);
            note["content"] = json!(body.content);
            Json(note.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Note not found").into_response(),
    }
}

async fn delete_note(
    State(state): State<Arc<Mutex<ServerState>>>,
    Path(id): Path<String>,
) -> Response {
    if let Some(resp) = take_failure(&state) {
        return resp;
    }
    let mut state = state.lock().unwrap();
    let before = state.notes.len();
    state.notes.retain(|n| n["_id"] != id.as_str());
    if state.notes.len() == before {
        return (StatusCode::NOT_FOUND, "Note not found").into_response();
    }
    Json(json!({"message": "Note deleted"})).into_response()
}
