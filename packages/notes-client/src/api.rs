//! Remote notes API: the `NotesApi` seam and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{NotesError, Result};
use crate::types::{Note, NoteInput};

/// CRUD operations against the remote notes collection.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// `GET /api/notes` - the full collection.
    async fn list(&self) -> Result<Vec<Note>>;

    /// `POST /api/notes`. Returns the created note when the server echoes it.
    async fn create(&self, input: &NoteInput) -> Result<Option<Note>>;

    /// `PUT /api/notes/{id}`.
    async fn update(&self, id: &str, input: &NoteInput) -> Result<()>;

    /// `DELETE /api/notes/{id}`.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// `NotesApi` over HTTP.
#[derive(Clone)]
pub struct HttpNotesApi {
    http_client: Client,
    base_url: Url,
}

impl HttpNotesApi {
    /// Create a client for the API at `config.api_base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| NotesError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| NotesError::Config(format!("invalid API base URL: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn collection_url(&self) -> Url {
        self.notes_url(None)
    }

    fn note_url(&self, id: &str) -> Url {
        self.notes_url(Some(id))
    }

    fn notes_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs that are http(s) always accept path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "notes"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

/// Turn a non-2xx response into `NotesError::Api`, passing 2xx through.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(NotesError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| NotesError::Parse(format!("Failed to decode notes response: {}", e)))
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self) -> Result<Vec<Note>> {
        let url = self.collection_url();
        debug!(%url, "Fetching notes");

        let resp = self.http_client.get(url).send().await?;
        let notes: Vec<Note> = decode(check_status(resp).await?).await?;

        debug!(count = notes.len(), "Fetched notes");
        Ok(notes)
    }

    async fn create(&self, input: &NoteInput) -> Result<Option<Note>> {
        let url = self.collection_url();
        debug!(%url, title = %input.title, "Creating note");

        let resp = self.http_client.post(url).json(input).send().await?;
        let resp = check_status(resp).await?;

        // The contract only promises a 2xx; an echoed note is a bonus.
        let bytes = resp.bytes().await?;
        let created = serde_json::from_slice::<Note>(&bytes).ok();
        if created.is_none() {
            debug!("Create response did not contain a note");
        }
        Ok(created)
    }

    async fn update(&self, id: &str, input: &NoteInput) -> Result<()> {
        let url = self.note_url(id);
        debug!(%url, "Updating note");

        let resp = self.http_client.put(url).json(input).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.note_url(id);
        debug!(%url, "Deleting note");

        let resp = self.http_client.delete(url).send().await?;
        if let Err(e) = check_status(resp).await {
            warn!(note_id = id, error = %e, "Delete returned non-success status");
            return Err(e);
        }
        Ok(())
    }
}
