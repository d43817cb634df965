//! crates/study_companion_core/src/store.rs
//!
//! The document store: an in-memory authoritative collection backed by a
//! `DocumentRepository`. Every mutation rewrites the persisted snapshot;
//! persistence failures are logged and never surface to callers.

use crate::domain::{word_count, Document, GeneratedOutputs, NewDocument, OutputsPatch};
use crate::ports::{DocumentRepository, PortError, PortResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;

/// Change notifications for subscribers of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    DocumentAdded(Document),
    DocumentUpdated(Document),
    DocumentRemoved(Uuid),
    SelectionChanged(Option<Uuid>),
}

#[derive(Default)]
struct StoreState {
    documents: Vec<Document>,
    active: Option<Uuid>,
}

impl StoreState {
    fn position(&self, id: Uuid) -> PortResult<usize> {
        self.documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", id)))
    }
}

pub struct DocumentStore {
    repository: Arc<dyn DocumentRepository>,
    state: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl DocumentStore {
    /// Loads the persisted collection once. Unreadable or malformed data starts
    /// the store empty.
    pub async fn open(repository: Arc<dyn DocumentRepository>) -> Self {
        let documents = match repository.load().await {
            Ok(documents) => {
                info!("Loaded {} documents from storage.", documents.len());
                documents
            }
            Err(e) => {
                warn!("Failed to load documents from storage, starting empty: {}", e);
                Vec::new()
            }
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            repository,
            state: Mutex::new(StoreState {
                documents,
                active: None,
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Appends a new document with a freshly assigned id.
    pub async fn add(&self, new_document: NewDocument) -> Document {
        let document = Document {
            id: Uuid::new_v4(),
            word_count: word_count(&new_document.content),
            name: new_document.name,
            created_at: Utc::now(),
            content: new_document.content,
            outputs: GeneratedOutputs::default(),
        };

        let mut state = self.state.lock().await;
        state.documents.push(document.clone());
        self.persist(&state.documents).await;
        drop(state);

        self.notify(StoreEvent::DocumentAdded(document.clone()));
        document
    }

    /// Merges `patch` into the document's outputs, last write wins per slot.
    pub async fn update(&self, id: Uuid, patch: OutputsPatch) -> PortResult<Document> {
        self.update_if(id, patch, || true)
            .await?
            .ok_or_else(|| PortError::Unexpected("unconditional update was discarded".into()))
    }

    /// Like [`update`](Self::update), but only applies the patch when `still_wanted`
    /// holds at the moment of the write. Returns `None` when the patch was discarded.
    pub async fn update_if<F>(
        &self,
        id: Uuid,
        patch: OutputsPatch,
        still_wanted: F,
    ) -> PortResult<Option<Document>>
    where
        F: FnOnce() -> bool,
    {
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        if !still_wanted() {
            return Ok(None);
        }
        state.documents[index].outputs.apply(patch);
        let updated = state.documents[index].clone();
        self.persist(&state.documents).await;
        drop(state);

        self.notify(StoreEvent::DocumentUpdated(updated.clone()));
        Ok(Some(updated))
    }

    pub async fn remove(&self, id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        state.documents.remove(index);
        let cleared_selection = state.active == Some(id);
        if cleared_selection {
            state.active = None;
        }
        self.persist(&state.documents).await;
        drop(state);

        self.notify(StoreEvent::DocumentRemoved(id));
        if cleared_selection {
            self.notify(StoreEvent::SelectionChanged(None));
        }
        Ok(())
    }

    /// All documents in insertion order.
    pub async fn list(&self) -> Vec<Document> {
        self.state.lock().await.documents.clone()
    }

    pub async fn get(&self, id: Uuid) -> PortResult<Document> {
        let state = self.state.lock().await;
        let index = state.position(id)?;
        Ok(state.documents[index].clone())
    }

    /// Makes `id` the active document.
    pub async fn select(&self, id: Uuid) -> PortResult<Document> {
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        state.active = Some(id);
        let document = state.documents[index].clone();
        drop(state);

        self.notify(StoreEvent::SelectionChanged(Some(id)));
        Ok(document)
    }

    pub async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        let changed = state.active.take().is_some();
        drop(state);

        if changed {
            self.notify(StoreEvent::SelectionChanged(None));
        }
    }

    pub async fn active(&self) -> Option<Document> {
        let state = self.state.lock().await;
        let id = state.active?;
        state.documents.iter().find(|d| d.id == id).cloned()
    }

    /// The full collection and the active id, read atomically.
    pub async fn snapshot(&self) -> (Vec<Document>, Option<Uuid>) {
        let state = self.state.lock().await;
        (state.documents.clone(), state.active)
    }

    // Called with the state lock held so snapshots reach storage in mutation order.
    async fn persist(&self, documents: &[Document]) {
        if let Err(e) = self.repository.save(documents).await {
            error!("Failed to save documents to storage: {}", e);
        }
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is the normal case outside of open WebSocket sessions.
        let _ = self.events.send(event);
    }
}
