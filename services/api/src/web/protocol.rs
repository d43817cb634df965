//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! API server. The server pushes document collection changes; the client may
//! change the active selection.

use crate::web::dto::{DocumentListItem, DocumentListResponse, DocumentResponse};
use serde::{Deserialize, Serialize};
use study_companion_core::domain::Document;
use study_companion_core::store::StoreEvent;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Makes a document the active one.
    Select { document_id: Uuid },

    /// Returns to the document list.
    ClearSelection,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// The whole collection. Sent on connect and whenever the client fell behind.
    Snapshot {
        #[serde(flatten)]
        state: DocumentListResponse,
    },

    DocumentAdded { document: DocumentListItem },

    /// A document's generated artifacts changed.
    DocumentUpdated { document: DocumentResponse },

    DocumentRemoved { document_id: Uuid },

    SelectionChanged { document_id: Option<Uuid> },

    /// Reports a failed client request.
    Error { message: String },
}

impl ServerMessage {
    pub fn snapshot(documents: &[Document], active: Option<Uuid>) -> Self {
        ServerMessage::Snapshot {
            state: DocumentListResponse::new(documents, active),
        }
    }
}

impl From<StoreEvent> for ServerMessage {
    fn from(event: StoreEvent) -> Self {
        match event {
            StoreEvent::DocumentAdded(document) => ServerMessage::DocumentAdded {
                document: DocumentListItem::from(&document),
            },
            StoreEvent::DocumentUpdated(document) => ServerMessage::DocumentUpdated {
                document: DocumentResponse::from(&document),
            },
            StoreEvent::DocumentRemoved(document_id) => {
                ServerMessage::DocumentRemoved { document_id }
            }
            StoreEvent::SelectionChanged(document_id) => {
                ServerMessage::SelectionChanged { document_id }
            }
        }
    }
}
