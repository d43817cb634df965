//! services/api/src/web/ws_handler.rs
//!
//! Pushes document collection changes to a connected browser. Each connection
//! gets a snapshot, then every store event, until either side closes or the
//! server shuts down.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

type WsSender = SplitSink<WebSocket, Message>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no event falls in between.
    let mut events = app_state.study.store().subscribe();
    if send_snapshot(&mut sender, &app_state).await.is_err() {
        error!("Failed to send the initial snapshot.");
        return;
    }

    loop {
        tokio::select! {
            _ = app_state.shutdown.cancelled() => {
                info!("Server shutting down; closing WebSocket.");
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
            event = events.recv() => {
                let sent = match event {
                    Ok(event) => send(&mut sender, &ServerMessage::from(event)).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("WebSocket subscriber lagged by {} events; resending snapshot.", skipped);
                        send_snapshot(&mut sender, &app_state).await
                    }
                    Err(RecvError::Closed) => break,
                };
                if sent.is_err() {
                    info!("Client went away while sending an update.");
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_text_message(text.as_str(), &app_state).await {
                            if send(&mut sender, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client sent close message.");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket receive error: {}", e);
                        break;
                    }
                    None => {
                        info!("Client disconnected.");
                        break;
                    }
                }
            }
        }
    }

    info!("WebSocket connection closed.");
}

/// Applies a client request. Selection changes reach every client, this one
/// included, through the store's events; only failures are answered directly.
async fn handle_text_message(text: &str, app_state: &AppState) -> Option<ServerMessage> {
    let store = app_state.study.store();
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Select { document_id }) => match store.select(document_id).await {
            Ok(_) => None,
            Err(e) => Some(ServerMessage::Error {
                message: e.to_string(),
            }),
        },
        Ok(ClientMessage::ClearSelection) => {
            store.clear_selection().await;
            None
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            Some(ServerMessage::Error {
                message: "Unrecognized message.".to_string(),
            })
        }
    }
}

async fn send_snapshot(sender: &mut WsSender, app_state: &AppState) -> Result<(), axum::Error> {
    let (documents, active) = app_state.study.store().snapshot().await;
    send(sender, &ServerMessage::snapshot(&documents, active)).await
}

async fn send(sender: &mut WsSender, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
