//! WebSocket endpoint streaming issue events to clients

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{error, info, warn};

use crate::{broadcast::IssueEvent, state::AppState};

/// Upgrade the connection and forward every issue event to it
pub async fn issue_events(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let events = state.broadcaster.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, events))
}

async fn forward_events(socket: WebSocket, mut events: Receiver<IssueEvent>) {
    let (mut sender, mut receiver) = socket.split();
    info!("Client subscribed to issue events");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let payload = match event.to_json() {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!("Failed to serialize {} event: {}", event.name(), e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber fell behind, skipping issue events");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                // pings are answered by axum; anything else from the client is ignored
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Client unsubscribed from issue events");
}
