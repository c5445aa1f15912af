//! One task per WebSocket connection.
//!
//! Outbound frames come from the connection's [`EventBus`](crate::events::EventBus)
//! subscription; inbound text and binary frames go to the session manager. When the
//! bus drops a lagging connection the subscription ends and the socket is closed.

use crate::session::{SessionError, SessionManager};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

pub async fn handle_socket(socket: WebSocket, sessions: Arc<SessionManager>) {
    let connection_id = Uuid::new_v4().to_string();
    let mut subscription = sessions.event_bus().subscribe(connection_id.clone());
    sessions.connect(&connection_id);

    let (mut outbound, mut inbound) = socket.split();

    loop {
        tokio::select! {
            event = subscription.receiver.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(
                            connection_id = %connection_id,
                            event = event.name(),
                            error = %err,
                            "failed to encode server event"
                        );
                        continue;
                    }
                };
                if let Err(err) = outbound.send(Message::text(text)).await {
                    tracing::debug!(connection_id = %connection_id, error = %err, "socket write failed");
                    break;
                }
            }
            frame = inbound.next() => {
                match frame {
                    Some(Ok(msg)) if msg.is_close() => break,
                    Some(Ok(msg)) => match frame_text(&msg) {
                        Some(Ok(text)) => sessions.handle_text(&connection_id, text),
                        Some(Err(err)) => sessions.report_error(&connection_id, &err),
                        None => {}
                    },
                    Some(Err(err)) => {
                        tracing::debug!(connection_id = %connection_id, error = %err, "socket read failed");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    drop(subscription);
    if let Err(err) = sessions.disconnect(&connection_id) {
        tracing::error!(connection_id = %connection_id, error = %err, "disconnect cleanup failed");
    }
    let _ = outbound.close().await;
}

/// Payload of a text or binary frame as UTF-8. Control frames yield `None`.
fn frame_text(msg: &Message) -> Option<Result<&str, SessionError>> {
    if !(msg.is_text() || msg.is_binary()) {
        return None;
    }
    Some(
        std::str::from_utf8(msg.as_bytes())
            .map_err(|err| SessionError::Protocol(format!("frame is not valid UTF-8: {err}"))),
    )
}
