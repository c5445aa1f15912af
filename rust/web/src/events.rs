use crate::errors::ErrorResponse;
use kuhn_engine::game::GameMode;
use kuhn_engine::view::PlayerView;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Identifier assigned to each WebSocket connection.
pub type ConnectionId = String;

// A connection whose buffer fills is dropped rather than allowed to grow memory
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<ServerMessage>;
pub type EventReceiver = mpsc::Receiver<ServerMessage>;

pub struct EventSubscription {
    bus: EventBus,
    connection_id: ConnectionId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    /// Everything queued right now, without waiting.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            out.push(msg);
        }
        out
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.connection_id, self.subscriber_id);
    }
}

/// Outbound fan-out from the session manager to connection writers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

type SubscriberMap = HashMap<ConnectionId, Vec<(usize, EventSender)>>;

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<SubscriberMap>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, connection_id: ConnectionId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(connection_id.clone());
        EventSubscription {
            bus: self.clone(),
            connection_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, connection_id: ConnectionId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(connection_id.clone())
            .or_default()
            .push((id, tx));

        tracing::debug!(
            connection_id = %connection_id,
            subscriber_id = id,
            "connection subscribed to server events"
        );

        (id, rx)
    }

    /// Queues `message` for every subscriber of `connection_id`. Returns whether at
    /// least one subscriber accepted it.
    pub fn send_to(&self, connection_id: &str, message: ServerMessage) -> bool {
        tracing::trace!(
            connection_id = %connection_id,
            event = message.name(),
            "sending server event"
        );

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.get(connection_id).cloned()
        };

        let Some(list) = subscribers else {
            tracing::debug!(
                connection_id = %connection_id,
                event = message.name(),
                "no subscribers for connection"
            );
            return false;
        };

        let mut delivered = false;
        let mut failed = Vec::new();
        for (id, sender) in list {
            match sender.try_send(message.clone()) {
                Ok(()) => delivered = true,
                Err(TrySendError::Full(_)) => {
                    // a client that misses frames is out of sync
                    tracing::warn!(
                        connection_id = %connection_id,
                        subscriber_id = id,
                        event = message.name(),
                        "subscriber buffer full, dropping connection"
                    );
                    self.drop_connection(connection_id);
                    return false;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        subscriber_id = id,
                        "subscriber receiver closed"
                    );
                    failed.push(id);
                }
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(connection_id, &failed);
        }
        delivered
    }

    pub fn unsubscribe(&self, connection_id: &str, subscriber_id: usize) {
        self.remove_subscribers(connection_id, &[subscriber_id]);
    }

    pub fn drop_connection(&self, connection_id: &str) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.remove(connection_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, connection_id: &str, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = guard.get_mut(connection_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(connection_id);
            }
        }
    }
}

/// Payload of `game-start` and `friend-game-start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartPayload {
    pub room_id: String,
    pub game_state: PlayerView,
}

/// Payload of `room-created` and `room-joined`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoPayload {
    pub room_code: String,
    pub room_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoinedPayload {
    pub player_id: ConnectionId,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomErrorPayload {
    pub message: String,
}

/// Frames sent to clients, serialized as `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    GameStateUpdate(PlayerView),
    WaitingForOpponent(String),
    MatchFound(String),
    GameStart(GameStartPayload),
    FriendGameStart(GameStartPayload),
    OpponentDisconnected(String),
    RoomCreated(RoomInfoPayload),
    RoomJoined(RoomInfoPayload),
    PlayerJoined(PlayerJoinedPayload),
    RoomError(RoomErrorPayload),
    ActionRejected(ErrorResponse),
}

impl ServerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::GameStateUpdate(_) => "game-state-update",
            ServerMessage::WaitingForOpponent(_) => "waiting-for-opponent",
            ServerMessage::MatchFound(_) => "match-found",
            ServerMessage::GameStart(_) => "game-start",
            ServerMessage::FriendGameStart(_) => "friend-game-start",
            ServerMessage::OpponentDisconnected(_) => "opponent-disconnected",
            ServerMessage::RoomCreated(_) => "room-created",
            ServerMessage::RoomJoined(_) => "room-joined",
            ServerMessage::PlayerJoined(_) => "player-joined",
            ServerMessage::RoomError(_) => "room-error",
            ServerMessage::ActionRejected(_) => "action-rejected",
        }
    }

    /// The projected state carried by this frame, if any.
    pub fn view(&self) -> Option<&PlayerView> {
        match self {
            ServerMessage::GameStateUpdate(view) => Some(view),
            ServerMessage::GameStart(p) | ServerMessage::FriendGameStart(p) => Some(&p.game_state),
            _ => None,
        }
    }
}

/// `player-action` payload: `{"action": "bet", "roomId": "..."}` or a bare `"bet"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActionRequest {
    Detailed {
        action: String,
        #[serde(default, rename = "roomId")]
        room_id: Option<String>,
    },
    Bare(String),
}

impl ActionRequest {
    pub fn action(&self) -> &str {
        match self {
            ActionRequest::Detailed { action, .. } | ActionRequest::Bare(action) => action,
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        match self {
            ActionRequest::Detailed { room_id, .. } => room_id.as_deref(),
            ActionRequest::Bare(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_code: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Frames received from clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    SelectGameMode(GameMode),
    PlayerAction(ActionRequest),
    CreateFriendRoom(CreateRoomRequest),
    JoinFriendRoom(JoinRoomRequest),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl ClientMessage {
    /// Parses one text frame. The error string is suitable for an `action-rejected`
    /// message.
    pub fn parse(text: &str) -> Result<Self, String> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| format!("malformed frame: {e}"))?;
        let data = envelope.data;
        let msg = match envelope.event.as_str() {
            "select-game-mode" => ClientMessage::SelectGameMode(decode(data)?),
            "player-action" => ClientMessage::PlayerAction(decode(data)?),
            "create-friend-room" => {
                let req: Option<CreateRoomRequest> = decode(data)?;
                ClientMessage::CreateFriendRoom(req.unwrap_or_default())
            }
            "join-friend-room" => ClientMessage::JoinFriendRoom(decode(data)?),
            other => return Err(format!("unknown event `{other}`")),
        };
        Ok(msg)
    }
}

fn decode<T: serde::de::DeserializeOwned>(data: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(data).map_err(|e| format!("invalid payload: {e}"))
}
