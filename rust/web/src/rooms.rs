//! Game rooms and code-based friend lobbies.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use kuhn_engine::game::GameState;
use kuhn_engine::player::{Seat, Tally};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::events::ConnectionId;

pub type RoomId = String;

pub const ROOM_CODE_LENGTH: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 10;
pub const DEFAULT_LOBBY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    CodeNotFound(String),
    #[error("Room {0} has already started")]
    AlreadyStarted(String),
    #[error("Room {0} has expired")]
    Expired(String),
    #[error("Could not generate a unique room code after {0} attempts")]
    CodeExhausted(usize),
    #[error("Room code {0} is already in use")]
    AlreadyExists(String),
    #[error("You cannot join your own room")]
    OwnRoom,
}

/// Two connections sharing one canonical hand.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    /// Connection ids indexed by seat
    pub players: [ConnectionId; 2],
    pub state: GameState,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Code of the friend lobby this room came from
    pub code: Option<String>,
}

impl Room {
    pub fn new(id: RoomId, players: [ConnectionId; 2], state: GameState) -> Self {
        let now = Utc::now();
        Self {
            id,
            players,
            state,
            created_at: now,
            last_activity: now,
            code: None,
        }
    }

    pub fn seat_of(&self, connection_id: &str) -> Option<Seat> {
        Seat::both()
            .into_iter()
            .find(|seat| self.players[seat.index()] == connection_id)
    }

    pub fn connection(&self, seat: Seat) -> &ConnectionId {
        &self.players[seat.index()]
    }

    /// Cumulative results for the player in `seat`.
    pub fn stats(&self, seat: Seat) -> Tally {
        self.state.tally(seat)
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn idle_longer_than(&self, threshold: Duration, now: DateTime<Utc>) -> bool {
        let threshold = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.last_activity) > threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyStatus {
    Waiting,
    Active,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendLobby {
    pub code: String,
    pub room_id: RoomId,
    pub creator: ConnectionId,
    pub creator_user: Option<String>,
    pub players: Vec<ConnectionId>,
    pub status: LobbyStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FriendLobby {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

pub fn friend_room_id(code: &str) -> RoomId {
    format!("friend-game-{code}")
}

pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LENGTH && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}

/// Friend lobbies keyed by room code.
#[derive(Debug)]
pub struct RoomCodes {
    lobbies: RwLock<HashMap<String, FriendLobby>>,
    ttl: Duration,
}

impl Default for RoomCodes {
    fn default() -> Self {
        Self::new(DEFAULT_LOBBY_TTL)
    }
}

impl RoomCodes {
    pub fn new(ttl: Duration) -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn create(
        &self,
        creator: &str,
        user_id: Option<String>,
    ) -> Result<FriendLobby, RoomError> {
        self.create_with(creator, user_id, generate_room_code)
    }

    /// Like [`RoomCodes::create`] with a caller-supplied code generator.
    pub fn create_with(
        &self,
        creator: &str,
        user_id: Option<String>,
        mut next_code: impl FnMut() -> String,
    ) -> Result<FriendLobby, RoomError> {
        let mut guard = self.lobbies.write().unwrap_or_else(PoisonError::into_inner);
        let code = (0..MAX_CODE_ATTEMPTS)
            .map(|_| next_code())
            .find(|code| !guard.contains_key(code))
            .ok_or(RoomError::CodeExhausted(MAX_CODE_ATTEMPTS))?;

        let now = Utc::now();
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        let lobby = FriendLobby {
            room_id: friend_room_id(&code),
            code: code.clone(),
            creator: creator.to_string(),
            creator_user: user_id,
            players: vec![creator.to_string()],
            status: LobbyStatus::Waiting,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        guard.insert(code.clone(), lobby.clone());

        tracing::info!(room_code = %code, connection_id = %creator, "friend room created");
        Ok(lobby)
    }

    /// Seats `joiner` in the lobby for `code` and marks it active.
    pub fn join(&self, code: &str, joiner: &str) -> Result<FriendLobby, RoomError> {
        let code = code.trim().to_ascii_uppercase();
        let mut guard = self.lobbies.write().unwrap_or_else(PoisonError::into_inner);

        let lobby = guard
            .get_mut(&code)
            .ok_or_else(|| RoomError::CodeNotFound(code.clone()))?;
        if lobby.is_expired(Utc::now()) {
            guard.remove(&code);
            return Err(RoomError::Expired(code));
        }
        if lobby.status == LobbyStatus::Active {
            return Err(RoomError::AlreadyStarted(code));
        }
        if lobby.creator == joiner {
            return Err(RoomError::OwnRoom);
        }

        lobby.players.push(joiner.to_string());
        lobby.status = LobbyStatus::Active;
        Ok(lobby.clone())
    }

    pub fn get(&self, code: &str) -> Option<FriendLobby> {
        let guard = self.lobbies.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(code).cloned()
    }

    pub fn remove(&self, code: &str) -> Option<FriendLobby> {
        let mut guard = self.lobbies.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(code)
    }

    /// Drops lobbies still waiting on `creator`. Returns their codes.
    pub fn remove_waiting_by_creator(&self, creator: &str) -> Vec<String> {
        let mut guard = self.lobbies.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = Vec::new();
        guard.retain(|code, lobby| {
            let drop = lobby.status == LobbyStatus::Waiting && lobby.creator == creator;
            if drop {
                removed.push(code.clone());
            }
            !drop
        });
        removed
    }

    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut guard = self.lobbies.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, lobby| !lobby.is_expired(now));
        before - guard.len()
    }

    pub fn waiting_count(&self) -> usize {
        let guard = self.lobbies.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .values()
            .filter(|lobby| lobby.status == LobbyStatus::Waiting)
            .count()
    }

    pub fn len(&self) -> usize {
        let guard = self.lobbies.read().unwrap_or_else(PoisonError::into_inner);
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_alphabet() {
        for _ in 0..200 {
            let code = generate_room_code();
            assert!(is_valid_room_code(&code), "bad code {code}");
        }
        assert!(!is_valid_room_code("abc123"));
        assert!(!is_valid_room_code("ABC12"));
    }

    #[test]
    fn join_activates_lobby() {
        let codes = RoomCodes::default();
        let lobby = codes.create("host", Some("u1".into())).expect("create");
        assert_eq!(lobby.status, LobbyStatus::Waiting);
        assert_eq!(lobby.room_id, format!("friend-game-{}", lobby.code));
        assert_eq!(codes.waiting_count(), 1);

        let joined = codes
            .join(&lobby.code.to_ascii_lowercase(), "guest")
            .expect("join");
        assert_eq!(joined.status, LobbyStatus::Active);
        assert_eq!(joined.players, vec!["host".to_string(), "guest".to_string()]);
        assert_eq!(codes.waiting_count(), 0);

        assert_eq!(
            codes.join(&lobby.code, "third").unwrap_err(),
            RoomError::AlreadyStarted(lobby.code.clone())
        );
    }

    #[test]
    fn unknown_code_is_rejected() {
        let codes = RoomCodes::default();
        assert_eq!(
            codes.join("ZZZZZZ", "guest").unwrap_err(),
            RoomError::CodeNotFound("ZZZZZZ".into())
        );
    }

    #[test]
    fn creator_cannot_join_own_room() {
        let codes = RoomCodes::default();
        let lobby = codes.create("host", None).expect("create");
        assert_eq!(codes.join(&lobby.code, "host").unwrap_err(), RoomError::OwnRoom);
    }

    #[test]
    fn expired_lobby_is_rejected_and_removed() {
        let codes = RoomCodes::new(Duration::ZERO);
        let lobby = codes.create("host", None).expect("create");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            codes.join(&lobby.code, "guest").unwrap_err(),
            RoomError::Expired(lobby.code.clone())
        );
        assert!(codes.get(&lobby.code).is_none());
    }

    #[test]
    fn colliding_generator_exhausts_attempts() {
        let codes = RoomCodes::default();
        codes
            .create_with("a", None, || "AAAAAA".to_string())
            .expect("first");
        assert_eq!(
            codes
                .create_with("b", None, || "AAAAAA".to_string())
                .unwrap_err(),
            RoomError::CodeExhausted(10)
        );
    }

    #[test]
    fn cleanup_and_creator_removal() {
        let short = RoomCodes::new(Duration::ZERO);
        short.create("a", None).expect("create");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(short.cleanup_expired(), 1);
        assert!(short.is_empty());

        let codes = RoomCodes::default();
        let lobby = codes.create("host", None).expect("create");
        codes.create("other", None).expect("create");
        assert_eq!(codes.remove_waiting_by_creator("host"), vec![lobby.code]);
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn lobby_serializes_with_timestamps() {
        let codes = RoomCodes::default();
        let lobby = codes.create("host", Some("user-1".into())).expect("create");
        let value = serde_json::to_value(&lobby).expect("serialize");
        assert_eq!(value["roomId"], friend_room_id(&lobby.code));
        assert_eq!(value["status"], "waiting");
        assert_eq!(value["creatorUser"], "user-1");
        let created = value["createdAt"].as_str().expect("timestamp string");
        assert_eq!(
            created.parse::<DateTime<Utc>>().expect("rfc3339"),
            lobby.created_at
        );
        assert!(lobby.expires_at > lobby.created_at);
    }
}
