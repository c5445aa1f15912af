use crate::ai::{create_ai, AIOpponent};
use crate::errors::IntoErrorResponse;
use crate::events::{
    ClientMessage, ConnectionId, EventBus, GameStartPayload, PlayerJoinedPayload,
    RoomErrorPayload, RoomInfoPayload, ServerMessage,
};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::rooms::{Room, RoomCodes, RoomError, RoomId};
use crate::settings::ServerSettings;
use crate::store::{MemoryStore, SessionStore};
use crate::timers::Timers;
use chrono::{DateTime, Utc};
use kuhn_engine::engine::Engine;
use kuhn_engine::errors::GameError;
use kuhn_engine::game::{GameMode, GameState, Stage, Transition};
use kuhn_engine::player::{Action, Seat, Tally};
use kuhn_engine::view::project;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// The human always holds the first seat in an AI game.
pub const HUMAN_SEAT: Seat = Seat::First;
pub const AI_SEAT: Seat = Seat::Second;

const WAITING_MESSAGE: &str = "Waiting for an opponent...";
const MATCH_FOUND_MESSAGE: &str = "Opponent found! Starting game.";
const OPPONENT_LEFT_MESSAGE: &str = "Your opponent has disconnected.";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Connection {connection} is not seated in room {room}")]
    NotInRoom { connection: String, room: String },
    #[error("Invalid message: {0}")]
    Protocol(String),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

/// A connection's game against the AI.
#[derive(Debug, Clone)]
pub struct AiTable {
    pub connection_id: ConnectionId,
    pub state: GameState,
    pub started_at: DateTime<Utc>,
}

/// Backing stores for everything keyed by connection or room.
pub struct Stores {
    pub ai_tables: Box<dyn SessionStore<AiTable>>,
    pub rooms: Box<dyn SessionStore<Room>>,
    /// connection id -> room id
    pub player_rooms: Box<dyn SessionStore<RoomId>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            ai_tables: Box::new(MemoryStore::new()),
            rooms: Box::new(MemoryStore::new()),
            player_rooms: Box::new(MemoryStore::new()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FollowUp {
    AiTurn,
    Showdown,
    NextHand,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub ai_sessions: usize,
    pub rooms: usize,
    pub waiting_lobbies: usize,
    pub waiting_players: usize,
    pub pending_timers: usize,
    pub metrics: MetricsSnapshot,
}

fn ai_timer_key(connection_id: &str) -> String {
    format!("ai:{connection_id}")
}

fn room_timer_key(room_id: &str) -> String {
    format!("room:{room_id}")
}

/// Owns every server-side game and serializes all mutations.
///
/// Each inbound event and each timer follow-up runs to completion under the
/// dispatch lock, so a read-modify-write of a stored [`GameState`] never
/// interleaves with another.
pub struct SessionManager {
    ai_tables: Box<dyn SessionStore<AiTable>>,
    rooms: Box<dyn SessionStore<Room>>,
    player_rooms: Box<dyn SessionStore<RoomId>>,
    lobbies: RoomCodes,
    waiting: Mutex<Option<ConnectionId>>,
    dispatch: Mutex<()>,
    dealer: Mutex<Engine>,
    ai: Box<dyn AIOpponent>,
    timers: Timers,
    events: Arc<EventBus>,
    metrics: MetricsCollector,
    settings: ServerSettings,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ai", &self.ai.name())
            .field("ai_sessions", &self.ai_session_count())
            .field("rooms", &self.room_count())
            .field("pending_timers", &self.timers.pending_count())
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        settings: ServerSettings,
        events: Arc<EventBus>,
        metrics: MetricsCollector,
    ) -> Result<Self, SessionError> {
        let ai = create_ai(&settings.ai, settings.seed.map(|s| s.wrapping_add(1)));
        Self::from_parts(settings, events, metrics, ai, Stores::in_memory())
    }

    pub fn with_ai(
        settings: ServerSettings,
        events: Arc<EventBus>,
        ai: Box<dyn AIOpponent>,
    ) -> Result<Self, SessionError> {
        Self::from_parts(
            settings,
            events,
            MetricsCollector::new(),
            ai,
            Stores::in_memory(),
        )
    }

    pub fn from_parts(
        settings: ServerSettings,
        events: Arc<EventBus>,
        metrics: MetricsCollector,
        ai: Box<dyn AIOpponent>,
        stores: Stores,
    ) -> Result<Self, SessionError> {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let dealer = Engine::new(Some(seed), settings.rules())?;
        tracing::info!(ai = ai.name(), seed, "session manager ready");

        Ok(Self {
            ai_tables: stores.ai_tables,
            rooms: stores.rooms,
            player_rooms: stores.player_rooms,
            lobbies: RoomCodes::new(settings.friend_code_ttl()),
            waiting: Mutex::new(None),
            dispatch: Mutex::new(()),
            dealer: Mutex::new(dealer),
            ai,
            timers: Timers::new(),
            events,
            metrics,
            settings,
        })
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn lobbies(&self) -> &RoomCodes {
        &self.lobbies
    }

    fn dispatch_lock(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deal(&self, mode: GameMode, tally: [Tally; 2]) -> Result<GameState, SessionError> {
        let mut dealer = self
            .dealer
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        let state = dealer.deal(mode, tally)?;
        self.metrics.record_hand_started();
        Ok(state)
    }

    fn send(&self, connection_id: &str, message: ServerMessage) {
        if self.events.send_to(connection_id, message) {
            self.metrics.record_event_sent();
        }
    }

    fn broadcast_room(&self, room: &Room) {
        for seat in Seat::both() {
            self.send(
                room.connection(seat),
                ServerMessage::GameStateUpdate(project(&room.state, seat)),
            );
        }
    }

    pub fn connect(&self, connection_id: &str) {
        self.metrics.record_connection_opened();
        tracing::info!(connection_id = %connection_id, "client connected");
    }

    /// Parses and handles one inbound text frame. Failures are reported back to the
    /// sender rather than returned.
    pub fn handle_text(self: &Arc<Self>, connection_id: &str, text: &str) {
        let result = ClientMessage::parse(text)
            .map_err(SessionError::Protocol)
            .and_then(|msg| self.handle_message(connection_id, msg));
        if let Err(err) = result {
            self.report_error(connection_id, &err);
        }
    }

    pub fn handle_message(
        self: &Arc<Self>,
        connection_id: &str,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        match message {
            ClientMessage::SelectGameMode(mode) => self.select_mode(connection_id, mode),
            ClientMessage::PlayerAction(req) => self
                .player_action(connection_id, req.action(), req.room_id())
                .map(|_| ()),
            ClientMessage::CreateFriendRoom(req) => {
                self.create_friend_room(connection_id, req.user_id)
            }
            ClientMessage::JoinFriendRoom(req) => {
                self.join_friend_room(connection_id, &req.room_code, req.user_id)
            }
        }
    }

    /// Logs `err` and tells the client: room failures as `room-error`, everything
    /// else as `action-rejected`.
    pub fn report_error(&self, connection_id: &str, err: &SessionError) {
        tracing::debug!(connection_id = %connection_id, error = err.error_code(), "request rejected");
        err.log();
        let message = match err {
            SessionError::Room(room_err) => ServerMessage::RoomError(RoomErrorPayload {
                message: room_err.to_string(),
            }),
            other => ServerMessage::ActionRejected(other.to_error_response()),
        };
        self.send(connection_id, message);
    }

    pub fn select_mode(
        self: &Arc<Self>,
        connection_id: &str,
        mode: GameMode,
    ) -> Result<(), SessionError> {
        let _guard = self.dispatch_lock();
        tracing::info!(connection_id = %connection_id, mode = mode.as_str(), "game mode selected");
        match mode {
            GameMode::Ai => self.start_ai_game(connection_id),
            GameMode::Online => self.join_matchmaking(connection_id),
        }
    }

    fn start_ai_game(&self, connection_id: &str) -> Result<(), SessionError> {
        self.timers.cancel(&ai_timer_key(connection_id));
        let tallies = match self.ai_tables.get(connection_id)? {
            Some(table) => table.state.tallies(),
            None => [Tally::default(); 2],
        };
        let state = self.deal(GameMode::Ai, tallies)?;
        let view = project(&state, HUMAN_SEAT);
        self.ai_tables.set(
            connection_id.to_string(),
            AiTable {
                connection_id: connection_id.to_string(),
                state,
                started_at: Utc::now(),
            },
        )?;
        self.send(connection_id, ServerMessage::GameStateUpdate(view));
        Ok(())
    }

    fn join_matchmaking(&self, connection_id: &str) -> Result<(), SessionError> {
        if let Some(room_id) = self.player_rooms.get(connection_id)? {
            self.close_room(&room_id, Some(connection_id))?;
        }

        let mut waiting = self
            .waiting
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        let opponent = match waiting.take() {
            Some(other) if other != connection_id => other,
            _ => {
                *waiting = Some(connection_id.to_string());
                drop(waiting);
                tracing::debug!(connection_id = %connection_id, "waiting for opponent");
                self.send(
                    connection_id,
                    ServerMessage::WaitingForOpponent(WAITING_MESSAGE.to_string()),
                );
                return Ok(());
            }
        };
        drop(waiting);

        let room_id = format!("room-{}", Uuid::new_v4());
        let room = self.open_room(room_id, [opponent, connection_id.to_string()], None)?;
        tracing::info!(
            room_id = %room.id,
            first = %room.players[0],
            second = %room.players[1],
            "match found"
        );

        for seat in Seat::both() {
            self.send(
                room.connection(seat),
                ServerMessage::MatchFound(MATCH_FOUND_MESSAGE.to_string()),
            );
        }
        for seat in Seat::both() {
            self.send(
                room.connection(seat),
                ServerMessage::GameStart(GameStartPayload {
                    room_id: room.id.clone(),
                    game_state: project(&room.state, seat),
                }),
            );
        }
        Ok(())
    }

    fn open_room(
        &self,
        room_id: RoomId,
        players: [ConnectionId; 2],
        code: Option<String>,
    ) -> Result<Room, SessionError> {
        if self.rooms.contains(&room_id)? {
            return Err(RoomError::AlreadyExists(room_id).into());
        }
        for player in &players {
            self.release_player(player, &room_id)?;
        }
        let state = self.deal(GameMode::Online, [Tally::default(); 2])?;
        let mut room = Room::new(room_id, players, state);
        room.code = code;
        self.rooms.set(room.id.clone(), room.clone())?;
        for player in &room.players {
            self.player_rooms.set(player.clone(), room.id.clone())?;
        }
        Ok(room)
    }

    /// Takes `player` out of the match queue, their waiting friend codes and any room
    /// other than `next_room`, so a connection is seated in at most one room.
    fn release_player(&self, player: &str, next_room: &str) -> Result<(), SessionError> {
        {
            let mut waiting = self
                .waiting
                .lock()
                .map_err(|_| SessionError::StoragePoisoned)?;
            if waiting.as_deref() == Some(player) {
                *waiting = None;
            }
        }
        for code in self.lobbies.remove_waiting_by_creator(player) {
            tracing::debug!(connection_id = %player, room_code = %code, "friend code withdrawn");
        }
        if let Some(previous) = self.player_rooms.get(player)? {
            if previous != next_room {
                self.close_room(&previous, Some(player))?;
            }
        }
        Ok(())
    }

    /// Deletes a room and its timer. When `departing` is set, the other player is told
    /// their opponent left.
    fn close_room(&self, room_id: &str, departing: Option<&str>) -> Result<(), SessionError> {
        self.timers.cancel(&room_timer_key(room_id));
        let Some(room) = self.rooms.delete(room_id)? else {
            return Ok(());
        };
        for player in &room.players {
            if self.player_rooms.get(player)?.as_deref() == Some(room_id) {
                self.player_rooms.delete(player)?;
            }
        }
        if let Some(code) = &room.code {
            self.lobbies.remove(code);
        }
        if let Some(departing) = departing {
            for player in room.players.iter().filter(|p| p.as_str() != departing) {
                self.send(
                    player,
                    ServerMessage::OpponentDisconnected(OPPONENT_LEFT_MESSAGE.to_string()),
                );
            }
        }
        tracing::info!(room_id = %room_id, "room closed");
        Ok(())
    }

    /// Applies an action from `connection_id`. With `room_id` it targets that room;
    /// without it, the caller's AI game (or, failing that, the room they sit in).
    pub fn player_action(
        self: &Arc<Self>,
        connection_id: &str,
        action: &str,
        room_id: Option<&str>,
    ) -> Result<Transition, SessionError> {
        let _guard = self.dispatch_lock();
        let result = self.apply_player_action(connection_id, action, room_id);
        self.metrics.record_action(result.is_ok());
        result
    }

    fn apply_player_action(
        self: &Arc<Self>,
        connection_id: &str,
        action: &str,
        room_id: Option<&str>,
    ) -> Result<Transition, SessionError> {
        let action: Action = action.parse()?;
        match room_id {
            Some(room_id) => self.room_action(connection_id, room_id, action),
            None => {
                if self.ai_tables.contains(connection_id)? {
                    self.ai_action(connection_id, action)
                } else if let Some(room_id) = self.player_rooms.get(connection_id)? {
                    self.room_action(connection_id, &room_id, action)
                } else {
                    Err(SessionError::NotFound(connection_id.to_string()))
                }
            }
        }
    }

    fn ai_action(
        self: &Arc<Self>,
        connection_id: &str,
        action: Action,
    ) -> Result<Transition, SessionError> {
        let mut table = self
            .ai_tables
            .get(connection_id)?
            .ok_or_else(|| SessionError::NotFound(connection_id.to_string()))?;
        let transition = table.state.apply(HUMAN_SEAT, action)?;
        self.ai_tables
            .set(connection_id.to_string(), table.clone())?;

        tracing::debug!(
            connection_id = %connection_id,
            seat = %HUMAN_SEAT,
            action = %action,
            "player action applied"
        );
        self.send(
            connection_id,
            ServerMessage::GameStateUpdate(project(&table.state, HUMAN_SEAT)),
        );
        self.after_ai_transition(connection_id, transition);
        Ok(transition)
    }

    fn after_ai_transition(self: &Arc<Self>, connection_id: &str, transition: Transition) {
        let delays = self.settings.delays;
        match transition {
            Transition::Continue { next } if next == AI_SEAT => {
                self.schedule_ai(connection_id, delays.ai(), FollowUp::AiTurn)
            }
            Transition::Continue { .. } => {}
            Transition::Showdown => {
                self.schedule_ai(connection_id, delays.showdown(), FollowUp::Showdown)
            }
            Transition::Folded { winner } => {
                self.metrics.record_hand_completed();
                tracing::info!(connection_id = %connection_id, winner = %winner, "hand won by fold");
                self.schedule_ai(connection_id, delays.ai_fold(), FollowUp::NextHand)
            }
        }
    }

    fn schedule_ai(self: &Arc<Self>, connection_id: &str, delay: Duration, step: FollowUp) {
        let manager: Weak<Self> = Arc::downgrade(self);
        let connection_id = connection_id.to_string();
        self.timers
            .schedule(ai_timer_key(&connection_id), delay, move || {
                if let Some(manager) = manager.upgrade() {
                    manager.run_ai_follow_up(&connection_id, step);
                }
            });
    }

    fn run_ai_follow_up(self: &Arc<Self>, connection_id: &str, step: FollowUp) {
        let _guard = self.dispatch_lock();
        let result = match step {
            FollowUp::AiTurn => self.ai_turn(connection_id),
            FollowUp::Showdown => self.ai_showdown(connection_id),
            FollowUp::NextHand => self.ai_next_hand(connection_id),
        };
        if let Err(err) = result {
            tracing::error!(
                connection_id = %connection_id,
                step = ?step,
                error = %err,
                "AI follow-up failed"
            );
        }
    }

    fn ai_turn(self: &Arc<Self>, connection_id: &str) -> Result<(), SessionError> {
        let Some(mut table) = self.ai_tables.get(connection_id)? else {
            tracing::debug!(connection_id = %connection_id, "AI turn for closed session skipped");
            return Ok(());
        };
        let state = &table.state;
        if !state.is_active() || state.stage() != Stage::Betting || state.to_act() != AI_SEAT {
            return Ok(());
        }

        let action = self.ai.get_action(state, AI_SEAT);
        let transition = match table.state.apply(AI_SEAT, action) {
            Ok(transition) => transition,
            Err(err) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    ai = self.ai.name(),
                    action = %action,
                    error = %err,
                    "AI chose an illegal action, folding"
                );
                table.state.apply(AI_SEAT, Action::Fold)?
            }
        };
        self.ai_tables
            .set(connection_id.to_string(), table.clone())?;

        tracing::debug!(
            connection_id = %connection_id,
            seat = %AI_SEAT,
            action = %action,
            "AI action applied"
        );
        self.send(
            connection_id,
            ServerMessage::GameStateUpdate(project(&table.state, HUMAN_SEAT)),
        );
        self.after_ai_transition(connection_id, transition);
        Ok(())
    }

    fn ai_showdown(self: &Arc<Self>, connection_id: &str) -> Result<(), SessionError> {
        let Some(mut table) = self.ai_tables.get(connection_id)? else {
            return Ok(());
        };
        if table.state.stage() != Stage::Showdown {
            return Ok(());
        }
        let winner = table.state.resolve_showdown()?;
        self.ai_tables
            .set(connection_id.to_string(), table.clone())?;
        self.metrics.record_hand_completed();

        tracing::info!(connection_id = %connection_id, winner = %winner, "showdown resolved");
        self.send(
            connection_id,
            ServerMessage::GameStateUpdate(project(&table.state, HUMAN_SEAT)),
        );
        self.schedule_ai(
            connection_id,
            self.settings.delays.next_hand(),
            FollowUp::NextHand,
        );
        Ok(())
    }

    fn ai_next_hand(&self, connection_id: &str) -> Result<(), SessionError> {
        let Some(mut table) = self.ai_tables.get(connection_id)? else {
            return Ok(());
        };
        if table.state.is_active() {
            return Ok(());
        }
        table.state = self.deal(GameMode::Ai, table.state.tallies())?;
        self.ai_tables
            .set(connection_id.to_string(), table.clone())?;
        self.send(
            connection_id,
            ServerMessage::GameStateUpdate(project(&table.state, HUMAN_SEAT)),
        );
        Ok(())
    }

    fn room_action(
        self: &Arc<Self>,
        connection_id: &str,
        room_id: &str,
        action: Action,
    ) -> Result<Transition, SessionError> {
        let mut room = self
            .rooms
            .get(room_id)?
            .ok_or_else(|| SessionError::NotFound(room_id.to_string()))?;
        let seat = room
            .seat_of(connection_id)
            .ok_or_else(|| SessionError::NotInRoom {
                connection: connection_id.to_string(),
                room: room_id.to_string(),
            })?;

        let transition = room.state.apply(seat, action)?;
        room.touch();
        self.rooms.set(room.id.clone(), room.clone())?;

        tracing::debug!(
            connection_id = %connection_id,
            room_id = %room_id,
            seat = %seat,
            action = %action,
            "player action applied"
        );
        self.broadcast_room(&room);

        let delays = self.settings.delays;
        match transition {
            Transition::Continue { .. } => {}
            Transition::Showdown => self.schedule_room(room_id, delays.showdown(), FollowUp::Showdown),
            Transition::Folded { winner } => {
                self.metrics.record_hand_completed();
                tracing::info!(room_id = %room_id, winner = %winner, "hand won by fold");
                self.schedule_room(room_id, delays.online_fold(), FollowUp::NextHand)
            }
        }
        Ok(transition)
    }

    fn schedule_room(self: &Arc<Self>, room_id: &str, delay: Duration, step: FollowUp) {
        let manager: Weak<Self> = Arc::downgrade(self);
        let room_id = room_id.to_string();
        self.timers
            .schedule(room_timer_key(&room_id), delay, move || {
                if let Some(manager) = manager.upgrade() {
                    manager.run_room_follow_up(&room_id, step);
                }
            });
    }

    fn run_room_follow_up(self: &Arc<Self>, room_id: &str, step: FollowUp) {
        let _guard = self.dispatch_lock();
        let result = match step {
            FollowUp::Showdown => self.room_showdown(room_id),
            FollowUp::NextHand => self.room_next_hand(room_id),
            FollowUp::AiTurn => Ok(()),
        };
        if let Err(err) = result {
            tracing::error!(room_id = %room_id, step = ?step, error = %err, "room follow-up failed");
        }
    }

    fn room_showdown(self: &Arc<Self>, room_id: &str) -> Result<(), SessionError> {
        let Some(mut room) = self.rooms.get(room_id)? else {
            tracing::debug!(room_id = %room_id, "showdown for closed room skipped");
            return Ok(());
        };
        if room.state.stage() != Stage::Showdown {
            return Ok(());
        }
        let winner = room.state.resolve_showdown()?;
        room.touch();
        self.rooms.set(room.id.clone(), room.clone())?;
        self.metrics.record_hand_completed();

        tracing::info!(room_id = %room_id, winner = %winner, "showdown resolved");
        self.broadcast_room(&room);
        self.schedule_room(room_id, self.settings.delays.next_hand(), FollowUp::NextHand);
        Ok(())
    }

    fn room_next_hand(&self, room_id: &str) -> Result<(), SessionError> {
        let Some(mut room) = self.rooms.get(room_id)? else {
            return Ok(());
        };
        if room.state.is_active() {
            return Ok(());
        }
        room.state = self.deal(GameMode::Online, room.state.tallies())?;
        room.touch();
        self.rooms.set(room.id.clone(), room.clone())?;
        self.broadcast_room(&room);
        Ok(())
    }

    pub fn create_friend_room(
        &self,
        connection_id: &str,
        user_id: Option<String>,
    ) -> Result<(), SessionError> {
        let _guard = self.dispatch_lock();
        let lobby = self.lobbies.create(connection_id, user_id)?;
        self.send(
            connection_id,
            ServerMessage::RoomCreated(RoomInfoPayload {
                message: format!("Room created. Share code {} with a friend.", lobby.code),
                room_code: lobby.code,
                room_id: lobby.room_id,
            }),
        );
        Ok(())
    }

    pub fn join_friend_room(
        &self,
        connection_id: &str,
        room_code: &str,
        user_id: Option<String>,
    ) -> Result<(), SessionError> {
        let _guard = self.dispatch_lock();
        let lobby = self.lobbies.join(room_code, connection_id)?;

        let room = match self.open_room(
            lobby.room_id.clone(),
            [lobby.creator.clone(), connection_id.to_string()],
            Some(lobby.code.clone()),
        ) {
            Ok(room) => room,
            Err(err) => {
                self.lobbies.remove(&lobby.code);
                return Err(err);
            }
        };
        tracing::info!(
            room_id = %room.id,
            room_code = %lobby.code,
            connection_id = %connection_id,
            "friend joined room"
        );

        self.send(
            connection_id,
            ServerMessage::RoomJoined(RoomInfoPayload {
                room_code: lobby.code.clone(),
                room_id: room.id.clone(),
                message: format!("Joined room {}.", lobby.code),
            }),
        );
        self.send(
            &lobby.creator,
            ServerMessage::PlayerJoined(PlayerJoinedPayload {
                player_id: connection_id.to_string(),
                user_id,
            }),
        );
        for seat in Seat::both() {
            self.send(
                room.connection(seat),
                ServerMessage::FriendGameStart(GameStartPayload {
                    room_id: room.id.clone(),
                    game_state: project(&room.state, seat),
                }),
            );
        }
        Ok(())
    }

    /// Releases everything tied to a closed connection and notifies its opponent.
    pub fn disconnect(&self, connection_id: &str) -> Result<(), SessionError> {
        let _guard = self.dispatch_lock();

        self.timers.cancel(&ai_timer_key(connection_id));
        let had_ai_game = self.ai_tables.delete(connection_id)?.is_some();

        {
            let mut waiting = self
                .waiting
                .lock()
                .map_err(|_| SessionError::StoragePoisoned)?;
            if waiting.as_deref() == Some(connection_id) {
                *waiting = None;
            }
        }

        let lobbies = self.lobbies.remove_waiting_by_creator(connection_id);
        let room = self.player_rooms.get(connection_id)?;
        if let Some(room_id) = &room {
            self.close_room(room_id, Some(connection_id))?;
        }

        self.events.drop_connection(connection_id);
        self.metrics.record_connection_closed();
        tracing::info!(
            connection_id = %connection_id,
            had_ai_game,
            closed_room = ?room,
            closed_lobbies = lobbies.len(),
            "client disconnected"
        );
        Ok(())
    }

    /// Closes rooms idle for longer than `threshold` and drops expired friend codes.
    /// Returns the number of rooms closed.
    pub fn cleanup_inactive_rooms(&self, threshold: Duration) -> Result<usize, SessionError> {
        let _guard = self.dispatch_lock();
        let now = Utc::now();
        let mut closed = 0;
        for room_id in self.rooms.keys()? {
            let idle = self
                .rooms
                .get(&room_id)?
                .is_some_and(|room| room.idle_longer_than(threshold, now));
            if idle {
                self.close_room(&room_id, None)?;
                closed += 1;
            }
        }
        let expired = self.lobbies.cleanup_expired();
        if closed > 0 || expired > 0 {
            tracing::info!(closed_rooms = closed, expired_codes = expired, "inactive rooms swept");
        }
        Ok(closed)
    }

    pub fn ai_state(&self, connection_id: &str) -> Result<Option<GameState>, SessionError> {
        Ok(self.ai_tables.get(connection_id)?.map(|table| table.state))
    }

    pub fn room(&self, room_id: &str) -> Result<Option<Room>, SessionError> {
        self.rooms.get(room_id)
    }

    pub fn find_room_by_player(&self, connection_id: &str) -> Result<Option<Room>, SessionError> {
        match self.player_rooms.get(connection_id)? {
            Some(room_id) => self.rooms.get(&room_id),
            None => Ok(None),
        }
    }

    pub fn is_waiting(&self, connection_id: &str) -> bool {
        self.waiting
            .lock()
            .map(|w| w.as_deref() == Some(connection_id))
            .unwrap_or(false)
    }

    pub fn ai_session_count(&self) -> usize {
        self.ai_tables.len().unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len().unwrap_or(0)
    }

    pub fn stats(&self) -> SessionStats {
        let waiting_players = self
            .waiting
            .lock()
            .map(|w| usize::from(w.is_some()))
            .unwrap_or(0);
        SessionStats {
            ai_sessions: self.ai_session_count(),
            rooms: self.room_count(),
            waiting_lobbies: self.lobbies.waiting_count(),
            waiting_players,
            pending_timers: self.timers.pending_count(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Aborts every pending follow-up. Used on shutdown.
    pub fn shutdown(&self) {
        self.timers.cancel_all();
    }
}
