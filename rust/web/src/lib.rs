//! Real-time Kuhn Poker server.
//!
//! Clients connect over a WebSocket at `/socket` and exchange
//! `{"event": ..., "data": ...}` frames. The [`SessionManager`] owns every
//! canonical [`GameState`](kuhn_engine::game::GameState) and sends each connection
//! only its own [`PlayerView`](kuhn_engine::view::PlayerView).

pub mod ai;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod rooms;
pub mod server;
pub mod session;
pub mod settings;
pub mod store;
pub mod timers;

pub use ai::{create_ai, AIOpponent, BaselineAI};
pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{ClientMessage, ConnectionId, EventBus, EventSubscription, ServerMessage};
pub use logging::{init_logging, init_test_logging, LogEntry, TestLogSubscriber};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use rooms::{FriendLobby, LobbyStatus, Room, RoomCodes, RoomError, RoomId};
pub use server::{routes, AppContext, ServerError, ServerHandle, WebServer};
pub use session::{AiTable, SessionError, SessionManager, SessionStats, Stores, AI_SEAT, HUMAN_SEAT};
pub use settings::{Delays, ServerSettings, SettingsError};
pub use store::{MemoryStore, SessionStore};
pub use timers::Timers;
