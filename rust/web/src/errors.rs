//! Error envelope shared by HTTP responses and `action-rejected` frames.
use crate::rooms::RoomError;
use crate::session::SessionError;
use kuhn_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Rejection, Reply};

/// Standard error body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "not_your_turn")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Bad input from a client; expected during normal play
    Client,
    /// Unexpected failure on our side
    Server,
    /// Shared state can no longer be trusted
    Critical,
}

pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    /// Writes a log line at the level matching [`IntoErrorResponse::severity`].
    fn log(&self) {
        let response = self.to_error_response();
        match self.severity() {
            ErrorSeverity::Client => {
                tracing::info!(error = %response.error, "client error: {}", response.message)
            }
            ErrorSeverity::Server => {
                tracing::error!(error = %response.error, "server error: {}", response.message)
            }
            ErrorSeverity::Critical => {
                tracing::error!(error = %response.error, critical = true, "critical error: {}", response.message)
            }
        }
    }

    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        self.log();
        self.to_error_response().into_response(self.status_code())
    }
}

impl IntoErrorResponse for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::NotPlayersTurn { .. } | GameError::HandNotActive => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GameError::InvalidCard(_) => "invalid_card",
            GameError::DuplicateCard(_) => "duplicate_card",
            GameError::InvalidAction(_) => "invalid_action",
            GameError::IllegalAction { .. } => "illegal_action",
            GameError::InsufficientChips { .. } => "insufficient_chips",
            GameError::NegativeBet(_) => "negative_bet",
            GameError::NotPlayersTurn { .. } => "not_your_turn",
            GameError::HandNotActive => "hand_not_active",
            GameError::NotInShowdown => "not_in_showdown",
            GameError::InvalidRules(_) => "invalid_rules",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            GameError::InsufficientChips { needed, available } => Some(serde_json::json!({
                "needed": needed,
                "available": available,
            })),
            GameError::IllegalAction { action, .. } => {
                Some(serde_json::json!({ "action": action }))
            }
            _ => None,
        }
    }
}

impl IntoErrorResponse for RoomError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoomError::CodeNotFound(_) => StatusCode::NOT_FOUND,
            RoomError::AlreadyStarted(_) | RoomError::AlreadyExists(_) => StatusCode::CONFLICT,
            RoomError::Expired(_) => StatusCode::GONE,
            RoomError::CodeExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            RoomError::OwnRoom => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RoomError::CodeNotFound(_) => "room_not_found",
            RoomError::AlreadyStarted(_) => "room_already_started",
            RoomError::Expired(_) => "room_expired",
            RoomError::CodeExhausted(_) => "room_code_exhausted",
            RoomError::AlreadyExists(_) => "room_already_exists",
            RoomError::OwnRoom => "own_room",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

impl IntoErrorResponse for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::NotInRoom { .. } => StatusCode::FORBIDDEN,
            SessionError::Protocol(_) => StatusCode::BAD_REQUEST,
            SessionError::Game(err) => err.status_code(),
            SessionError::Room(err) => err.status_code(),
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::NotInRoom { .. } => "not_in_room",
            SessionError::Protocol(_) => "invalid_message",
            SessionError::Game(err) => err.error_code(),
            SessionError::Room(err) => err.error_code(),
            SessionError::StoragePoisoned => "storage_poisoned",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::Game(err) => err.error_details(),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            _ if self.status_code().is_server_error() => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}

/// Turns unmatched routes and other rejections into the JSON error envelope.
pub async fn handle_rejection(rejection: Rejection) -> Result<Response, Rejection> {
    let (status, body) = if rejection.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("not_found", "Resource not found"),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorResponse::new("method_not_allowed", "Method not allowed"),
        )
    } else {
        tracing::warn!(rejection = ?rejection, "unhandled rejection");
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("bad_request", "Request could not be processed"),
        )
    };
    Ok(body.into_response(status))
}
