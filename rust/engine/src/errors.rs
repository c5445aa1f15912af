use thiserror::Error;

use crate::cards::Card;
use crate::player::{Action, Seat};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid card value: {0:?}")]
    InvalidCard(String),
    #[error("Both players hold {0}; a Kuhn deck has no duplicate ranks")]
    DuplicateCard(Card),
    #[error("Invalid action: {0:?}")]
    InvalidAction(String),
    #[error("Cannot {action} now: {reason}")]
    IllegalAction { action: Action, reason: &'static str },
    #[error("Insufficient chips: need {needed}, have {available}")]
    InsufficientChips { needed: u32, available: u32 },
    #[error("Bet amount cannot be negative: {0}")]
    NegativeBet(i64),
    #[error("It's not {actual}'s turn (expected {expected})")]
    NotPlayersTurn { expected: Seat, actual: Seat },
    #[error("No hand in progress")]
    HandNotActive,
    #[error("Hand is not at showdown")]
    NotInShowdown,
    #[error("Invalid table rules: {0}")]
    InvalidRules(String),
}
