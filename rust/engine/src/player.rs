use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Canonical seat at the table. A viewer's "player"/"opponent" roles are derived
/// from this, never stored.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// Acts first every hand
    First,
    /// Responds to the first seat
    Second,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn both() -> [Seat; 2] {
        [Seat::First, Seat::Second]
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::First => write!(f, "first seat"),
            Seat::Second => write!(f, "second seat"),
        }
    }
}

/// A betting action. There is a single bet size, so no action carries an amount.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Put one bet into the pot when nothing is outstanding
    Bet,
    /// Pass without betting when nothing is outstanding
    Check,
    /// Match the outstanding bet
    Call,
    /// Give up the hand and the pot
    Fold,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Bet => "bet",
            Action::Check => "check",
            Action::Call => "call",
            Action::Fold => "fold",
        }
    }

    pub fn all() -> [Action; 4] {
        [Action::Bet, Action::Check, Action::Call, Action::Fold]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bet" => Ok(Action::Bet),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call),
            "fold" => Ok(Action::Fold),
            other => Err(GameError::InvalidAction(other.to_string())),
        }
    }
}

/// Cumulative win/loss counter for one seat. Carried from hand to hand.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
}

impl Tally {
    pub fn record(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }

    pub fn hands(&self) -> u32 {
        self.wins + self.losses
    }
}
