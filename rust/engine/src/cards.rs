use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// One of the three ranks in a Kuhn deck.
/// Discriminants give the strict order used at showdown: Queen < King < Ace.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Card {
    /// Queen (lowest)
    Queen = 1,
    /// King
    King = 2,
    /// Ace (highest)
    Ace = 3,
}

impl Card {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> char {
        match self {
            Card::Queen => 'Q',
            Card::King => 'K',
            Card::Ace => 'A',
        }
    }

    pub fn is_valid(text: &str) -> bool {
        text.parse::<Card>().is_ok()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Q" => Ok(Card::Queen),
            "K" => Ok(Card::King),
            "A" => Ok(Card::Ace),
            other => Err(GameError::InvalidCard(other.to_string())),
        }
    }
}

impl TryFrom<String> for Card {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

pub fn full_deck() -> [Card; 3] {
    [Card::Queen, Card::King, Card::Ace]
}
