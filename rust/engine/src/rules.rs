use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::Action as A;

/// Default ante each seat posts before the hand starts.
pub const DEFAULT_ANTE: u32 = 1;
/// Default chips per seat before the ante.
pub const DEFAULT_STARTING_STACK: u32 = 2;
/// Default size of the single allowed bet.
pub const DEFAULT_BET_SIZE: u32 = 1;

/// Stakes for one table. With the defaults a fresh hand has pot 2 and one chip
/// behind for each seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableRules {
    pub ante: u32,
    pub starting_stack: u32,
    pub bet_size: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            ante: DEFAULT_ANTE,
            starting_stack: DEFAULT_STARTING_STACK,
            bet_size: DEFAULT_BET_SIZE,
        }
    }
}

impl TableRules {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.bet_size == 0 {
            return Err(GameError::InvalidRules("bet_size must be > 0".into()));
        }
        if self.starting_stack < self.ante {
            return Err(GameError::InvalidRules(format!(
                "starting_stack {} cannot cover ante {}",
                self.starting_stack, self.ante
            )));
        }
        Ok(())
    }

    pub fn initial_pot(&self) -> u32 {
        self.ante * 2
    }

    pub fn chips_behind(&self) -> u32 {
        self.starting_stack - self.ante
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u32),
    Bet(u32),
}

/// Validates an action against the betting situation and the actor's stack.
///
/// `facing_bet` is true when the other seat's most recent action was a bet that
/// has not been answered yet.
///
/// # Errors
///
/// - [`GameError::IllegalAction`] - check or bet while facing a bet, call with
///   nothing to call
/// - [`GameError::InsufficientChips`] - bet or call larger than the stack
///
/// # Examples
///
/// ```
/// use kuhn_engine::player::Action;
/// use kuhn_engine::rules::{validate_action, ValidatedAction};
///
/// assert_eq!(validate_action(1, false, 1, Action::Bet), Ok(ValidatedAction::Bet(1)));
/// assert_eq!(validate_action(1, true, 1, Action::Call), Ok(ValidatedAction::Call(1)));
/// assert!(validate_action(0, true, 1, Action::Call).is_err());
/// assert!(validate_action(1, true, 1, Action::Check).is_err());
/// ```
pub fn validate_action(
    stack: u32,
    facing_bet: bool,
    bet_size: u32,
    action: A,
) -> Result<ValidatedAction, GameError> {
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if facing_bet {
                Err(GameError::IllegalAction {
                    action,
                    reason: "there is a bet to answer",
                })
            } else {
                Ok(ValidatedAction::Check)
            }
        }
        A::Bet => {
            if facing_bet {
                return Err(GameError::IllegalAction {
                    action,
                    reason: "a bet is already outstanding",
                });
            }
            chips_after_bet(stack, bet_size)?;
            Ok(ValidatedAction::Bet(bet_size))
        }
        A::Call => {
            if !facing_bet {
                return Err(GameError::IllegalAction {
                    action,
                    reason: "there is no bet to call",
                });
            }
            chips_after_bet(stack, bet_size)?;
            Ok(ValidatedAction::Call(bet_size))
        }
    }
}

/// Stack left after putting `bet` in.
pub fn chips_after_bet(chips: u32, bet: u32) -> Result<u32, GameError> {
    chips
        .checked_sub(bet)
        .ok_or(GameError::InsufficientChips {
            needed: bet,
            available: chips,
        })
}

/// Pot after adding `amount`. Amounts are signed because they can originate outside
/// the engine; negative ones are refused.
pub fn add_to_pot(pot: u32, amount: i64) -> Result<u32, GameError> {
    if amount < 0 {
        return Err(GameError::NegativeBet(amount));
    }
    let amount = u32::try_from(amount).map_err(|_| {
        GameError::InvalidRules(format!("bet amount {amount} exceeds the chip range"))
    })?;
    Ok(pot.saturating_add(amount))
}
