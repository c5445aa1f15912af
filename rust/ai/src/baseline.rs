//! Baseline AI for Kuhn Poker.
//!
//! Responds only to the opponent's last action, using one uniform draw per decision.

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::AIOpponent;
use kuhn_engine::game::GameState;
use kuhn_engine::player::{Action, Seat};

/// Draw cut-offs for the two decisions the baseline policy makes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Facing a bet: call when the draw is above this, otherwise fold
    pub call_above: f64,
    /// After a check: bet when the draw is above this, otherwise check
    pub bet_above: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            call_above: 0.5,
            bet_above: 0.7,
        }
    }
}

/// The policy itself, with the draw supplied by the caller.
///
/// ```rust
/// use kuhn_ai::baseline::{respond, Thresholds};
/// use kuhn_engine::player::Action;
///
/// let t = Thresholds::default();
/// assert_eq!(respond(Some(Action::Bet), 0.9, t), Action::Call);
/// assert_eq!(respond(Some(Action::Bet), 0.5, t), Action::Fold);
/// assert_eq!(respond(Some(Action::Check), 0.71, t), Action::Bet);
/// assert_eq!(respond(None, 0.99, t), Action::Check);
/// ```
pub fn respond(opponent_last: Option<Action>, draw: f64, thresholds: Thresholds) -> Action {
    match opponent_last {
        Some(Action::Bet) => {
            if draw > thresholds.call_above {
                Action::Call
            } else {
                Action::Fold
            }
        }
        Some(Action::Check) => {
            if draw > thresholds.bet_above {
                Action::Bet
            } else {
                Action::Check
            }
        }
        _ => Action::Check,
    }
}

/// Baseline opponent backed by a seedable ChaCha RNG.
#[derive(Debug)]
pub struct BaselineAI {
    thresholds: Thresholds,
    rng: Mutex<ChaCha20Rng>,
}

impl Default for BaselineAI {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineAI {
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::default(),
            rng: Mutex::new(ChaCha20Rng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            thresholds: Thresholds::default(),
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    fn draw(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random::<f64>()
    }
}

/// The opponent's action, if it is the one `seat` must answer.
fn pending_response(state: &GameState, seat: Seat) -> Option<Action> {
    state
        .history()
        .last()
        .filter(|(actor, _)| *actor == seat.other())
        .map(|&(_, action)| action)
}

impl AIOpponent for BaselineAI {
    fn get_action(&self, state: &GameState, seat: Seat) -> Action {
        let choice = respond(pending_response(state, seat), self.draw(), self.thresholds);
        let legal = state.legal_actions();
        if legal.is_empty() || legal.contains(&choice) {
            return choice;
        }
        // e.g. a bet with no chips behind under custom stakes
        if legal.contains(&Action::Check) {
            Action::Check
        } else {
            Action::Fold
        }
    }

    fn name(&self) -> &str {
        "BaselineAI"
    }
}
