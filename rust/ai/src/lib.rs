//! # kuhn-ai: AI Opponents for Kuhn Poker
//!
//! AI opponents share the [`AIOpponent`] interface so the server and the CLI can
//! swap implementations by name.
//!
//! ## Core Components
//!
//! - [`AIOpponent`] - Trait defining the interface for AI decision-making
//! - [`baseline`] - Two-threshold randomized policy
//! - [`create_ai`] - Factory function for creating AI opponents
//!
//! ## Quick Start
//!
//! ```rust
//! use kuhn_ai::{create_ai, AIOpponent};
//! use kuhn_engine::engine::Engine;
//! use kuhn_engine::game::GameMode;
//! use kuhn_engine::player::{Action, Seat, Tally};
//! use kuhn_engine::rules::TableRules;
//!
//! let ai = create_ai("baseline", Some(42)).expect("known AI");
//!
//! let mut engine = Engine::new(Some(42), TableRules::default()).unwrap();
//! let mut state = engine.deal(GameMode::Ai, [Tally::default(); 2]).unwrap();
//! state.apply(Seat::First, Action::Check).unwrap();
//!
//! let action = ai.get_action(&state, Seat::Second);
//! assert!(action == Action::Bet || action == Action::Check);
//! ```
//!
//! ## AI Types
//!
//! - `"baseline"` - calls/folds a bet and bets/checks a check at fixed thresholds

use kuhn_engine::game::GameState;
use kuhn_engine::player::{Action, Seat};

pub mod baseline;

/// Interface for AI opponents.
///
/// # Example Implementation
///
/// ```rust
/// use kuhn_ai::AIOpponent;
/// use kuhn_engine::game::GameState;
/// use kuhn_engine::player::{Action, Seat};
///
/// struct Passive;
///
/// impl AIOpponent for Passive {
///     fn get_action(&self, state: &GameState, seat: Seat) -> Action {
///         if state.facing_bet(seat) { Action::Fold } else { Action::Check }
///     }
///
///     fn name(&self) -> &str {
///         "Passive"
///     }
/// }
/// ```
pub trait AIOpponent: Send + Sync {
    /// Chooses the next action for `seat`. Implementations should return an action
    /// that is legal in `state`.
    fn get_action(&self, state: &GameState, seat: Seat) -> Action;

    fn name(&self) -> &str;
}

/// Names accepted by [`create_ai`].
pub const AI_NAMES: &[&str] = &["baseline"];

/// Creates an AI opponent by name. `seed` makes its draws reproducible.
///
/// Returns `None` for unknown names.
///
/// ```rust
/// use kuhn_ai::create_ai;
///
/// let ai = create_ai("baseline", None).unwrap();
/// assert_eq!(ai.name(), "BaselineAI");
/// assert!(create_ai("cfr", None).is_none());
/// ```
pub fn create_ai(ai_type: &str, seed: Option<u64>) -> Option<Box<dyn AIOpponent>> {
    match ai_type {
        "baseline" => Some(Box::new(match seed {
            Some(seed) => baseline::BaselineAI::with_seed(seed),
            None => baseline::BaselineAI::new(),
        })),
        _ => None,
    }
}
