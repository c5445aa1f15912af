//! # kuhn-engine: Kuhn Poker Game Core
//!
//! Kuhn Poker is played with three cards (Q < K < A), one card per player, a one-chip
//! ante and a single bet size. This crate owns the canonical state machine for one
//! hand, showdown resolution, win/loss bookkeeping and the per-viewer projection that
//! clients receive.
//!
//! ## Core Modules
//!
//! - [`cards`] - The three ranks and their ordering
//! - [`deck`] - Seeded three-card deck (ChaCha20 RNG)
//! - [`engine`] - Dealer that starts hands
//! - [`game`] - Canonical `GameState`, action transitions and showdown
//! - [`player`] - Seats, actions and win/loss tallies
//! - [`rules`] - Table stakes and action validation
//! - [`view`] - Per-viewer `PlayerView` projection
//! - [`logger`] - `HandRecord` JSONL output
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use kuhn_engine::engine::Engine;
//! use kuhn_engine::game::{GameMode, Transition};
//! use kuhn_engine::player::{Action, Seat, Tally};
//! use kuhn_engine::rules::TableRules;
//! use kuhn_engine::view::project;
//!
//! let mut engine = Engine::new(Some(42), TableRules::default()).unwrap();
//! let mut state = engine.deal(GameMode::Ai, [Tally::default(); 2]).unwrap();
//!
//! state.apply(Seat::First, Action::Check).unwrap();
//! let step = state.apply(Seat::Second, Action::Check).unwrap();
//! assert_eq!(step, Transition::Showdown);
//!
//! let winner = state.resolve_showdown().unwrap();
//! let view = project(&state, winner);
//! assert_eq!(view.wins, 1);
//! assert!(view.show_opponent_card);
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod logger;
pub mod player;
pub mod rules;
pub mod view;
