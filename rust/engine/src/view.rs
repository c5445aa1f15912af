//! Per-viewer projection of the canonical [`GameState`].
//!
//! The server never stores a "player" or "opponent" perspective. Each outgoing
//! update is produced here from the canonical state and the recipient's seat.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::{GameMode, GameState, Stage, WinMethod};
use crate::player::{Action, Seat};

/// Whose turn it is, from the viewer's perspective.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewStage {
    Betting,
    Showdown,
    GameOver,
}

/// State of a hand as one seat is allowed to see it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub player_card: Card,
    /// `None` until the cards are revealed at showdown
    pub opponent_card: Option<Card>,
    pub pot: u32,
    pub player_chips: u32,
    pub opponent_chips: u32,
    pub bet_amount: u32,
    pub wins: u32,
    pub losses: u32,
    pub game_phase: String,
    pub current_player: Role,
    pub game_stage: ViewStage,
    pub player_action: Option<Action>,
    pub opponent_action: Option<Action>,
    pub is_game_active: bool,
    pub show_opponent_card: bool,
    pub waiting_for_opponent: bool,
    pub game_mode: GameMode,
}

/// Orients `state` for `viewer`. Pure: the same inputs always give the same view.
pub fn project(state: &GameState, viewer: Seat) -> PlayerView {
    let opp = viewer.other();
    let stage = match state.stage() {
        Stage::Betting => ViewStage::Betting,
        Stage::Showdown => ViewStage::Showdown,
        Stage::Complete => ViewStage::GameOver,
    };
    let current_player = if state.to_act() == viewer {
        Role::Player
    } else {
        Role::Opponent
    };
    let tally = state.tally(viewer);
    let betting = state.is_active() && state.stage() == Stage::Betting;

    PlayerView {
        player_card: state.card(viewer),
        opponent_card: state.is_revealed().then(|| state.card(opp)),
        pot: state.pot(),
        player_chips: state.chips(viewer),
        opponent_chips: state.chips(opp),
        bet_amount: state.bet_size(),
        wins: tally.wins,
        losses: tally.losses,
        game_phase: phase_message(state, viewer),
        current_player,
        game_stage: stage,
        player_action: state.last_action(viewer),
        opponent_action: state.last_action(opp),
        is_game_active: state.is_active(),
        show_opponent_card: state.is_revealed(),
        waiting_for_opponent: betting && current_player == Role::Opponent,
        game_mode: state.mode(),
    }
}

/// One-line description of the hand for `viewer`.
pub fn phase_message(state: &GameState, viewer: Seat) -> String {
    if let Some(outcome) = state.outcome() {
        let won = outcome.winner == viewer;
        return match (outcome.by, won) {
            (WinMethod::Fold, true) => "Opponent folded. You win!".to_string(),
            (WinMethod::Fold, false) => "You folded. Opponent wins.".to_string(),
            (WinMethod::Showdown, true) => format!(
                "You win! {} beats {}",
                state.card(viewer),
                state.card(viewer.other())
            ),
            (WinMethod::Showdown, false) => format!(
                "You lose. {} beats {}",
                state.card(viewer.other()),
                state.card(viewer)
            ),
        };
    }

    let last = state.history().last().copied();
    if state.stage() == Stage::Showdown {
        return match last {
            Some((_, Action::Call)) => "Bet called. Showdown!".to_string(),
            _ => "Both checked. Showdown!".to_string(),
        };
    }

    match last {
        None if state.to_act() == viewer => "Hand started! Your turn.".to_string(),
        None => "Hand started! Opponent's turn.".to_string(),
        Some((seat, action)) if seat == viewer => {
            format!("You {}. Opponent's turn.", past_tense(action))
        }
        Some((_, Action::Bet)) => "Opponent bet. Call or fold.".to_string(),
        Some((_, action)) => format!("Opponent {}. Your turn.", past_tense(action)),
    }
}

fn past_tense(action: Action) -> &'static str {
    match action {
        Action::Bet => "bet",
        Action::Check => "checked",
        Action::Call => "called",
        Action::Fold => "folded",
    }
}
