//! Terminal output helpers shared by the commands.

use kuhn_engine::cards::Card;
use kuhn_engine::player::Action;
use kuhn_engine::view::PlayerView;
use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// One status line for a projected view, e.g.
/// `[K vs ?] pot=3 chips=0/1 | You bet. Opponent's turn.`
pub fn view_line(view: &PlayerView) -> String {
    let opponent = view
        .opponent_card
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!(
        "[{} vs {}] pot={} chips={}/{} | {}",
        view.player_card,
        opponent,
        view.pot,
        view.player_chips,
        view.opponent_chips,
        view.game_phase
    )
}

pub fn format_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn format_cards(cards: [Card; 2]) -> String {
    format!("{} {}", cards[0], cards[1])
}
