//! Parsing of interactive input for `kuhn play`.

use kuhn_engine::player::Action;

#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Action(Action),
    /// `q` or `quit`
    Quit,
    /// Unusable input with a message for the player
    Invalid(String),
}

/// Parses one line of player input (case-insensitive).
///
/// Accepts the four action names, single-letter shorthands (`b`, `k` for check,
/// `c` for call, `f`) and `q`/`quit`.
///
/// ```rust
/// # use kuhn_cli::validation::{parse_player_action, ParseResult};
/// use kuhn_engine::player::Action;
///
/// assert_eq!(parse_player_action("Bet"), ParseResult::Action(Action::Bet));
/// assert_eq!(parse_player_action("q"), ParseResult::Quit);
/// assert!(matches!(parse_player_action("raise"), ParseResult::Invalid(_)));
/// ```
pub fn parse_player_action(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let Some(word) = input.split_whitespace().next() else {
        return ParseResult::Invalid("Empty input".to_string());
    };

    match word {
        "q" | "quit" => ParseResult::Quit,
        "b" => ParseResult::Action(Action::Bet),
        "k" => ParseResult::Action(Action::Check),
        "c" => ParseResult::Action(Action::Call),
        "f" => ParseResult::Action(Action::Fold),
        other => match other.parse::<Action>() {
            Ok(action) => ParseResult::Action(action),
            Err(_) => ParseResult::Invalid(format!(
                "Unrecognized action `{}` (expected bet/check/call/fold or q)",
                other
            )),
        },
    }
}
