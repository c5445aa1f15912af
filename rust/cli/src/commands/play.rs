//! # Play Command
//!
//! Interactive Kuhn Poker against the AI. The human always holds the first seat and
//! the CLI process owns the game state; nothing is shared with a server.
//!
//! Each event prints the human's projected view, so the AI's card stays hidden until
//! a showdown reveals it. Typing `q` (or closing stdin) abandons the current hand and
//! ends the session.

use super::{ai_choice, build_ai, resolve_seed, seat_seeds};
use crate::config::Config;
use crate::error::CliError;
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{parse_player_action, ParseResult};
use kuhn_ai::AIOpponent;
use kuhn_engine::engine::Engine;
use kuhn_engine::game::{GameMode, GameState, Stage};
use kuhn_engine::player::{Action, Seat, Tally};
use kuhn_engine::view::project;
use std::io::{BufRead, Write};

const HUMAN: Seat = Seat::First;
const AI: Seat = Seat::Second;

enum HandEnd {
    Finished(GameState),
    Quit,
}

pub fn handle_play_command(
    hands: u32,
    seed: Option<u64>,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    if hands == 0 {
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }

    let seed = resolve_seed(seed, config);
    let mut engine = Engine::new(Some(seed), config.rules())?;
    let ai = build_ai(config, seat_seeds(seed)[AI.index()])?;

    writeln!(
        out,
        "play: hands={} seed={} ai={}",
        hands,
        seed,
        ai.name()
    )?;

    let mut tally = [Tally::default(); 2];
    let mut played = 0u32;

    for i in 1..=hands {
        writeln!(out, "Hand {}", i)?;
        let state = engine.deal(GameMode::Ai, tally)?;
        match play_hand(state, ai.as_ref(), out, err, stdin)? {
            HandEnd::Finished(state) => {
                tally = state.tallies();
                played += 1;
            }
            HandEnd::Quit => {
                writeln!(out, "Hand abandoned.")?;
                break;
            }
        }
    }

    let mine = tally[HUMAN.index()];
    writeln!(out, "Hands played: {}", played)?;
    writeln!(out, "Wins: {}  Losses: {}", mine.wins, mine.losses)?;
    let verdict = match mine.wins.cmp(&mine.losses) {
        std::cmp::Ordering::Greater => "You finished ahead.",
        std::cmp::Ordering::Less => "The AI finished ahead.",
        std::cmp::Ordering::Equal => "Dead even.",
    };
    writeln!(out, "{}", verdict)?;
    Ok(())
}

fn play_hand(
    mut state: GameState,
    ai: &dyn AIOpponent,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<HandEnd, CliError> {
    writeln!(out, "{}", ui::view_line(&project(&state, HUMAN)))?;

    while state.stage() == Stage::Betting {
        if state.to_act() == HUMAN {
            let legal = state.legal_actions();
            write!(out, "Your action ({}, q to quit): ", ui::format_actions(&legal))?;
            out.flush()?;

            let Some(line) = read_stdin_line(stdin) else {
                writeln!(out)?;
                return Ok(HandEnd::Quit);
            };
            match parse_player_action(&line) {
                ParseResult::Quit => return Ok(HandEnd::Quit),
                ParseResult::Invalid(msg) => {
                    ui::write_error(err, &msg)?;
                    continue;
                }
                ParseResult::Action(action) => {
                    if let Err(e) = state.apply(HUMAN, action) {
                        ui::write_error(err, &e.to_string())?;
                        continue;
                    }
                }
            }
        } else {
            let action = match ai_choice(ai, &state, AI) {
                Some(action) => action,
                None => {
                    ui::display_warning(err, "AI chose an illegal action; folding for it")?;
                    Action::Fold
                }
            };
            state.apply(AI, action)?;
            writeln!(out, "AI: {}", action)?;
        }
        writeln!(out, "{}", ui::view_line(&project(&state, HUMAN)))?;
    }

    if state.stage() == Stage::Showdown {
        state.resolve_showdown()?;
        writeln!(out, "{}", ui::view_line(&project(&state, HUMAN)))?;
    }
    Ok(HandEnd::Finished(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn play(hands: u32, seed: u64, input: &str) -> (Result<(), CliError>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let result = handle_play_command(
            hands,
            Some(seed),
            &Config::default(),
            &mut out,
            &mut err,
            &mut stdin,
        );
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn zero_hands_is_rejected() {
        let (result, _, _) = play(0, 1, "");
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn folding_loses_the_hand() {
        let (result, out, _) = play(1, 7, "fold\n");
        assert!(result.is_ok());
        assert!(out.contains("You folded. Opponent wins."), "{out}");
        assert!(out.contains("Hands played: 1"));
        assert!(out.contains("Wins: 0  Losses: 1"));
        assert!(out.contains("The AI finished ahead."));
    }

    #[test]
    fn quit_before_acting_plays_nothing() {
        let (result, out, _) = play(3, 7, "q\n");
        assert!(result.is_ok());
        assert!(out.contains("Hand abandoned."));
        assert!(out.contains("Hands played: 0"));
        assert!(!out.contains("Hand 2"));
    }

    #[test]
    fn eof_ends_the_session() {
        let (result, out, _) = play(2, 7, "");
        assert!(result.is_ok());
        assert!(out.contains("Hands played: 0"));
    }

    #[test]
    fn bad_input_is_reported_and_retried() {
        let (result, out, err) = play(1, 7, "raise\ncall\nfold\n");
        assert!(result.is_ok());
        assert!(err.contains("Unrecognized action `raise`"), "{err}");
        // nothing to call on the opening action
        assert!(err.contains("Cannot call now"), "{err}");
        assert!(out.contains("Hands played: 1"));
    }

    #[test]
    fn opponent_card_hidden_until_showdown() {
        let (_, out, _) = play(1, 7, "fold\n");
        let first_view = out
            .lines()
            .find(|l| l.starts_with('['))
            .expect("view line");
        assert!(first_view.contains(" vs ?]"), "{first_view}");
        assert!(first_view.contains("pot=2"));
    }

    #[test]
    fn same_seed_replays_identically() {
        let input = "check\ncall\ncheck\ncall\n";
        let (_, a, _) = play(2, 99, input);
        let (_, b, _) = play(2, 99, input);
        assert_eq!(a, b);
    }
}
