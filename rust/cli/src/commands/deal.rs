//! Deals a single hand and prints both seats' cards.

use super::resolve_seed;
use crate::config::Config;
use crate::error::CliError;
use crate::ui;
use kuhn_engine::engine::Engine;
use kuhn_engine::game::GameMode;
use kuhn_engine::player::Tally;
use std::io::Write;

pub fn handle_deal_command(
    seed: Option<u64>,
    config: &Config,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let seed = resolve_seed(seed, config);
    let mut engine = Engine::new(Some(seed), config.rules())?;
    let state = engine.deal(GameMode::Ai, [Tally::default(); 2])?;

    writeln!(out, "Seed: {}", seed)?;
    writeln!(out, "Seat 1: {}", state.cards()[0])?;
    writeln!(out, "Seat 2: {}", state.cards()[1])?;
    writeln!(out, "Cards: {}", ui::format_cards(state.cards()))?;
    writeln!(out, "Pot: {}", state.pot())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(seed: u64) -> String {
        let mut out = Vec::new();
        handle_deal_command(Some(seed), &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prints_two_distinct_cards() {
        let output = deal(42);
        let seat = |n: &str| {
            output
                .lines()
                .find_map(|l| l.strip_prefix(n))
                .expect("seat line")
                .to_string()
        };
        let (a, b) = (seat("Seat 1: "), seat("Seat 2: "));
        assert!(["Q", "K", "A"].contains(&a.as_str()));
        assert!(["Q", "K", "A"].contains(&b.as_str()));
        assert_ne!(a, b);
        assert!(output.contains("Pot: 2"));
    }

    #[test]
    fn seed_is_deterministic() {
        assert_eq!(deal(7), deal(7));
    }
}
