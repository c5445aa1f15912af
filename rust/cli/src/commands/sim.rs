//! AI-versus-AI simulation.
//!
//! Both seats are driven by the configured AI, each with its own seed derived from
//! the dealer seed, so a run is reproducible from `--seed` alone. Results report
//! wins and net chips per seat. With `--output`, every finished hand is appended to
//! a JSONL file through [`HandLogger`].

use super::{ai_choice, build_ai, resolve_seed, seat_seeds};
use crate::config::Config;
use crate::error::CliError;
use crate::ui;
use kuhn_ai::AIOpponent;
use kuhn_engine::engine::Engine;
use kuhn_engine::game::{GameMode, GameState, Stage};
use kuhn_engine::logger::{HandLogger, HandRecord};
use kuhn_engine::player::{Action, Seat, Tally};
use std::io::Write;
use std::path::Path;

/// Totals for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimSummary {
    pub hands: u64,
    pub wins: [u64; 2],
    /// Chips won minus chips put in, per seat
    pub net: [i64; 2],
    /// Hands where an AI picked an illegal action and was folded
    pub forced_folds: u64,
}

pub fn handle_sim_command(
    hands: u64,
    seed: Option<u64>,
    output: Option<&Path>,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if hands == 0 {
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }

    let seed = resolve_seed(seed, config);
    let mut logger = output.map(HandLogger::create).transpose()?;
    writeln!(out, "sim: hands={} seed={} ai={}", hands, seed, config.ai)?;

    let summary = simulate(hands, seed, config, logger.as_mut())?;

    writeln!(out, "Hands: {}", summary.hands)?;
    for seat in Seat::both() {
        let i = seat.index();
        writeln!(
            out,
            "Seat {}: wins={} net={:+}",
            i + 1,
            summary.wins[i],
            summary.net[i]
        )?;
    }
    if summary.forced_folds > 0 {
        ui::display_warning(
            err,
            &format!(
                "{} hand(s) ended with a forced fold after an illegal AI action",
                summary.forced_folds
            ),
        )?;
    }
    if let Some(path) = output {
        writeln!(out, "Records written to {}", path.display())?;
    }
    Ok(())
}

/// Plays `hands` AI-versus-AI hands and records each one when `logger` is set.
pub fn simulate(
    hands: u64,
    seed: u64,
    config: &Config,
    mut logger: Option<&mut HandLogger>,
) -> Result<SimSummary, CliError> {
    let rules = config.rules();
    let mut engine = Engine::new(Some(seed), rules)?;
    let seeds = seat_seeds(seed);
    let ais = [build_ai(config, seeds[0])?, build_ai(config, seeds[1])?];

    let mut summary = SimSummary::default();
    let mut tally = [Tally::default(); 2];

    for _ in 0..hands {
        let mut state = engine.deal(GameMode::Ai, tally)?;
        if play_out(&mut state, &ais)? {
            summary.forced_folds += 1;
        }

        let outcome = state
            .outcome()
            .ok_or_else(|| CliError::Engine("hand ended without an outcome".into()))?;
        summary.hands += 1;
        summary.wins[outcome.winner.index()] += 1;
        for seat in Seat::both() {
            summary.net[seat.index()] +=
                i64::from(state.chips(seat)) - i64::from(rules.starting_stack);
        }
        tally = state.tallies();

        if let Some(logger) = logger.as_deref_mut() {
            let id = logger.next_id();
            let record = HandRecord::from_state(id, Some(seed), &state)
                .ok_or_else(|| CliError::Engine("hand ended without an outcome".into()))?;
            logger.write(&record)?;
        }
    }
    Ok(summary)
}

/// Runs betting to completion. Returns true if an illegal choice was replaced by a fold.
fn play_out(state: &mut GameState, ais: &[Box<dyn AIOpponent>; 2]) -> Result<bool, CliError> {
    let mut forced = false;
    while state.stage() == Stage::Betting {
        let seat = state.to_act();
        let action = match ai_choice(ais[seat.index()].as_ref(), state, seat) {
            Some(action) => action,
            None => {
                forced = true;
                Action::Fold
            }
        };
        state.apply(seat, action)?;
    }
    if state.stage() == Stage::Showdown {
        state.resolve_showdown()?;
    }
    Ok(forced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_are_conserved_across_seats() {
        let summary = simulate(200, 3, &Config::default(), None).unwrap();
        assert_eq!(summary.hands, 200);
        assert_eq!(summary.wins[0] + summary.wins[1], 200);
        assert_eq!(summary.net[0] + summary.net[1], 0);
        assert_eq!(summary.forced_folds, 0);
    }

    #[test]
    fn same_seed_same_result() {
        let a = simulate(50, 11, &Config::default(), None).unwrap();
        let b = simulate(50, 11, &Config::default(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn larger_stakes_scale_net_chips() {
        let config = Config {
            ante: 2,
            starting_stack: 10,
            bet_size: 3,
            ..Config::default()
        };
        let summary = simulate(1, 5, &config, None).unwrap();
        assert_eq!(summary.net[0] + summary.net[1], 0);
        // a single hand moves the ante, or the ante plus one bet
        assert!([2, 5].contains(&summary.net[0].abs()), "{:?}", summary);
    }

    #[test]
    fn writes_one_record_per_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("hands.jsonl");
        let mut out = Vec::new();
        let mut err = Vec::new();
        handle_sim_command(
            5,
            Some(8),
            Some(&path),
            &Config::default(),
            &mut out,
            &mut err,
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let records: Vec<HandRecord> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.seed == Some(8)));
        assert!(records[0].hand_id.ends_with("-000001"));
        assert!(records[4].hand_id.ends_with("-000005"));

        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.contains("Hands: 5"));
        assert!(stdout.contains("Records written to"));
    }

    #[test]
    fn zero_hands_is_rejected() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_sim_command(0, None, None, &Config::default(), &mut out, &mut err);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        assert!(out.is_empty());
    }
}
