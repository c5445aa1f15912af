//! One module per subcommand. Handlers take their output streams as
//! `&mut dyn Write` and return [`CliError`] on failure.

pub mod cfg;
pub mod deal;
pub mod play;
pub mod sim;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use play::handle_play_command;
pub use sim::handle_sim_command;

use crate::config::Config;
use crate::error::CliError;
use kuhn_ai::{create_ai, AIOpponent};
use kuhn_engine::game::GameState;
use kuhn_engine::player::{Action, Seat};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed from the flag, then the configuration, then the OS.
fn resolve_seed(flag: Option<u64>, config: &Config) -> u64 {
    flag.or(config.seed).unwrap_or_else(rand::random)
}

/// Independent AI seeds for both seats, derived from the dealer seed.
fn seat_seeds(seed: u64) -> [u64; 2] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    [rng.random(), rng.random()]
}

fn build_ai(config: &Config, seed: u64) -> Result<Box<dyn AIOpponent>, CliError> {
    create_ai(&config.ai, Some(seed))
        .ok_or_else(|| CliError::Config(format!("unknown ai `{}`", config.ai)))
}

/// The AI's choice for `seat`, or `None` when it picked something illegal.
fn ai_choice(ai: &dyn AIOpponent, state: &GameState, seat: Seat) -> Option<Action> {
    let action = ai.get_action(state, seat);
    state.legal_actions().contains(&action).then_some(action)
}
