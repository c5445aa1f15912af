//! `kuhn cfg`: prints every configuration value with its source as pretty JSON.
//!
//! ```json
//! {
//!   "ante": { "value": 1, "source": "default" },
//!   "seed": { "value": 7, "source": "env" },
//!   ...
//! }
//! ```

use crate::config::{self, ConfigResolved};
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?;
    write_resolved(&resolved, out)
}

fn write_resolved(resolved: &ConfigResolved, out: &mut dyn Write) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "ante": { "value": config.ante, "source": sources.ante },
        "starting_stack": { "value": config.starting_stack, "source": sources.starting_stack },
        "bet_size": { "value": config.bet_size, "source": sources.bet_size },
        "seed": { "value": config.seed, "source": sources.seed },
        "ai": { "value": config.ai, "source": sources.ai },
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
