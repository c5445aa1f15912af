//! # Kuhn Poker CLI
//!
//! Offline tools around the Kuhn engine: an interactive game against the AI, an
//! AI-versus-AI simulator that can record hands as JSON lines, a single deal for
//! inspection, and a dump of the resolved configuration.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["kuhn", "sim", "--hands", "100", "--seed", "7"];
//! let code = kuhn_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use clap::Parser;
use std::io::{BufRead, Write};

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod ui;
pub mod validation;

use cli::{Commands, KuhnCli, COMMANDS};
use commands::{
    handle_cfg_command, handle_deal_command, handle_play_command, handle_sim_command,
};

pub use error::CliError;

/// Parses `args` and runs the selected command with stdin as the player's input.
///
/// Returns [`exit_code::SUCCESS`] or [`exit_code::ERROR`].
///
/// ```
/// use std::io;
/// let args = vec!["kuhn", "deal", "--seed", "42"];
/// let code = kuhn_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with_input(args, &mut stdin_lock, out, err)
}

/// Same as [`run`] with `input` in place of stdin.
pub fn run_with_input<I, S>(
    args: I,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match KuhnCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_usage(e, out, err),
    };

    match dispatch(cli.cmd, input, out, err) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn dispatch(
    cmd: Commands,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    match cmd {
        Commands::Cfg => handle_cfg_command(out),
        Commands::Play { hands, seed } => {
            let config = config::load()?;
            handle_play_command(hands, seed, &config, out, err, input)
        }
        Commands::Sim {
            hands,
            seed,
            output,
        } => {
            let config = config::load()?;
            handle_sim_command(hands, seed, output.as_deref(), &config, out, err)
        }
        Commands::Deal { seed } => {
            let config = config::load()?;
            handle_deal_command(seed, &config, out)
        }
    }
}

fn report_usage(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version go to stdout and succeed
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }

    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Kuhn Poker CLI");
    let _ = writeln!(err, "Usage: kuhn <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: kuhn --help");
    exit_code::ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_captured(args: &[&str], input: &str) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let code = run_with_input(args, &mut input, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, out, err) = run_captured(&["kuhn", "--help"], "");
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("sim"));
        assert!(err.is_empty());
    }

    #[test]
    fn unknown_command_lists_commands() {
        let (code, _, err) = run_captured(&["kuhn", "bench"], "");
        assert_eq!(code, exit_code::ERROR);
        for c in COMMANDS {
            assert!(err.contains(c), "missing {c} in {err}");
        }
    }

    #[test]
    fn command_errors_exit_with_error_code() {
        let (code, _, err) = run_captured(&["kuhn", "sim", "--hands", "0"], "");
        assert_eq!(code, exit_code::ERROR);
        assert!(err.starts_with("Error: "), "{err}");
    }
}
