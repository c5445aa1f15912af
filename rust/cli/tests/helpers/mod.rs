//! Shared helpers for the CLI integration tests.
//!
//! `CliRunner` spawns the built `kuhn` binary in a scratch directory with a clean
//! `KUHN_*` environment; `TempFileManager` hands out paths that are removed on drop.

pub mod cli_runner;
pub mod temp_files;
