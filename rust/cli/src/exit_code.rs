//! Process exit codes returned by [`run`](crate::run).

pub const SUCCESS: i32 = 0;

/// Usage errors and every [`CliError`](crate::CliError).
pub const ERROR: i32 = 2;
