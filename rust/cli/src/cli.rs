//! Command-line grammar for the `kuhn` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kuhn", version, about = "Kuhn Poker on the command line")]
pub struct KuhnCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play hands against the AI, reading actions from stdin
    Play {
        #[arg(long, default_value_t = 1)]
        hands: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Let two AIs play each other and report the results
    Sim {
        #[arg(long)]
        hands: u64,
        #[arg(long)]
        seed: Option<u64>,
        /// Write one JSON hand record per line to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Deal a single hand and print both cards
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the resolved configuration and where each value came from
    Cfg,
}

pub const COMMANDS: &[&str] = &["play", "sim", "deal", "cfg"];
