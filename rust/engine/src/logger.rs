use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cards::Card;
use crate::game::{GameState, WinMethod};
use crate::player::{Action, Seat};

/// A single action taken during a hand.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: Seat,
    pub action: Action,
}

/// Complete record of a finished hand, written as one JSON line.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Format: YYYYMMDD-NNNNNN
    pub hand_id: String,
    /// Seed of the dealer that produced the hand
    pub seed: Option<u64>,
    /// Cards indexed by seat (first, second)
    pub cards: [Card; 2],
    pub actions: Vec<ActionRecord>,
    pub winner: Seat,
    pub by: WinMethod,
    /// Chips the winner collected
    pub pot: u32,
    /// RFC 3339, filled in by [`HandLogger::write`] when missing
    #[serde(default)]
    pub ts: Option<String>,
}

impl HandRecord {
    /// Builds a record from a finished hand. Returns `None` while the hand is still
    /// in progress.
    pub fn from_state(hand_id: String, seed: Option<u64>, state: &GameState) -> Option<Self> {
        let outcome = state.outcome()?;
        Some(Self {
            hand_id,
            seed,
            cards: state.cards(),
            actions: state
                .history()
                .iter()
                .map(|&(seat, action)| ActionRecord { seat, action })
                .collect(),
            winner: outcome.winner,
            by: outcome.by,
            pot: outcome.pot,
            ts: None,
        })
    }
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Appends [`HandRecord`]s to a JSONL file.
pub struct HandLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger that only hands out ids; `write` is a no-op.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
