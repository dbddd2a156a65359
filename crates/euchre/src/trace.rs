//! JSON lines trace of simulated hands, one object per hand.

use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bot::BidRound,
    cards::Card,
    rules::PlayedCard,
    simulation::ForcedAction,
    table::{Bid, TrumpSummary},
    Seat, Team,
};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to write trace: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize trace record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_trace_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub flush_each_hand: bool,
}

fn default_trace_path() -> PathBuf {
    PathBuf::from("simulation_trace.jsonl")
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_trace_path(),
            flush_each_hand: false,
        }
    }
}

/// The forced decision a traced hand was played under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTrace {
    pub controlled: Seat,
    pub controlled_team: Team,
    pub forced_round: BidRound,
    pub forced_action: ForcedAction,
    pub forced_alone: bool,
    pub forced_lead: Option<Card>,
    pub forced_lead_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickTrace {
    pub trick: usize,
    pub lead_player: Seat,
    pub plays: Vec<PlayedCard>,
    pub winner: Seat,
    pub tricks_won: [u8; 2],
    pub hands_after: BTreeMap<Seat, Vec<Card>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalTally {
    pub tricks_won: [u8; 2],
    pub points: [u8; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandTrace {
    pub ts: DateTime<Utc>,
    pub sim_idx: usize,
    pub dealer: Seat,
    pub up_card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioTrace>,
    pub bids: Vec<Bid>,
    pub trump_selection: Option<TrumpSummary>,
    pub initial_play_order: Vec<Seat>,
    pub initial_hands: BTreeMap<Seat, Vec<Card>>,
    pub tricks: Vec<TrickTrace>,
    #[serde(rename = "final")]
    pub tally: Option<FinalTally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_ev: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HandTrace {
    pub fn new(sim_idx: usize, dealer: Seat, up_card: Option<Card>) -> Self {
        Self {
            ts: Utc::now(),
            sim_idx,
            dealer,
            up_card,
            scenario: None,
            bids: Vec::new(),
            trump_selection: None,
            initial_play_order: Vec::new(),
            initial_hands: BTreeMap::new(),
            tricks: Vec::new(),
            tally: None,
            net_ev: None,
            note: None,
        }
    }
}

/// Appends [`HandTrace`] records to a file. Does nothing when disabled.
#[derive(Debug)]
pub struct TraceWriter {
    config: TraceConfig,
    out: Option<BufWriter<File>>,
}

impl TraceWriter {
    pub fn new(config: TraceConfig) -> Result<Self, TraceError> {
        let out = if config.enabled {
            Some(BufWriter::new(open_append(&config.path)?))
        } else {
            None
        };
        Ok(Self { config, out })
    }

    pub fn disabled() -> Self {
        Self {
            config: TraceConfig::default(),
            out: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.out.is_some()
    }

    pub fn log_hand(&mut self, record: &HandTrace) -> Result<(), TraceError> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };

        serde_json::to_writer(&mut *out, record)?;
        out.write_all(b"\n")?;
        if self.config.flush_each_hand {
            out.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), TraceError> {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().append(true).create(true).open(path)
}
