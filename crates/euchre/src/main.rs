use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use euchre::{
    cards::Suit,
    simulation::{hand_score, Simulator},
    trace::{TraceConfig, TraceWriter},
};
use log::{info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger,
};

use crate::scripts::{
    config::run_profile,
    forced_ev::{parse_hand, run_forced_ev, ForcedEvArgs},
};

pub mod scripts;

#[derive(Debug, Subcommand, Clone)]
enum Commands {
    /// Bot-only hands, reporting call, loner and scoring rates by seat
    Simulate {
        #[clap(short = 'n', long, default_value_t = 1000)]
        hands: usize,
    },
    /// Break a hand's bidding score into its components
    HandScore {
        /// Comma separated cards, e.g. "Ad,Ah,Js,Jd,Jh"
        hand: String,
        #[clap(long, value_enum)]
        trump: Option<Suit>,
    },
    /// Expected value of forcing one seat's bidding decision
    ForcedEv(ForcedEvArgs),
    /// Run a named forced EV profile from the config file
    Profile {
        profile: String,
        #[clap(long, default_value = "./Sim.toml")]
        config: PathBuf,
    },
}

/// Monte Carlo tools for tuning the euchre bot
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Seed for reproducible runs
    #[clap(long)]
    seed: Option<u64>,

    /// Append a JSON line per simulated hand to this file
    #[clap(long)]
    trace: Option<PathBuf>,

    #[clap(long, default_value_t = false)]
    flush_each_hand: bool,

    #[clap(long, default_value = "euchre-sim.log")]
    log_file: PathBuf,

    #[clap(short = 'v', long, action, default_value_t = 1)]
    verbosity: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity, &args.log_file)?;

    let trace = TraceConfig {
        enabled: args.trace.is_some(),
        path: args.trace.clone().unwrap_or_default(),
        flush_each_hand: args.flush_each_hand,
    };

    match args.command {
        Commands::Simulate { hands } => {
            let mut sim = Simulator::new(args.seed).with_trace(TraceWriter::new(trace)?);
            info!("simulating {} hands", hands);
            let stats = sim.run(hands)?;
            print!("{}", stats);
        }
        Commands::HandScore { hand, trump } => {
            let hand = parse_hand(&hand)?;
            print!("{}", hand_score(&hand, trump));
        }
        Commands::ForcedEv(forced) => {
            let mut sim = Simulator::new(args.seed).with_trace(TraceWriter::new(trace)?);
            run_forced_ev(&mut sim, &forced)?;
        }
        Commands::Profile { profile, config } => {
            let cli_trace = trace.enabled.then_some(trace);
            run_profile(&config, &profile, args.seed, cli_trace)?;
        }
    }

    Ok(())
}

fn init_logging(verbosity: usize, log_file: &Path) -> anyhow::Result<()> {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let term_logger_level = match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        4 => LevelFilter::Trace,
        _ => bail!("invalid log level: {}, must be between 0 and 4", verbosity),
    };

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            term_logger_level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, config, file),
    ])?;

    Ok(())
}
