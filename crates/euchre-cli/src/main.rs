use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use clap::Parser;
use euchre_cli::{HttpApi, Orchestrator, Pacing, TerminalInput};
use log::{info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger,
};

/// Play euchre in the terminal against the bots on a euchre server
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long, default_value = "http://127.0.0.1:4000")]
    server: String,

    /// Milliseconds before each bot bids or plays
    #[clap(long, default_value_t = 600)]
    bot_delay: u64,

    /// Milliseconds to show a finished trick
    #[clap(long, default_value_t = 900)]
    trick_pause: u64,

    /// Milliseconds before a hand is scored
    #[clap(long, default_value_t = 1200)]
    round_pause: u64,

    #[clap(long, default_value = "euchre-cli.log")]
    log_file: PathBuf,

    #[clap(short = 'v', long, action, default_value_t = 0)]
    verbosity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity, &args.log_file)?;

    let pacing = Pacing {
        bot_delay: Duration::from_millis(args.bot_delay),
        trick_pause: Duration::from_millis(args.trick_pause),
        round_pause: Duration::from_millis(args.round_pause),
    };
    info!("connecting to {}", args.server);

    let mut orchestrator = Orchestrator::new(HttpApi::new(&args.server), TerminalInput, pacing);
    let outcomes = orchestrator.run().await?;
    let won = outcomes
        .iter()
        .filter(|o| o.winner == euchre::Seat::Player.team())
        .count();
    println!("You won {} of {} games", won, outcomes.len());

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
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Debug, config, file),
    ])?;

    Ok(())
}
