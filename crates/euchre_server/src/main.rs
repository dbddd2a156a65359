use std::{fs::OpenOptions, path::PathBuf};

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{bail, Context};
use clap::Parser;
use euchre_server::{configure, AppState};
use log::{info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger,
};

/// Serve euchre games against the bot over http
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: String,

    #[clap(short, long, default_value_t = 4000)]
    port: u16,

    /// Seed for reproducible deals
    #[clap(long)]
    seed: Option<u64>,

    #[clap(long, default_value = "euchre-server.log")]
    log_file: PathBuf,

    #[clap(short = 'v', long, action, default_value_t = 2)]
    verbosity: usize,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let app_state = web::Data::new(AppState::new(args.seed));

    info!("listening on {}:{}", args.host, args.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind((args.host.as_str(), args.port))
    .with_context(|| format!("failed to bind {}:{}", args.host, args.port))?
    .run()
    .await?;

    Ok(())
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let term_logger_level = match args.verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        4 => LevelFilter::Trace,
        _ => bail!(
            "invalid log level: {}, must be between 0 and 4",
            args.verbosity
        ),
    };

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&args.log_file)
        .with_context(|| format!("failed to open log file {}", args.log_file.display()))?;

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
