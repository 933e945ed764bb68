mod script;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use viewport::ViewportConfig;
use viewport::headless::HeadlessProvider;
use viewport::render::SurfaceSize;

use crate::script::{Script, ScriptError, Session};

const DEMO_SCRIPT: &str = include_str!("../demos/showroom.json");

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {path}: {source}")]
    Config { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("failed to encode report: {0}")]
    Report(serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "scenedeck", about = "Replay scene viewport sessions against a headless render engine")]
struct Cli {
    /// JSON viewport config. Without it, `VIEWPORT_*` variables apply.
    #[arg(long, env = "SCENEDECK_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "SCENEDECK_WIDTH", default_value_t = 800)]
    width: u32,

    #[arg(long, env = "SCENEDECK_HEIGHT", default_value_t = 600)]
    height: u32,

    /// Refuse the render context with this reason, to exercise the fallback path.
    #[arg(long, env = "SCENEDECK_UNAVAILABLE")]
    unavailable: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session script and print the final report.
    Replay { script: PathBuf },
    /// Replay the bundled showroom session.
    Demo,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "ignoring unreadable .env"),
    }

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ViewportConfig::from_env(),
    };
    let script = match &cli.command {
        Command::Replay { script } => Script::parse(&read(script)?)?,
        Command::Demo => Script::parse(DEMO_SCRIPT)?,
    };
    let provider = match cli.unavailable {
        Some(reason) => HeadlessProvider::unavailable(reason),
        None => HeadlessProvider::new(),
    };

    let mut session = Session::new(config, provider, SurfaceSize::new(cli.width, cli.height));
    session.run(&script)?;
    if let Some(text) = session.viewport().fallback_text() {
        warn!(%text, "viewport fell back");
    }
    let report = serde_json::to_string_pretty(&session.report()).map_err(CliError::Report)?;
    println!("{report}");
    Ok(())
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn load_config(path: &Path) -> Result<ViewportConfig, CliError> {
    serde_json::from_str(&read(path)?).map_err(|source| CliError::Config { path: path.to_owned(), source })
}
