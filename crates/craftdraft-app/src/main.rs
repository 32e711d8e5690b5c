//! Command-line entry point: replay a recorded session and print the result.

use clap::Parser;
use craftdraft_app::{AppConfig, Session, SessionError, SessionReport, ShortcutRegistry};
use craftdraft_core::ConfigError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "craftdraft")]
#[command(about = "Replay CraftDraft input sessions against the drafting engine")]
struct Cli {
    /// Session script (JSON) to replay
    #[arg(required_unless_present = "shortcuts")]
    script: Option<PathBuf>,

    /// Config file; falls back to $CRAFTDRAFT_CONFIG, then defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,

    /// List keyboard shortcuts and exit
    #[arg(long)]
    shortcuts: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("craftdraft: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    if cli.shortcuts {
        ShortcutRegistry::print_all();
        return Ok(());
    }
    let Some(script) = cli.script.as_deref() else {
        return Ok(());
    };

    log::info!("Replaying {}", script.display());
    let session = Session::from_file(script)?;
    let report = session.replay(&config.engine);
    for warning in &report.warnings {
        log::warn!("{}: {} ({})", warning.title, warning.message, warning.code);
    }
    emit(&report, cli.output.as_deref(), cli.pretty)
}

fn emit(report: &SessionReport, output: Option<&Path>, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    match output {
        Some(path) => std::fs::write(path, json).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
