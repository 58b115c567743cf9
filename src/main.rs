mod cli;
mod error;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result, fatal};
use clap::{CommandFactory, Parser};
use ifs_config::Settings;
use ifs_engine::{
    ExecuteOptions, ExternalEditor, Scanner, Session, SessionOptions, Source, TerminalConsole, default_workers,
};
use ifs_extensions::Selection;
use ifs_index::{FileIndex, Pipeline};
use ifs_storage::BackendHandle;
use ifs_storage::backend::{LocalBackend, SimulatedBackend};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: u8) {
    let level = match i16::from(verbose) - i16::from(quiet) {
        ..=-2 => Level::ERROR,
        -1 => Level::WARN,
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Usage goes to stdout and, like a bad invocation, ends with status 1.
fn usage() -> ExitCode {
    let _ = Cli::command().print_long_help();
    ExitCode::from(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.help {
        return usage();
    }
    init_tracing(cli.verbose, cli.quiet);
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "Fatal error");
            eprintln!("ERROR: {}", *err);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load(cli.config.as_deref()).map_err(|err| fatal(err, ErrorKind::Config))?;
    cli.apply(&mut settings);
    let index_settings = settings.index_settings().map_err(|err| fatal(err, ErrorKind::Config))?;

    let mut extensions = Vec::new();
    for argument in &cli.extensions {
        match ifs_extensions::select(argument).map_err(|err| fatal(err, ErrorKind::Extension))? {
            Selection::Use(extension) => extensions.push(extension),
            Selection::Help(text) => {
                print!("{text}");
                return Ok(ExitCode::from(1));
            },
        }
    }
    if !cli.has_sources() {
        return Ok(usage());
    }

    let local: BackendHandle = Arc::new(LocalBackend::new("local"));
    let backend: BackendHandle = if settings.simulate {
        tracing::info!("Simulation mode: file operations are only logged");
        Arc::new(SimulatedBackend::new(local))
    } else {
        local
    };
    let index = Arc::new(Mutex::new(FileIndex::new(backend, Pipeline::new(extensions), index_settings)));

    let sources: Vec<Source> = cli
        .nonrecursive
        .iter()
        .map(Source::single_level)
        .chain(cli.directories.iter().map(Source::recursive))
        .collect();
    let scanner = Scanner::new(settings.workers.unwrap_or_else(default_workers))
        .with_directories(settings.include_directories);
    scanner.scan(&index, &sources).await;

    let editor = settings.editor.clone().map(ExternalEditor::new).unwrap_or_else(ExternalEditor::from_env);
    let console = TerminalConsole::new();
    let options = SessionOptions {
        multistage: settings.multistage,
        execute: ExecuteOptions {
            prompt: settings.prompt,
            allow_overwriting: settings.allow_overwriting,
            create_directories: settings.create_directories,
        },
    };
    let mut index = index.lock().await;
    let summary = Session::new(&console, &editor, options)
        .run(&mut index)
        .await
        .map_err(|err| fatal(err, ErrorKind::Session))?;
    tracing::info!(rounds = summary.rounds, applied = summary.applied, pending = summary.pending, "Done");
    Ok(ExitCode::SUCCESS)
}
