mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use jautmem_core::AgentMemory;
use jautmem_storage::paths;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error::handle_error(err);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = paths::resolve_root_dir(cli.root.as_deref())?;
    let _guard = init_logging(&root, cli.verbose, cli.log_file)?;

    let memory = AgentMemory::open(&root)?;
    commands::run(&memory, cli.command, cli.format)
}

/// Logs go to stderr; `--log-file` adds a daily rolling file under the root.
fn init_logging(root: &Path, verbose: bool, log_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = if log_file {
        let file_appender = tracing_appender::rolling::daily(paths::logs_dir(root)?, "jautmem.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(false)
            .with_level(true);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
