// Draftboard entry point.
//
// 1. Parse arguments
// 2. Initialize tracing (log file, or stderr with --verbose)
// 3. Load config once
// 4. Dispatch the command

mod cli;
mod commands;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base_dir = match &cli.base_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    init_tracing(&base_dir, cli.verbose)?;
    info!("draftboard starting up");

    let config = commands::load_config(&base_dir)?;
    if let Err(e) = commands::run(&cli.command, &config) {
        error!("command failed: {e:#}");
        return Err(e);
    }

    info!("draftboard finished");
    Ok(())
}

fn init_tracing(base_dir: &Path, verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("draftboard=info,warn"));

    if verbose {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true)
            .finish();
        return tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber");
    }

    let log_file = open_log_file(base_dir)?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    Ok(())
}

/// Create `logs/draftboard.log` under `base_dir`, truncating any previous run.
fn open_log_file(base_dir: &Path) -> anyhow::Result<std::fs::File> {
    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("draftboard.log");
    std::fs::File::create(&log_path).with_context(|| format!("failed to create log file {}", log_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_under_logs() {
        let tmp = tempfile::tempdir().unwrap();
        open_log_file(tmp.path()).unwrap();
        assert!(tmp.path().join("logs").join("draftboard.log").is_file());
    }

    #[test]
    fn log_directory_failure_names_the_path() {
        let tmp = tempfile::tempdir().unwrap();
        let not_a_dir = tmp.path().join("base");
        std::fs::write(&not_a_dir, "").unwrap();

        let err = open_log_file(&not_a_dir).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to create log directory"));
        assert!(message.contains("logs"));
    }
}
