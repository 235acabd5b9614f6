//! flagsync — keep a local env file synchronized with remotely-managed flag
//! values.
//!
//! # Usage
//!
//! ```text
//! flagsync            # run the daemon until ctrl-c
//! flagsync --once     # one build→backup→write cycle, then exit
//! ```
//!
//! Configuration comes from the environment: `CREDENTIAL` (required),
//! `FLAG_KEYS`, `TARGET_FILE_PATH`, `BACKUP_ENABLED`, `LOG_LEVEL`,
//! `DEBOUNCE_MS`, `CONTEXT_KEY`, `CONTEXT_NAME`, `FLAG_SOURCE_PATH`.
//!
//! Exit codes: 0 on clean shutdown, 2 on a configuration error, 1 on a
//! failed connect or failed initial write.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use flagsync_core::{DaemonConfig, EvaluationClient};
use flagsync_daemon::{init_tracing, start_blocking, FileSource};
use flagsync_sync::cycle;

#[derive(Parser, Debug)]
#[command(
    name = "flagsync",
    version,
    about = "Sync remotely-managed feature flag values into a local env file",
    long_about = None,
)]
struct Cli {
    /// Run a single sync cycle and exit instead of staying resident.
    #[arg(long)]
    once: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match DaemonConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::from(2);
        }
    };
    init_tracing(&config.log_level);

    // The bundled file source stands in for the remote platform; a networked
    // client is a drop-in `EvaluationClient` implementation that would take
    // `config.credential` here.
    let client = match FileSource::connect(&config.source_path) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::error!(error = %err, "failed to connect flag source");
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.once {
        run_once(&config, &client)
    } else {
        start_blocking(config, client).context("daemon exited with error")
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "flagsync failed");
            ExitCode::FAILURE
        }
    }
}

fn run_once(config: &DaemonConfig, client: &Arc<FileSource>) -> anyhow::Result<()> {
    let outcome = cycle::run(
        &config.flag_keys,
        client.as_ref(),
        &config.context,
        &config.target_path,
        config.backup_enabled,
    )
    .with_context(|| format!("sync cycle failed for {}", config.target_path.display()))?;

    match &outcome.backup_path {
        Some(backup) => println!(
            "✓ wrote {} ({} keys, backed up to {})",
            config.target_path.display(),
            outcome.snapshot.len(),
            backup.display()
        ),
        None => println!(
            "✓ wrote {} ({} keys)",
            config.target_path.display(),
            outcome.snapshot.len()
        ),
    }

    client.close();
    Ok(())
}
