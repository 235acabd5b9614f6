//! Daemon runtime — the sync orchestrator lifecycle.
//!
//! connect (caller) → initial sync → subscribe → debounced resync loop →
//! shutdown. Cycles execute one at a time on the blocking pool; the trigger
//! channel's single consumer guarantees no two resyncs ever overlap, and a
//! notification arriving mid-resync schedules a future resync instead of
//! being dropped.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::Instant;

use flagsync_core::{DaemonConfig, EvaluationClient};
use flagsync_sync::{cycle, CycleOutcome};

use crate::debounce::Debouncer;
use crate::error::{io_err, DaemonError};

/// Build a multi-thread runtime, install the ctrl-c handler, and run the
/// daemon until shutdown. Blocks the current thread.
pub fn start_blocking<C: EvaluationClient + 'static>(
    config: DaemonConfig,
    client: Arc<C>,
) -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(16);
        spawn_signal_handler(shutdown_tx);
        run(config, client, shutdown_rx).await
    })
}

/// Forward ctrl-c to the shutdown channel.
pub fn spawn_signal_handler(shutdown: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown.subscribe();
        tokio::select! {
            _ = shutdown_rx.recv() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::info!("received ctrl-c, shutting down daemon");
                    let _ = shutdown.send(());
                }
                Err(err) => tracing::error!(error = %err, "ctrl-c handler failed"),
            },
        }
    });
}

/// Run the daemon lifecycle until `shutdown_rx` fires.
///
/// The caller has already connected `client` (a failed connect is fatal
/// before this point). A failed *initial* write returns
/// [`DaemonError::InitialSync`]; a failed steady-state resync is logged and
/// the daemon stays alive, converging again on the next triggered change.
pub async fn run<C: EvaluationClient + 'static>(
    config: DaemonConfig,
    client: Arc<C>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    tracing::info!(
        target = %config.target_path.display(),
        keys = config.flag_keys.len(),
        "performing initial flag evaluation and env sync",
    );

    if let Err(err) = run_cycle(&config, client.clone()).await {
        client.close();
        return Err(match err {
            DaemonError::Sync(source) => DaemonError::InitialSync(source),
            other => other,
        });
    }

    let (debouncer, mut trigger_rx) = Debouncer::spawn(config.debounce_window);
    let notifier = debouncer.notifier();
    client.subscribe(Box::new(move |notification| {
        let _ = notifier.send(notification);
    }));
    tracing::info!(
        window_ms = config.debounce_window.as_millis() as u64,
        "subscribed to flag changes",
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_trigger = trigger_rx.recv() => {
                let Some(()) = maybe_trigger else { break };
                let started = Instant::now();
                // The await here means a shutdown signal lets an in-flight
                // cycle finish rather than interrupting it mid-write.
                match run_cycle(&config, client.clone()).await {
                    Ok(outcome) => {
                        tracing::info!(
                            target = %config.target_path.display(),
                            keys = outcome.snapshot.len(),
                            backed_up = outcome.backup_path.is_some(),
                            duration_ms = started.elapsed().as_millis() as u64,
                            "resync completed",
                        );
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            "resync failed; daemon stays alive and retries on the next change",
                        );
                    }
                }
            }
        }
    }

    // Dropping the debouncer cancels any pending debounce window.
    drop(debouncer);
    client.close();
    tracing::info!("shutdown complete");
    Ok(())
}

async fn run_cycle<C: EvaluationClient + 'static>(
    config: &DaemonConfig,
    client: Arc<C>,
) -> Result<CycleOutcome, DaemonError> {
    let keys = config.flag_keys.clone();
    let context = config.context.clone();
    let target = config.target_path.clone();
    let backup_enabled = config.backup_enabled;

    tokio::task::spawn_blocking(move || {
        cycle::run(&keys, client.as_ref(), &context, &target, backup_enabled)
    })
    .await
    .map_err(|err| DaemonError::Runtime(format!("sync task join error: {err}")))?
    .map_err(DaemonError::Sync)
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured `LOG_LEVEL` seeds the
/// filter. `WARNING` and `CRITICAL` are accepted as aliases for `warn` and
/// `error`.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = normalize_level(level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn normalize_level(level: &str) -> String {
    match level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" => "error".to_string(),
        other => other.to_string(),
    }
}
