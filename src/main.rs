//! Cache Facade startup probe
//!
//! Connects to the configured store, checks it answers PING and reports how
//! many keys live under the configured prefix. Exits non-zero on failure so
//! it can gate service start-up.

use anyhow::{bail, Context};
use tokio::signal;
use tracing::{info, warn};

use cache_facade::{logging, Cache, CallContext, Config};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the backing store
/// 4. Ping and list the namespace, abandoning the calls on Ctrl+C/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing().context("failed to install tracing subscriber")?;

    let config = Config::from_env();
    info!(
        "Configuration loaded: target={}, prefix={:?}, default_ttl={:?}, scan_count={}",
        config.target(),
        config.prefix,
        config.default_ttl(),
        config.scan_count
    );

    let cache = Cache::connect(&config)
        .await
        .with_context(|| format!("cannot connect to {}", config.target()))?;

    let ctx = CallContext::with_timeout(config.connect_timeout());
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown requested, abandoning probe");
        interrupt.cancel();
    });

    if !cache.ping(&ctx).await {
        bail!("store at {} did not answer PING", config.target());
    }

    let names = cache
        .namespace_keys(&ctx)
        .await
        .context("failed to enumerate keys")?;
    info!(
        prefix = %config.prefix,
        keys = names.len(),
        "Store reachable"
    );

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
