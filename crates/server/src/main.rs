mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use magnetwatch_core::{
    load_config, validate_config, ApibaySearcher, DownloadClient, JsonMonitorStore, LogNotifier,
    LoggingConfig, MonitorOrchestrator, MonitorScheduler, MonitorStore, Notifier,
    ResultDispatcher, SearchProvider, TransmissionClient,
};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be installed yet when config loading fails.
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("MAGNETWATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);
    info!("Configuration loaded from {:?}", config_path);

    // Monitor store
    let store: Arc<dyn MonitorStore> = Arc::new(
        JsonMonitorStore::open(&config.store.path).with_context(|| {
            format!("Failed to open monitor store at {:?}", config.store.path)
        })?,
    );
    info!(path = %config.store.path.display(), "Monitor store opened");

    // Search index
    let searcher: Arc<dyn SearchProvider> = Arc::new(
        ApibaySearcher::new(config.searcher.clone()).context("Failed to create searcher")?,
    );
    info!(url = %config.searcher.url, "Searcher initialized");

    // Download backend, if configured
    let dispatcher = match &config.download {
        Some(download_config) => {
            info!(url = %download_config.url, "Initializing Transmission client");
            let download: Arc<dyn DownloadClient> = Arc::new(
                TransmissionClient::new(download_config.clone())
                    .context("Failed to create download client")?,
            );
            let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
            Some(Arc::new(ResultDispatcher::new(
                download,
                notifier,
                config.searcher.trackers.clone(),
            )))
        }
        None => {
            info!("No download backend configured, results will only be logged");
            None
        }
    };

    let orchestrator = Arc::new(MonitorOrchestrator::new(
        config.orchestrator.clone(),
        store,
        searcher,
    ));
    let scheduler = Arc::new(MonitorScheduler::new(
        Arc::clone(&orchestrator),
        dispatcher.clone(),
    ));
    scheduler.start().await;

    let state = Arc::new(AppState::new(
        orchestrator,
        dispatcher,
        Arc::clone(&scheduler),
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    scheduler.stop().await;
    info!("Scheduler stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
