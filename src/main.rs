use std::sync::Arc;

use bridge_relayer::{api, claims::ClaimStore, config::Config, networks, MultiChainRelayer};

fn main() -> eyre::Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    // Run the async main
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    // Initialize logging
    init_logging();

    tracing::info!("Starting bridge relayer");

    // Load configuration and the static network registry
    let config = Config::load()?;
    let registry = Arc::new(networks::load_from_env()?);
    tracing::info!(
        networks = registry.len(),
        claims_file = %config.claims_file,
        "Configuration loaded"
    );

    // Open the shared claim store
    let store = Arc::new(ClaimStore::load(&config.claims_file));
    let stats = store.stats();
    tracing::info!(
        users = stats.users,
        claims = stats.total_claims,
        unclaimed = stats.unclaimed_claims,
        "Claim store loaded"
    );

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    // Setup signal handlers
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    // Spawn one relayer per configured network
    let coordinator = MultiChainRelayer::new(&config, Arc::clone(&registry), Arc::clone(&store))?;

    // Start metrics/API server
    let api_addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let api_store = Arc::clone(&store);
    tokio::spawn(async move {
        if let Err(e) = api::start_api_server(api_addr, api_store).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Run until a shutdown signal triggers the coordinated stop
    coordinator.run(shutdown_rx).await?;

    tracing::info!("Bridge relayer stopped");
    Ok(())
}

/// Initialize tracing/logging with structured output
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bridge_relayer=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM)
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
