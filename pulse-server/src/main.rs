use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pulse_server::config::{Config, SourceConfig};
use pulse_server::hub::Hub;
use pulse_server::poller::{Poller, SnapshotStore};
use pulse_server::tfl::{FixtureClient, TflClient, TflConfig, Upstream};
use pulse_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pulse_server=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let upstream = match &config.source {
        SourceConfig::Live { api_key } => {
            let tfl_config = TflConfig::new(api_key)
                .with_base_url(&config.base_url)
                .with_line(&config.line);
            Upstream::Live(TflClient::new(tfl_config)?)
        }
        SourceConfig::Fixture { path } => {
            info!(path = %path.display(), "serving predictions from fixture");
            Upstream::Fixture(FixtureClient::new(path)?)
        }
    };

    let store = SnapshotStore::new();
    let hub = Arc::new(Hub::new(store.clone()));
    let poller = Poller::new(
        upstream.clone(),
        store.clone(),
        Arc::clone(&hub),
        config.poll_interval,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = tokio::spawn(poller.run(shutdown_rx.clone()));

    let shutdown_hub = Arc::clone(&hub);
    let app = create_router(AppState::new(upstream, store, hub));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.listen_addr))?;

    info!(line = %config.line, "listening on http://{}", config.listen_addr);
    info!("  GET /api/trains      - current snapshot");
    info!("  GET /api/predictions - raw predictions (on demand)");
    info!("  GET /api/status      - poller and hub status");
    info!("  GET /ws              - live snapshot pushes");

    let mut server_shutdown = shutdown_rx;
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = server_shutdown.wait_for(|stop| *stop).await;
    });

    let shutdown_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutting down"),
            Err(e) => {
                // Without a signal handler, keep running until killed.
                error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
        let _ = shutdown_tx.send(true);

        // Once the poller has stopped nothing broadcasts again, so closing
        // the hub lets every WebSocket send its Close frame.
        if let Err(e) = poller_task.await {
            error!(error = %e, "poller task failed");
        }
        shutdown_hub.close_all().await;
    });

    server.await?;
    shutdown_task.await?;
    Ok(())
}
