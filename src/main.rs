use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};

use rxcode::api::rest::RestApi;
use rxcode::config::load_config;
use rxcode::service::PrescriptionService;
use rxcode::storage::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let config = load_config(&config_path)?;

    rxcode::log::init(&config.log);

    let service = PrescriptionService::new(Arc::new(MemoryStore::new()))
        .with_letter_keys(config.qr.letter_keys()?)
        .with_clock(config.display.clock()?)
        .with_scan_base_url(config.qr.scan_base_url.clone());
    let api = RestApi::new(Arc::new(service));

    let host: IpAddr = config.api.host.parse()?;
    let addr = SocketAddr::new(host, config.api.port);
    info!(%addr, config = %config_path.display(), "Starting rxcode");

    // Create a channel for shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let (bound, server) = warp::serve(api.routes())
        .try_bind_with_graceful_shutdown(addr, async move {
            shutdown_rx.await.ok();
            info!("Shutting down server");
        })?;
    info!(addr = %bound, "Listening");

    let server_handle = tokio::spawn(server);

    signal::ctrl_c().await?;
    info!("Ctrl+C received, starting graceful shutdown");
    shutdown_tx.send(()).ok();

    if let Err(err) = server_handle.await {
        error!(error = %err, "Server task failed");
        return Err(err.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
