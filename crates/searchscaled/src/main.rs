//! searchscaled — the search scaler daemon.
//!
//! Single binary that serves:
//! - the KEDA external scaler gRPC service
//! - `/liveness` and `/readiness` over plain HTTP on a second port
//!
//! # Usage
//!
//! ```text
//! ES_URL=https://opensearch:9200 ES_USERNAME=admin ES_PASSWORD=... \
//!     searchscaled --grpc-port 6000 --health-port 8080
//! ```

mod serve;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use searchscale_query::{StoreClient, StoreConfig};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,searchscaled=debug,searchscale_query=debug,searchscale_scaler=debug,searchscale_health=debug";

#[derive(Parser, Debug)]
#[command(name = "searchscaled", about = "KEDA external scaler backed by search templates")]
struct Cli {
    /// Port for the external scaler gRPC service.
    #[arg(long, default_value = "6000")]
    grpc_port: u16,

    /// Port for the liveness/readiness HTTP endpoints.
    #[arg(long, default_value = "8080")]
    health_port: u16,

    /// TOML file with a `[store]` table. Overrides the store flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Document store base URL.
    #[arg(long, env = "ES_URL", default_value = "")]
    store_url: String,

    #[arg(long, env = "ES_USERNAME", default_value = "")]
    store_username: String,

    #[arg(long, env = "ES_PASSWORD", default_value = "", hide_env_values = true)]
    store_password: String,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn store_config(&self) -> anyhow::Result<StoreConfig> {
        match &self.config {
            Some(path) => StoreConfig::from_file(path),
            None => Ok(StoreConfig::new(
                self.store_url.clone(),
                self.store_username.clone(),
                self.store_password.clone(),
            )),
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    info!("search scaler starting");

    let config = cli.store_config()?;
    if config.url.is_empty() {
        warn!("no document store URL configured; every query will fail");
    }
    info!(url = %config.url, user = %config.username, "document store configured");
    let store = StoreClient::new(config)?;

    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], cli.grpc_port));
    let health_addr = SocketAddr::from(([0, 0, 0, 0], cli.health_port));
    let listeners = serve::Listeners::bind(grpc_addr, health_addr).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        serve::shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    serve::serve(listeners, store, shutdown_rx).await?;

    info!("search scaler stopped");
    Ok(())
}
