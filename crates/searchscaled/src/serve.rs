//! Listener setup and the two servers.
//!
//! Both ports are bound before anything is served so that a bind failure
//! aborts startup. The gRPC scaler and the health router then run side by
//! side until the shutdown channel flips to `true`, which also ends every
//! open `StreamIsActive` session.

use std::net::SocketAddr;

use anyhow::Context;
use searchscale_query::{HttpSignalSource, StoreClient};
use searchscale_scaler::ScalerServer;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{error, info};

/// The two bound listeners.
pub struct Listeners {
    grpc: TcpListener,
    health: TcpListener,
}

impl Listeners {
    /// Bind both ports. Either failure is fatal.
    pub async fn bind(grpc_addr: SocketAddr, health_addr: SocketAddr) -> anyhow::Result<Self> {
        let grpc = TcpListener::bind(grpc_addr)
            .await
            .with_context(|| format!("bind gRPC listener on {grpc_addr}"))?;
        let health = TcpListener::bind(health_addr)
            .await
            .with_context(|| format!("bind health listener on {health_addr}"))?;
        Ok(Self { grpc, health })
    }

    pub fn grpc_addr(&self) -> std::io::Result<SocketAddr> {
        self.grpc.local_addr()
    }

    pub fn health_addr(&self) -> std::io::Result<SocketAddr> {
        self.health.local_addr()
    }
}

/// Serve the scaler and health endpoints until `shutdown` flips to `true`.
pub async fn serve(
    listeners: Listeners,
    store: StoreClient,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let grpc_addr = listeners.grpc_addr()?;
    let health_addr = listeners.health_addr()?;
    let Listeners {
        grpc: grpc_listener,
        health: health_listener,
    } = listeners;

    let scaler = ScalerServer::new(HttpSignalSource::new(store.clone())).with_shutdown(shutdown.clone());
    let grpc_shutdown = wait_for_shutdown(shutdown.clone());
    let grpc = async move {
        info!(%grpc_addr, "external scaler gRPC server starting");
        tonic::transport::Server::builder()
            .add_service(scaler.into_service())
            .serve_with_incoming_shutdown(TcpListenerStream::new(grpc_listener), grpc_shutdown)
            .await
            .inspect_err(|e| error!(error = %e, "gRPC server error"))
            .context("gRPC server")
    };

    let router = searchscale_health::build_router(store);
    let health_shutdown = wait_for_shutdown(shutdown);
    let health = async move {
        info!(%health_addr, "health server starting");
        axum::serve(health_listener, router)
            .with_graceful_shutdown(health_shutdown)
            .await
            .inspect_err(|e| error!(error = %e, "health server error"))
            .context("health server")
    };

    tokio::try_join!(grpc, health)?;
    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchscale_query::StoreConfig;
    use searchscale_scaler::proto::ScaledObjectRef;
    use searchscale_scaler::proto::external_scaler_client::ExternalScalerClient;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn local() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    fn store() -> StoreClient {
        StoreClient::new(StoreConfig::new("http://127.0.0.1:1", "", "")).unwrap()
    }

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn bind_fails_when_port_taken() {
        let taken = TcpListener::bind(local()).await.unwrap();
        let addr = taken.local_addr().unwrap();

        assert!(Listeners::bind(addr, local()).await.is_err());
        assert!(Listeners::bind(local(), addr).await.is_err());
    }

    #[tokio::test]
    async fn serves_both_ports_until_shutdown() {
        let listeners = Listeners::bind(local(), local()).await.unwrap();
        let grpc_addr = listeners.grpc_addr().unwrap();
        let health_addr = listeners.health_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(serve(listeners, store(), shutdown_rx));

        let response = http_get(health_addr, "/liveness").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");

        let response = http_get(health_addr, "/readiness").await;
        assert!(response.starts_with("HTTP/1.1 503"), "{response}");

        let mut client = ExternalScalerClient::connect(format!("http://{grpc_addr}")).await.unwrap();
        let spec = client
            .get_metric_spec(ScaledObjectRef::default())
            .await
            .unwrap()
            .into_inner();
        assert_eq!(spec.metric_specs[0].target_size, 50);
        drop(client);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }
}
