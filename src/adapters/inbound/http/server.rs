use crate::shared::error::ExporterError;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// HTTP listener bound to an address, ready to serve a router
pub struct HttpServer {
    name: &'static str,
    listener: TcpListener,
}

impl HttpServer {
    /// Binds `address` without serving it yet
    pub async fn bind(name: &'static str, address: &str) -> Result<Self, ExporterError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| ExporterError::BindFailed {
                address: address.to_string(),
                details: e.to_string(),
            })?;
        Ok(Self { name, listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves `router` until `token` is cancelled, then drains open connections
    pub async fn serve(self, router: Router, token: CancellationToken) -> std::io::Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(server = self.name, address = %addr, "Listening");
        }

        axum::serve(self.listener, router)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        info!(server = self.name, "Server stopped");
        Ok(())
    }
}
