//! HTTP front door

use crate::client::ClientFactory;
use crate::handler::{elastic_search_handler, ProxyState};
use crate::recovery::recovery_layer;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the proxy router
///
/// Only `POST /elastic` is registered; everything else gets axum's default
/// `404` or `405`.
pub fn proxy_router(clients: Arc<dyn ClientFactory>) -> Router {
    let state = ProxyState { clients };

    Router::new()
        .route("/elastic", post(elastic_search_handler))
        .layer(recovery_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ProxyServer {
    clients: Arc<dyn ClientFactory>,
}

impl ProxyServer {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self { clients }
    }

    pub fn router(&self) -> Router {
        proxy_router(self.clients.clone())
    }

    /// Bind `addr` and serve until the process stops. A bind failure is
    /// returned to the caller.
    pub async fn serve(self, addr: &str) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Proxy listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
