use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::handle_rpc;
use crate::api::router::RequestRouter;
use crate::config::RouterConfig;
use crate::context::McpContext;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),
    #[error("server error: {0}")]
    Serve(String),
}

pub struct McpServer {
    pub config: RouterConfig,
    pub router: Arc<RequestRouter>,
}

impl McpServer {
    pub fn new(config: RouterConfig, ctx: Arc<McpContext>) -> Self {
        Self {
            config,
            router: Arc::new(RequestRouter::new(ctx)),
        }
    }

    pub fn app(&self) -> Router {
        app(self.router.clone())
    }

    pub async fn start(&self) -> Result<(), ServerError> {
        let addr: SocketAddr = self.config.addr().parse()?;
        info!(%addr, providers = ?self.router.context().active_providers(), "server running");
        axum::Server::bind(&addr)
            .serve(self.app().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Serve(err.to_string()))
    }
}

pub fn app(router: Arc<RequestRouter>) -> Router {
    Router::new()
        .fallback(handle_rpc)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(router)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
