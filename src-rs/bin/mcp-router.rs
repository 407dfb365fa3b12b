use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use mcp_router_rs::api::McpServer;
use mcp_router_rs::helpers::init_tracing;
use mcp_router_rs::{McpContext, RouterConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let json = env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    init_tracing(&level, json);

    let config = RouterConfig::from_env().context("failed to load configuration")?;
    info!(
        has_openai_key = config.vendor("openai").is_some(),
        has_anthropic_key = config.vendor("anthropic").is_some(),
        has_google_key = config.vendor("google").is_some(),
        port = config.port,
        "environment loaded"
    );

    let ctx = McpContext::from_config(&config).context("failed to initialize providers")?;
    let server = McpServer::new(config, Arc::new(ctx));
    server.start().await?;
    Ok(())
}
