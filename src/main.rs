//! r/Stocks sentiment MCP server.
//!
//! Serves MCP over stdio by default. With `--http-port` it serves streamable
//! HTTP at `http://127.0.0.1:<port>/mcp` instead.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use mcp_server::StocksMcp;
use plot_renderer::SvgChartRenderer;
use reddit_client::{HttpRedditConnector, RedditOAuth2Config};
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use stocks_core::{AppConfig, CoreError, ErrorExt};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "stocks_sentiment=info,mcp_server=info,reddit_client=info,plot_renderer=info,stocks_core=info";

#[derive(Debug, Parser)]
#[command(name = "stocks-sentiment", version, about)]
struct Cli {
    /// TOML settings file with [reddit] and [limits] sections.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serve streamable HTTP on this port instead of stdio (0 = ephemeral).
    #[arg(long, value_name = "PORT")]
    http_port: Option<u16>,

    /// Log filter directives; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
}

fn init_logging(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    // stdout carries the MCP framing in stdio mode.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn rmcp_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::Internal {
        message: format!("MCP transport error: {err}"),
    }
}

async fn serve_http(mcp: StocksMcp, port: u16) -> Result<(), CoreError> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let addr = listener.local_addr()?;

    let config = StreamableHttpServerConfig {
        stateful_mode: true,
        ..StreamableHttpServerConfig::default()
    };
    let shutdown_token = config.cancellation_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);
    let router = Router::new().nest_service("/mcp", mcp_service);

    tracing::info!("Serving MCP over streamable HTTP at http://{}/mcp", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
            shutdown_token.cancel();
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_logging(cli.log_filter.as_deref());

    tracing::info!("Starting r/Stocks sentiment MCP server");

    let config = AppConfig::load(cli.config.as_deref())
        .map_err(CoreError::from)
        .map_err(|e| {
            e.log_error();
            e
        })?;
    tracing::info!("Reading from r/{}", config.subreddit);

    let connector = HttpRedditConnector::new(RedditOAuth2Config::from_app_config(&config))?;
    let mcp = StocksMcp::new(
        &config,
        Arc::new(connector),
        Arc::new(SvgChartRenderer::new()),
    );

    match cli.http_port {
        Some(port) => serve_http(mcp, port).await,
        None => {
            tracing::info!("Serving MCP over stdio");
            mcp.serve_stdio().await.map_err(rmcp_error)
        }
    }
}
