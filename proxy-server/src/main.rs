use anyhow::Result;
use clap::Parser;
use elastic_proxy::config::{DEFAULT_HOST, DEFAULT_PORT};
use elastic_proxy::recovery::install_panic_hook;
use elastic_proxy::{ElasticClientFactory, ProxyServer, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "elastic-proxy")]
#[command(about = "Forward search requests to an Elasticsearch cluster")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "ELASTIC_PROXY_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "ELASTIC_PROXY_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,elastic_proxy=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    install_panic_hook();

    let args = Args::parse();
    let config = ServerConfig::new(args.host, args.port);
    let addr = config.bind_addr();

    tracing::info!("Starting search proxy on {}", addr);

    let server = ProxyServer::new(Arc::new(ElasticClientFactory));
    if let Err(e) = server.serve(&addr).await {
        tracing::error!("Error running server on {}: {}", addr, e);
        return Err(e.into());
    }

    Ok(())
}
