//! Features API Server
//!
//! OGC API - Features implementation serving pluggable feature backends.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use features_api::config::ServiceConfig;
use features_api::state::AppState;
use features_protocol::Server;

/// Features API Server
#[derive(Parser, Debug)]
#[command(name = "features-api")]
#[command(about = "OGC API - Features server")]
struct Args {
    /// Configuration file (YAML)
    #[arg(short, long, env = "FEATURES_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override
    #[arg(short, long, env = "FEATURES_LISTEN_ADDR")]
    listen: Option<String>,

    /// Context path override
    #[arg(long, env = "FEATURES_CONTEXT_PATH")]
    context_path: Option<String>,

    /// Service title override
    #[arg(short, long, env = "FEATURES_TITLE")]
    title: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "FEATURES_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async move {
        run_server(args).await;
    });
}

async fn run_server(args: Args) {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting features API server");

    // Load configuration and apply CLI overrides
    let mut config = match ServiceConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(context_path) = args.context_path {
        config.context_path = context_path;
    }
    if let Some(title) = args.title {
        config.title = title;
    }
    let config = config.normalized();

    // Backend plugin loading is out of scope for this binary; the mock
    // backend keeps the service usable out of the box.
    info!("No backends configured, using mock backend instead");
    let server = Server::new(vec![mock_backend::create()]);

    info!(
        "Active backends ({}) and their collections:",
        server.backends().len()
    );
    for backend in server.backends() {
        info!("  - {}", backend.name);
        for collection in &backend.collections {
            info!("     |- {}", collection.info().id);
        }
    }

    let addr: SocketAddr = config.listen.parse().expect("Invalid listen address");
    let context_path = config.context_path.clone();
    let state = Arc::new(AppState::new(server, config));
    let app = features_api::app(state);

    info!("Features API listening on {}", addr);
    info!("Try visiting http://{}{}", addr, context_path);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server failed");
}
