//! DealMatch HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use dealmatch::config::Config;
use dealmatch::gateway::{GatewayState, cors_layer, create_router_with_state};
use dealmatch::pipeline::{ArtifactSources, BundleHandle, ModelBundle};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        data_dir = %config.data_dir.display(),
        checkpoint_dir = %config.checkpoint_dir.display(),
        "DealMatch starting"
    );

    let sources = config.artifact_sources();
    let bundle = load_bundle(sources.clone()).await?;
    let handle = Arc::new(BundleHandle::new(bundle));

    #[cfg(unix)]
    tokio::spawn(reload_on_hangup(Arc::clone(&handle), sources));

    let app = create_router_with_state(GatewayState::new(handle), cors_layer(&config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("DealMatch shutdown complete");
    Ok(())
}

/// Loading is file IO plus tensor work; keep it off the async workers.
async fn load_bundle(sources: ArtifactSources) -> anyhow::Result<ModelBundle> {
    let bundle = tokio::task::spawn_blocking(move || ModelBundle::initialize(&sources)).await??;
    Ok(bundle)
}

/// Rebuilds the bundle on SIGHUP. A failed reload keeps serving the previous one.
#[cfg(unix)]
async fn reload_on_hangup(handle: Arc<BundleHandle>, sources: ArtifactSources) {
    let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGHUP handler, reload disabled");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        tracing::info!("Received SIGHUP, reloading models");
        match load_bundle(sources.clone()).await {
            Ok(bundle) => {
                handle.swap(bundle);
                tracing::info!("Model reload complete");
            }
            Err(e) => {
                tracing::error!(error = %e, "Model reload failed, keeping current models");
            }
        }
    }
}

async fn run_health_check() -> i32 {
    let port = std::env::var("DEALMATCH_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/health", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
