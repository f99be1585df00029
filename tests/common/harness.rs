//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dealmatch::config::Config;
use dealmatch::fixtures;
use dealmatch::gateway::{GatewayState, cors_layer, create_router_with_state};
use dealmatch::pipeline::{BundleHandle, ModelBundle};
use dealmatch::scoring::RelevanceScorer;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub struct TestServer<S: RelevanceScorer + 'static> {
    pub addr: SocketAddr,
    pub handle: Arc<BundleHandle<S>>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl<S: RelevanceScorer + 'static> TestServer<S> {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl<S: RelevanceScorer + 'static> Drop for TestServer<S> {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Serves `bundle` on an ephemeral localhost port with the default (any-origin) CORS policy.
pub async fn spawn_server<S: RelevanceScorer + 'static>(
    bundle: ModelBundle<S>,
) -> Result<TestServer<S>, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;

    let handle = Arc::new(BundleHandle::new(bundle));
    let app = create_router_with_state(
        GatewayState::new(Arc::clone(&handle)),
        cors_layer(&Config::default()),
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr,
        handle,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: None,
    })
}

/// Writes the fixture artifacts to a temp dir and serves a bundle loaded from them.
pub async fn spawn_artifact_server()
-> Result<TestServer<dealmatch::CrossEncoder>, ServerStartupError> {
    let temp_dir = TempDir::new()?;
    let sources = fixtures::write_artifacts(temp_dir.path())
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let bundle = ModelBundle::initialize(&sources)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let mut server = spawn_server(bundle).await?;
    server._temp_dir = Some(temp_dir);
    Ok(server)
}
