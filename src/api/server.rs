//! API server lifecycle: binds a listener, mounts `api_router()` and
//! serves until a shutdown signal arrives.
//!
//! `serve` runs in the foreground (used by the binary); `start_server_on`
//! spawns a background task and returns a handle with a shutdown channel.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a background API server.
pub struct ApiServer {
    pub info: ServerInfo,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Serve on `bind` until `shutdown` resolves.
pub async fn serve<F>(core: Arc<CoreState>, bind: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, api_router(core))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Start the server in a background task. Port 0 picks an ephemeral port.
pub async fn start_server_on(core: Arc<CoreState>, bind: SocketAddr) -> std::io::Result<ApiServer> {
    let listener = TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;

    let info = ServerInfo {
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = api_router(core);

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        info,
        shutdown_tx: Some(shutdown_tx),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::core_state::tests::test_state;

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = test_state(&tmp);
        core.initialize().unwrap();
        (Arc::new(core), tmp)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (core, _tmp) = test_core();
        let mut server = start_server_on(core, localhost())
            .await
            .expect("server should start");

        assert!(server.info.port > 0);
        assert!(server.info.server_addr.contains(':'));

        let url = format!("http://127.0.0.1:{}/health", server.info.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn signup_and_login_over_http() {
        let (core, _tmp) = test_core();
        let mut server = start_server_on(core, localhost()).await.unwrap();
        let base = format!("http://127.0.0.1:{}", server.info.port);
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/auth/signup"))
            .json(&serde_json::json!({
                "email": "pat@example.com",
                "name": "Pat",
                "password": "long-enough-pw",
                "role": "Patient"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let resp = client
            .post(format!("{base}/auth/login"))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("username=pat%40example.com&password=long-enough-pw")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        let token = body["access_token"].as_str().unwrap();

        let resp = client
            .get(format!("{base}/pefr/records"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        // Without a token the protected route is rejected
        let resp = client.get(format!("{base}/pefr/records")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (core, _tmp) = test_core();
        let mut server = start_server_on(core, localhost()).await.unwrap();

        server.shutdown();
        server.shutdown();
    }
}
