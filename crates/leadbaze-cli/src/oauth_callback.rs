//! Loopback listener that receives the OAuth redirect after the user
//! authorizes LeadBaze in the browser.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

const DONE_PAGE: &str =
    "<html><body><p>Authorization received. You can close this window.</p></body></html>";
const DENIED_PAGE: &str =
    "<html><body><p>Authorization was not granted. You can close this window.</p></body></html>";
const INVALID_PAGE: &str = "<html><body><p>Invalid authorization response.</p></body></html>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallbackEvent {
    Code(String),
    Denied(String),
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    tx: mpsc::Sender<CallbackEvent>,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub(crate) fn callback_router(expected_state: &str, tx: mpsc::Sender<CallbackEvent>) -> Router {
    Router::new()
        .route("/callback", get(handle_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(CallbackState {
            expected_state: Arc::from(expected_state),
            tx,
        })
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(query): Query<CallbackQuery>,
) -> (StatusCode, Html<&'static str>) {
    if query.state.as_deref() != Some(&*state.expected_state) {
        tracing::warn!("OAuth callback with mismatched state ignored");
        return (StatusCode::BAD_REQUEST, Html(INVALID_PAGE));
    }

    let (event, page) = match (query.code, query.error) {
        (Some(code), _) if !code.trim().is_empty() => (CallbackEvent::Code(code), DONE_PAGE),
        (_, Some(error)) => (CallbackEvent::Denied(error), DENIED_PAGE),
        _ => return (StatusCode::BAD_REQUEST, Html(INVALID_PAGE)),
    };
    if state.tx.send(event).await.is_err() {
        tracing::debug!("OAuth callback arrived after the waiter gave up");
    }
    (StatusCode::OK, Html(page))
}

/// Serves the callback route on `addr` until the first valid redirect
/// arrives or `timeout` elapses.
///
/// # Errors
///
/// Returns an error if `addr` cannot be bound or no callback arrives in time.
pub(crate) async fn wait_for_callback(
    addr: SocketAddr,
    expected_state: &str,
    timeout: Duration,
) -> anyhow::Result<CallbackEvent> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "waiting for OAuth callback");
    serve_until_callback(listener, expected_state, timeout).await
}

async fn serve_until_callback(
    listener: tokio::net::TcpListener,
    expected_state: &str,
    timeout: Duration,
) -> anyhow::Result<CallbackEvent> {
    let (tx, mut rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = callback_router(expected_state, tx);

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let received = tokio::time::timeout(timeout, rx.recv()).await;
    let _ = shutdown_tx.send(());
    if tokio::time::timeout(Duration::from_secs(2), server).await.is_err() {
        tracing::debug!("callback server did not stop within grace period");
    }

    match received {
        Ok(Some(event)) => Ok(event),
        Ok(None) => anyhow::bail!("OAuth callback listener stopped unexpectedly"),
        Err(_) => anyhow::bail!(
            "no OAuth callback received within {}s; run the command again",
            timeout.as_secs()
        ),
    }
}
