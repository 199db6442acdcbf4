//! HTTP server implementation using axum.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use axum::{middleware, Router};
use futures_util::stream::StreamExt;
use futures_util::{future, SinkExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use arena_core::{LedMode, VaultLedMode};
use arena_telemetry::Metrics;

use crate::auth::require_admin;
use crate::config::DashboardConfig;
use crate::error::ApiError;
use crate::session::StreamSession;
use crate::state::FieldState;
use crate::types::FieldStatus;

/// Where every mutation redirects to.
const FIELD_SETUP_PATH: &str = "/setup/field";

/// Connection limiter to prevent too many concurrent viewer sessions.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
    next_id: AtomicU64,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
            next_id: AtomicU64::new(1),
        }
    }

    /// Reserve a slot; released when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                Metrics::viewer_connected();
                return Some(ConnectionGuard {
                    limiter: Arc::clone(self),
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

/// Slot held by one viewer session.
pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
    id: u64,
}

impl ConnectionGuard {
    /// Viewer id, unique for the process lifetime.
    pub fn viewer_id(&self) -> String {
        format!("viewer-{}", self.id)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
        Metrics::viewer_disconnected();
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    field: FieldState,
    connection_limiter: Arc<ConnectionLimiter>,
    config: DashboardConfig,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(field: FieldState, config: DashboardConfig, shutdown: CancellationToken) -> Self {
        Self {
            field,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            config,
            shutdown,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn field(&self) -> &FieldState {
        &self.field
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(FIELD_SETUP_PATH, get(get_field_status).post(post_display_station))
        .route("/setup/field/reload_displays", axum::routing::post(post_reload_displays))
        .route("/setup/field/test", axum::routing::post(post_test_modes))
        .route("/setup/field/websocket", get(ws_handler))
        .route("/metrics", get(get_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Point-in-time field status.
async fn get_field_status(State(state): State<AppState>) -> Json<FieldStatus> {
    Json(state.field.collect_status())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayStationForm {
    #[serde(default)]
    display_id: String,
    #[serde(default)]
    alliance_station: String,
}

/// Assign a display to an alliance station.
async fn post_display_station(
    State(state): State<AppState>,
    Form(form): Form<DisplayStationForm>,
) -> Redirect {
    state
        .field
        .displays()
        .assign(form.display_id, form.alliance_station);
    Redirect::to(FIELD_SETUP_PATH)
}

/// Force every connected display to reload.
async fn post_reload_displays(State(state): State<AppState>) -> Redirect {
    info!("Reloading all displays");
    state.field.notifiers().reload_displays.notify();
    Redirect::to(FIELD_SETUP_PATH)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestModesForm {
    #[serde(default)]
    mode: String,
    #[serde(default)]
    vault_mode: String,
}

/// Set the LED test modes (pre-match only).
///
/// Unparsable or out-of-range codes fall back to mode 0.
async fn post_test_modes(
    State(state): State<AppState>,
    Form(form): Form<TestModesForm>,
) -> Result<Redirect, ApiError> {
    let led = LedMode::parse_lenient(&form.mode);
    let vault = VaultLedMode::parse_lenient(&form.vault_mode);
    state.field.modes().apply_test_modes(led, vault)?;
    Ok(Redirect::to(FIELD_SETUP_PATH))
}

/// Prometheus metrics.
async fn get_metrics() -> Result<Response, ApiError> {
    let body = Metrics::gather_text().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let Some(guard) = state.connection_limiter.try_acquire() else {
        warn!(
            current = state.connection_limiter.current_count(),
            max = state.config.max_connections,
            "Viewer connection limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    };

    info!(
        viewer = %guard.viewer_id(),
        connections = state.connection_limiter.current_count(),
        "New viewer connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

/// Run one viewer session over an upgraded WebSocket.
async fn handle_ws_connection(socket: WebSocket, state: AppState, guard: ConnectionGuard) {
    let viewer = guard.viewer_id();
    let (sender, mut receiver) = socket.split();
    let sink = sender.with(|text: String| {
        future::ready(Ok::<Message, axum::Error>(Message::Text(text.into())))
    });

    // Cancelled when the viewer closes or the server shuts down.
    let teardown = state.shutdown.child_token();

    let session = match StreamSession::open(
        viewer.clone(),
        state.field.plc().clone(),
        &state.field.notifiers().plc_io_change,
        sink,
        teardown.clone(),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            debug!(viewer = %viewer, error = %e, "Failed to send initial snapshot");
            return;
        }
    };

    // Reader: viewers only send close frames; pings are answered by axum.
    let reader_token = teardown.clone();
    let reader_viewer = viewer.clone();
    let incoming_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = reader_token.cancelled() => break,
                msg = receiver.next() => match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(viewer = %reader_viewer, "Viewer closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(viewer = %reader_viewer, error = %e, "WebSocket receive error");
                        break;
                    }
                    Some(Ok(_)) => {}
                },
            }
        }
        reader_token.cancel();
    });

    let end = session.run().await;
    incoming_task.abort();
    Metrics::session_ended(end.as_str());

    drop(guard);
    info!(
        viewer = %viewer,
        end = end.as_str(),
        connections = state.connection_limiter.current_count(),
        "Viewer connection closed"
    );
}

/// Serve the dashboard on an already bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    field: FieldState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let state = AppState::new(field, config, shutdown.clone());
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

/// Bind the configured address and run the dashboard HTTP server.
pub async fn run_server(
    field: FieldState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    info!(%addr, "Starting field setup server");

    let listener = TcpListener::bind(addr).await?;
    serve(listener, field, config, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_caps_and_releases() {
        let limiter = Arc::new(ConnectionLimiter::new(2));
        let a = limiter.try_acquire().unwrap();
        let b = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());
        assert_ne!(a.viewer_id(), b.viewer_id());

        drop(a);
        assert_eq!(limiter.current_count(), 1);
        assert!(limiter.try_acquire().is_some());
    }
}
