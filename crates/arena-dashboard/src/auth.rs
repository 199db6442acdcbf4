//! Basic authentication for the admin routes.
//!
//! Every field setup route is administrator-only. When credentials are
//! configured, requests without a matching `Authorization: Basic` header are
//! rejected before any handler runs, so nothing is touched on failure.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::config::DashboardConfig;
use crate::server::AppState;

/// Middleware rejecting requests that fail basic auth.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let config = state.config();
    if config.auth_enabled() && !check_basic_auth(request.headers(), config) {
        debug!(path = %request.uri().path(), "Rejected unauthenticated request");
        return unauthorized_response();
    }
    next.run(request).await
}

/// Check basic authentication.
pub(crate) fn check_basic_auth(headers: &HeaderMap, config: &DashboardConfig) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Basic "))
    else {
        return false;
    };

    match base64_decode(encoded.trim()) {
        Some(decoded) => decoded == format!("{}:{}", config.username, config.password),
        None => false,
    }
}

/// Decode standard base64 (padding optional).
fn base64_decode(input: &str) -> Option<String> {
    fn sextet(c: u8) -> Option<u32> {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a' + 26,
            b'0'..=b'9' => c - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => return None,
        };
        Some(u32::from(value))
    }

    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    let mut buf = 0u32;
    let mut bits = 0u32;

    for c in input.trim_end_matches('=').bytes() {
        buf = (buf << 6) | sextet(c)?;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buf >> bits) as u8);
            buf &= (1 << bits) - 1;
        }
    }

    String::from_utf8(out).ok()
}

/// Create an unauthorized response.
fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Field Setup\"")],
        "Unauthorized",
    )
        .into_response()
}
