//! Request middleware: bearer-token authentication and an audit log line
//! per request.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::auth::{verify_token, Claims};
use crate::AppState;

/// Rejects requests without a valid bearer token; on success the decoded
/// `Claims` are stored in the request extensions for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("request without bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = %e, "token rejected");
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Writes one structured log line per request: who did what, and how long
/// it took. Runs outside the auth layer so rejected requests show up too.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    info!(
        %method,
        %uri,
        %user,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    response
}
