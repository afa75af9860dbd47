use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::AppState;
use crate::auth::token_from_headers;
use crate::error::{Error, Result};

/// Paths reachable without a session.
fn is_public_path(path: &str) -> bool {
    path == "/health" || path == "/version" || path.starts_with("/api/auth/")
}

/// Reject requests without a valid session token. The verified claims are
/// stored in the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = token_from_headers(request.headers())
        .ok_or_else(|| Error::unauthorized("Non authentifié"))?;
    let claims = state.tokens.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        Error::unauthorized("Session invalide ou expirée")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
