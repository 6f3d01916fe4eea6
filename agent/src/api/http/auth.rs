//! Bearer token check for the command endpoint

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use tracing::warn;

use crate::{AppState, Error, Result};

/// Reject the request unless it carries the configured bearer token.
///
/// Passes everything through when no token is configured.
pub async fn require_token(
    State(state): State<AppState>,
    bearer: std::result::Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if let Some(expected) = state.config.auth_token.as_deref() {
        let presented = bearer.as_ref().ok().map(|TypedHeader(auth)| auth.token());
        let authorized = presented
            .is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes()));

        if !authorized {
            warn!("Rejected command request without a valid bearer token");
            return Err(Error::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
