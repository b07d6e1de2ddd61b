//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{validate_token, CurrentUser};
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer JWT and stores the acting user in the request
/// extensions. Missing, invalid or expired tokens and subjects that are not
/// user ids are rejected with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(token) => token.to_string(),
        None => {
            warn!("Missing or invalid Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let claims = validate_token(&token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        StatusCode::UNAUTHORIZED
    })?;
    let user = claims.user_id().map_err(|e| {
        warn!(error = %e, "Token subject rejected");
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(CurrentUser(user));
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs every API request with the acting user and outcome.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<CurrentUser>()
        .map(|CurrentUser(id)| id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
