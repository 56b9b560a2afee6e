//! Session endpoints plus the cookie plumbing every auth handler shares.
//!
//! One cookie carries whichever token the browser currently holds: a full
//! session or a pending enrollment/challenge token. The token kinds are
//! mutually exclusive per browser session, and the server-side table is
//! authoritative about what each token may do.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Duration;

use super::types::SessionResponse;
use crate::auth::{AuthConfig, AuthService};

const SESSION_COOKIE_NAME: &str = "turnstile_session";

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> impl IntoResponse {
    // Missing or pending tokens are both "no session" to the caller.
    let Some(token) = extract_session_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match service.authenticate(&token).await {
        Ok(principal) => {
            let response = SessionResponse {
                user_id: principal.account_id.to_string(),
                username: principal.username,
                role: principal.role,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        // Works for pending tokens too: logging out mid-flow abandons it.
        service.logout(&token).await;
    }

    // Always clear the cookie, even if no server-side entry matched.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(service.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Build the `HttpOnly` cookie carrying a session or pending token. The
/// Max-Age mirrors the server-side TTL of the token kind being set.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
    ttl: Duration,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = ttl.as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_session_cookie(
    config: &AuthConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the token from the session cookie, or an `Authorization: Bearer`
/// header for non-browser clients.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
