//! Role-scoped password login endpoints.
//!
//! Admin and client logins are separate routes over the same machinery;
//! the role is fixed by the route, never by the payload. A wrong-role
//! attempt fails exactly like a wrong password.

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{
    session::session_cookie,
    types::{LoginRequest, LoginResponse},
    utils::extract_client_ip,
};
use crate::auth::{AuthError, AuthService, LoginOutcome};
use crate::store::Role;

#[utoipa::path(
    post,
    path = "/admin-login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Password accepted; session or MFA challenge issued", body = LoginResponse),
        (status = 401, description = "Authentication failed"),
        (status = 400, description = "Malformed request")
    ),
    tag = "auth"
)]
pub async fn admin_login(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    login(Role::Admin, &headers, &service, payload).await
}

#[utoipa::path(
    post,
    path = "/client-login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Password accepted; session or MFA challenge issued", body = LoginResponse),
        (status = 401, description = "Authentication failed"),
        (status = 400, description = "Malformed request")
    ),
    tag = "auth"
)]
pub async fn client_login(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    login(Role::Client, &headers, &service, payload).await
}

async fn login(
    role: Role,
    headers: &HeaderMap,
    service: &AuthService,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("username and password are required"));
    };
    let ip = extract_client_ip(headers);

    let outcome = service
        .login(role, &request.username, &request.password, ip.as_deref())
        .await?;

    let (token, ttl, body) = match outcome {
        LoginOutcome::Authenticated(authenticated) => (
            authenticated.token,
            service.config().session_ttl(),
            LoginResponse {
                mfa_required: false,
                redirect: authenticated.landing.to_string(),
            },
        ),
        LoginOutcome::MfaRequired { token } => (
            token,
            service.config().challenge_ttl(),
            LoginResponse {
                mfa_required: true,
                redirect: "/verify-2fa".to_string(),
            },
        ),
    };

    let cookie = session_cookie(service.config(), &token, ttl)
        .context("failed to build session cookie")?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);
    Ok((StatusCode::OK, response_headers, Json(body)).into_response())
}
