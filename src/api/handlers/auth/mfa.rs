//! MFA enrollment and challenge endpoints.
//!
//! Flow Overview:
//! 1) `GET /setup-mfa` shows the shared secret and provisioning URI to a
//!    holder of a pending enrollment token.
//! 2) `POST /setup-mfa` verifies the first code and enables MFA; the user
//!    then logs in normally, no session is granted here.
//! 3) `GET /verify-2fa` confirms a pending login challenge exists.
//! 4) `POST /verify-2fa` verifies the code and trades the pending token for
//!    a full session.
//!
//! Security boundaries:
//! - Every endpoint here requires its exact pending-token kind; a full
//!   session or the other pending kind is rejected as unauthorized.
//! - A failed code leaves the pending token intact for a retry.

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{
    session::{clear_session_cookie, extract_session_token, session_cookie},
    types::{CodeRequest, LoginResponse, MessageResponse, SetupMfaResponse},
    utils::extract_client_ip,
};
use crate::auth::{AuthError, AuthService};
use crate::store::Role;

fn login_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin-login",
        Role::Client => "/client-login",
    }
}

#[utoipa::path(
    get,
    path = "/setup-mfa",
    responses(
        (status = 200, description = "Enrollment material for the pending account", body = SetupMfaResponse),
        (status = 401, description = "No pending enrollment")
    ),
    tag = "mfa"
)]
pub async fn setup_mfa_page(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> Result<Response, AuthError> {
    let token = extract_session_token(&headers).ok_or(AuthError::Unauthorized)?;
    let challenge = service.enrollment_challenge(&token).await?;
    let body = SetupMfaResponse {
        secret: challenge.secret,
        otpauth_url: challenge.otpauth_url,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/setup-mfa",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "MFA enabled; log in to continue", body = MessageResponse),
        (status = 401, description = "Code rejected or no pending enrollment")
    ),
    tag = "mfa"
)]
pub async fn setup_mfa_confirm(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<CodeRequest>>,
) -> Result<Response, AuthError> {
    let token = extract_session_token(&headers).ok_or(AuthError::Unauthorized)?;
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("code is required"));
    };
    let ip = extract_client_ip(&headers);

    let role = service
        .confirm_enrollment(&token, &request.code, ip.as_deref())
        .await?;

    // The pending token is spent; clear the cookie and route to login.
    let cookie = clear_session_cookie(service.config())
        .context("failed to build session cookie")?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    let body = MessageResponse {
        message: "Two-factor authentication enabled".to_string(),
        redirect: Some(login_path(role).to_string()),
    };
    Ok((StatusCode::OK, response_headers, Json(body)).into_response())
}

#[utoipa::path(
    get,
    path = "/verify-2fa",
    responses(
        (status = 204, description = "A login challenge is pending"),
        (status = 401, description = "No pending challenge")
    ),
    tag = "mfa"
)]
pub async fn verify_2fa_page(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> Result<StatusCode, AuthError> {
    let token = extract_session_token(&headers).ok_or(AuthError::Unauthorized)?;
    service.challenge_pending(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/verify-2fa",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "Challenge passed; full session issued", body = LoginResponse),
        (status = 401, description = "Code rejected or no pending challenge")
    ),
    tag = "mfa"
)]
pub async fn verify_2fa(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<CodeRequest>>,
) -> Result<Response, AuthError> {
    let token = extract_session_token(&headers).ok_or(AuthError::Unauthorized)?;
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("code is required"));
    };
    let ip = extract_client_ip(&headers);

    let authenticated = service
        .verify_challenge(&token, &request.code, ip.as_deref())
        .await?;

    let cookie = session_cookie(
        service.config(),
        &authenticated.token,
        service.config().session_ttl(),
    )
    .context("failed to build session cookie")?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    let body = LoginResponse {
        mfa_required: false,
        redirect: authenticated.landing.to_string(),
    };
    Ok((StatusCode::OK, response_headers, Json(body)).into_response())
}
