//! Account registration, the entry point of the enrollment state machine.

use anyhow::Context;
use axum::{
    extract::{Extension, Path},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{
    session::session_cookie,
    types::{MessageResponse, RegisterRequest},
    utils::valid_email,
};
use crate::auth::{AuthError, AuthService};
use crate::store::Role;

#[utoipa::path(
    post,
    path = "/register/{role}",
    request_body = RegisterRequest,
    params(
        ("role" = String, Path, description = "Account role, `admin` or `client`")
    ),
    responses(
        (status = 201, description = "Account created, MFA setup pending", body = MessageResponse),
        (status = 409, description = "Username already exists"),
        (status = 400, description = "Malformed request")
    ),
    tag = "auth"
)]
pub async fn register(
    Path(role): Path<String>,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<Response, AuthError> {
    // The role comes from the path so a payload can never smuggle one in.
    let role = match role.as_str() {
        "admin" => Role::Admin,
        "client" => Role::Client,
        _ => return Err(AuthError::Validation("unknown role")),
    };

    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("username and password are required"));
    };

    // An empty email field means "none"; a present one must look like one.
    let email = request.email.filter(|email| !email.is_empty());
    if let Some(email) = &email {
        if !valid_email(email) {
            return Err(AuthError::Validation("invalid email address"));
        }
    }

    let token = service
        .register(role, &request.username, email, &request.password)
        .await?;

    let cookie = session_cookie(service.config(), &token, service.config().enrollment_ttl())
        .context("failed to build session cookie")?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    let body = MessageResponse {
        message: "Account created, finish MFA setup".to_string(),
        redirect: Some("/setup-mfa".to_string()),
    };
    Ok((StatusCode::CREATED, response_headers, Json(body)).into_response())
}
