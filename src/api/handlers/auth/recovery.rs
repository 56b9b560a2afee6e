//! OTP-gated password recovery.
//!
//! No email is sent anywhere; the TOTP code is the proof of identity, which
//! is why recovery only works for accounts that finished MFA enrollment.

use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use secrecy::ExposeSecret;
use std::sync::Arc;

use super::{
    types::{ForgotPasswordRequest, MessageResponse},
    utils::{extract_client_ip, valid_email},
};
use crate::auth::{AuthError, AuthService};

#[utoipa::path(
    post,
    path = "/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 401, description = "Code rejected"),
        (status = 403, description = "Account has no MFA enrolled"),
        (status = 404, description = "Email not found"),
        (status = 400, description = "Malformed request")
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("email, code and new password are required"));
    };
    if !valid_email(&request.email) {
        return Err(AuthError::Validation("invalid email address"));
    }
    if request.new_password.expose_secret().is_empty() {
        return Err(AuthError::Validation("password cannot be empty"));
    }
    let ip = extract_client_ip(&headers);

    service
        .reset_password(
            &request.email,
            &request.code,
            &request.new_password,
            ip.as_deref(),
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
        redirect: None,
    }))
}
