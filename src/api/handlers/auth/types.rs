//! Request/response types for auth endpoints.
//!
//! Password fields deserialize into [`SecretString`] so raw values never
//! show up in debug output or logs; request types are deliberately not
//! serializable.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Role;

#[derive(ToSchema, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    #[schema(value_type = String)]
    pub password: SecretString,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    #[schema(value_type = String)]
    pub password: SecretString,
}

/// Six-digit TOTP code, submitted during enrollment and challenges.
#[derive(ToSchema, Deserialize, Debug)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub code: String,
    #[schema(value_type = String)]
    pub new_password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub mfa_required: bool,
    /// Where the client should navigate next: the landing page for a full
    /// session, the challenge page for a pending one.
    pub redirect: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SetupMfaResponse {
    pub secret: String,
    pub otpauth_url: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}
