//! OpenAPI document assembled from the handler annotations, served at
//! `/openapi.json`.

use utoipa::OpenApi;

use crate::api::handlers::{
    auth::{landing, login, mfa, recovery, register, session, types},
    health,
};
use crate::store::Role;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "turnstile",
        description = "Authentication and two-factor core for the EPL Zone portal"
    ),
    paths(
        login::admin_login,
        login::client_login,
        register::register,
        mfa::setup_mfa_page,
        mfa::setup_mfa_confirm,
        mfa::verify_2fa_page,
        mfa::verify_2fa,
        recovery::forgot_password,
        session::session,
        session::logout,
        landing::live,
        landing::dashboard,
        health::health,
    ),
    components(schemas(
        Role,
        types::RegisterRequest,
        types::LoginRequest,
        types::CodeRequest,
        types::ForgotPasswordRequest,
        types::LoginResponse,
        types::SetupMfaResponse,
        types::MessageResponse,
        types::SessionResponse,
        landing::LandingResponse,
        health::Health,
    )),
    tags(
        (name = "auth", description = "Login, registration, sessions and recovery"),
        (name = "mfa", description = "TOTP enrollment and challenges"),
        (name = "portal", description = "Protected landing pages"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
