//! Role-routed landing pages, served as JSON stubs for the frontend.
//!
//! `/live` is the client landing and is open to any authenticated user;
//! `/dashboard` is admin-only. Pending tokens pass neither.

use axum::{extract::Extension, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::principal::{require_admin, require_session};
use crate::auth::{AuthError, AuthService};
use crate::store::Role;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LandingResponse {
    pub page: String,
    pub username: String,
    pub role: Role,
}

#[utoipa::path(
    get,
    path = "/live",
    responses(
        (status = 200, description = "Live scores landing", body = LandingResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "portal"
)]
pub async fn live(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> Result<Json<LandingResponse>, AuthError> {
    let principal = require_session(&headers, &service).await?;
    Ok(Json(LandingResponse {
        page: "live".to_string(),
        username: principal.username,
        role: principal.role,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Admin dashboard landing", body = LandingResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an admin")
    ),
    tag = "portal"
)]
pub async fn dashboard(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> Result<Json<LandingResponse>, AuthError> {
    let principal = require_session(&headers, &service).await?;
    require_admin(&principal)?;
    Ok(Json(LandingResponse {
        page: "dashboard".to_string(),
        username: principal.username,
        role: principal.role,
    }))
}
