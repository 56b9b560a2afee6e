//! Principal resolution for protected routes.

use axum::http::HeaderMap;

use super::session::extract_session_token;
use crate::auth::{AuthError, AuthService, Principal};
use crate::store::Role;

/// Resolve the request's full session into a principal. Pending tokens and
/// missing cookies both fail as unauthorized.
pub(crate) async fn require_session(
    headers: &HeaderMap,
    service: &AuthService,
) -> Result<Principal, AuthError> {
    let token = extract_session_token(headers).ok_or(AuthError::Unauthorized)?;
    service.authenticate(&token).await
}

/// Gate an operation on the admin role.
pub(crate) fn require_admin(principal: &Principal) -> Result<(), AuthError> {
    if principal.role == Role::Admin {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
