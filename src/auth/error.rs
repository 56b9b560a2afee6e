//! Error taxonomy for the authentication core.
//!
//! Every per-request failure is recovered at the HTTP boundary and turned
//! into a fixed generic message plus a status code. Credential and TOTP
//! failures share one message so the two are indistinguishable to a caller
//! probing for accounts. Internal details never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad username/password or wrong role for the login route.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// TOTP code mismatch; retryable.
    #[error("invalid code")]
    InvalidCode,
    /// Duplicate username at registration.
    #[error("username already exists")]
    Conflict,
    /// No session, or a pending/expired token where a step requires one.
    #[error("unauthorized")]
    Unauthorized,
    /// Authenticated, but the role does not permit the operation.
    #[error("forbidden")]
    Forbidden,
    /// Unknown email in recovery.
    #[error("not found")]
    NotFound,
    /// Request shape is wrong (empty field, unknown role segment).
    #[error("{0}")]
    Validation(&'static str),
    /// Rate limit tripped; surfaced as retry-later.
    #[error("rate limited")]
    RateLimited,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict,
            StoreError::Backend(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // One message for both, to resist enumeration.
            Self::InvalidCredentials | Self::InvalidCode => {
                (StatusCode::UNAUTHORIZED, "Authentication failed")
            }
            Self::Conflict => (StatusCode::CONFLICT, "Username already exists"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            Self::NotFound => (StatusCode::NOT_FOUND, "Email not found"),
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Rate limited"),
            Self::Internal(err) => {
                error!("internal error handling auth request: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn status_of(err: AuthError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            status_of(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::InvalidCode), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_of(AuthError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AuthError::Validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(AuthError::Internal(anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_conflict_maps_to_conflict() {
        let err: AuthError = StoreError::Conflict.into();
        assert!(matches!(err, AuthError::Conflict));
    }
}
