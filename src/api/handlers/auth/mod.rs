//! HTTP surface of the authentication core.
//!
//! Handlers stay thin: parse the request, pull the token from the cookie or
//! bearer header, call one [`AuthService`](crate::auth::AuthService) method,
//! and translate the result. All policy lives in the service; all transport
//! detail lives here.

#[cfg(test)]
mod integration_tests;
pub(crate) mod landing;
pub(crate) mod login;
pub(crate) mod mfa;
pub(crate) mod principal;
pub(crate) mod recovery;
pub(crate) mod register;
pub(crate) mod session;
pub(crate) mod types;
pub(crate) mod utils;
