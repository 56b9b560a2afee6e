//! TOTP secret issuance and code verification.

pub mod engine;
pub mod secret;

pub use engine::TotpEngine;
pub use secret::generate_secret;
