use crate::{api, auth::AuthConfig, cli::actions::Action, password, totp};
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            issuer,
            base_url,
        } => {
            // Reject malformed connection strings before touching the pool.
            Url::parse(&dsn).context("invalid database connection string")?;

            startup_checks()?;

            let secure_cookies = base_url.starts_with("https://");
            let config = AuthConfig::new(issuer).with_secure_cookies(secure_cookies);

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}

/// Exercise the random source and the password hasher once before serving.
/// Either being unavailable is fatal at startup, not a per-request error.
fn startup_checks() -> Result<()> {
    totp::generate_secret().context("random source unavailable")?;
    password::hash(&SecretString::from("startup-check".to_string()))
        .context("password hashing unavailable")?;
    Ok(())
}
