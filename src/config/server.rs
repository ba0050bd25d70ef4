use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::num::NonZeroUsize;
use thiserror::Error;

use super::ParseError;
use crate::util::figment::FigmentErrorAttachable;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub db: super::Database,
    pub auth: super::Auth,
    /// **Environment variables**: `ROSTER_HOST`
    #[serde(default = "Server::default_host")]
    pub host: String,
    /// **Environment variables**: `ROSTER_PORT`
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Amount of HTTP worker threads. Defaults to the number of
    /// physical CPUs when unset.
    ///
    /// **Environment variables**: `ROSTER_WORKERS`
    pub workers: Option<NonZeroUsize>,
}

#[derive(Debug, Error)]
enum InvalidValue {
    #[error("auth.secret must be between 12 and 1024 bytes long")]
    AuthSecret,
    #[error("db.url is not a valid Postgres connection URL")]
    DatabaseUrl,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ParseError> {
        if !(12..=1024).contains(&self.auth.secret.len()) {
            return Err(Report::new(InvalidValue::AuthSecret)).change_context(ParseError);
        }

        let parsed = url::Url::parse(&self.db.url)
            .change_context(InvalidValue::DatabaseUrl)
            .change_context(ParseError)?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(Report::new(InvalidValue::DatabaseUrl)).change_context(ParseError);
        }

        Ok(())
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "roster.toml";
    const DEFAULT_HOST: &'static str = "127.0.0.1";
    const DEFAULT_PORT: u16 = 3003;

    fn default_host() -> String {
        Self::DEFAULT_HOST.to_string()
    }

    const fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }

    /// Creates the default [`figment::Figment`] used to load server
    /// configuration. Split out from [`Server::load`] for testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // figment's env provider cannot tell a key separator from an
            // underscore inside a key, so spell the ambiguous ones out.
            .merge(Env::prefixed("ROSTER_").map(|v| match v.as_str() {
                "DB_MIN_IDLE" => "db.min_idle".into(),
                "DB_POOL_SIZE" => "db.pool_size".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),
                "AUTH_TOKEN_EXPIRY_SECS" => "auth.token_expiry_secs".into(),
                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.url".into(),
                "JWT_SECRET" => "auth.secret".into(),
                _ => v.into(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/roster");
            jail.set_env("JWT_SECRET", "jail-secret-long-enough");

            jail.set_env("ROSTER_DB_MIN_IDLE", "2");
            jail.set_env("ROSTER_DB_POOL_SIZE", "20");
            jail.set_env("ROSTER_DB_TIMEOUT_SECS", "30");
            jail.set_env("ROSTER_AUTH_TOKEN_EXPIRY_SECS", "7200");
            jail.set_env("ROSTER_PORT", "8080");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.url, "postgres://localhost/roster");
            assert_eq!(config.auth.secret, "jail-secret-long-enough");

            assert_eq!(config.db.min_idle, NonZeroU32::new(2));
            assert_eq!(config.db.pool_size, NonZeroU32::new(20).unwrap());
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(30).unwrap());
            assert_eq!(
                config.auth.token_expiry_secs,
                NonZeroU64::new(7200).unwrap()
            );
            assert_eq!(config.port, 8080);
            assert_eq!(config.host, "127.0.0.1");

            Ok(())
        });
    }

    #[test]
    fn rejects_a_short_signing_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/roster");
            jail.set_env("JWT_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());
            Ok(())
        });
    }

    #[test]
    fn rejects_a_non_postgres_url() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "mysql://localhost/roster");
            jail.set_env("JWT_SECRET", "jail-secret-long-enough");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());
            Ok(())
        });
    }
}
