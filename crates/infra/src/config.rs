//! Environment-driven configuration.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `VOUCHERDESK_PROFILE` | `dev`, `test` or `production` | `dev` |
//! | `DATABASE_URL` | database URL | required for `production`, `sqlite::memory:` for `test` |
//! | `DATABASE_MAX_CONNECTIONS` | pool size | `5` |
//! | `VOUCHERDESK_BIND` | web bind address | `0.0.0.0:8080` |

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_TEST_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown profile '{0}' (expected dev, test or production)")]
    UnknownProfile(String),

    #[error("{0} must be set for the {1} profile")]
    Missing(&'static str, Profile),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which storage backends to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// In-memory repositories.
    #[default]
    Dev,
    /// SQLite repositories.
    Test,
    /// PostgreSQL repositories.
    Production,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Profile::Dev => "dev",
            Profile::Test => "test",
            Profile::Production => "production",
        })
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "default" => Ok(Profile::Dev),
            "test" => Ok(Profile::Test),
            "production" | "prod" => Ok(Profile::Production),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub profile: Profile,
    /// `None` only for the dev profile.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let profile = var("VOUCHERDESK_PROFILE")
            .map(|p| p.parse::<Profile>())
            .transpose()?
            .unwrap_or_default();

        let database_url = match (profile, var("DATABASE_URL")) {
            (Profile::Dev, _) => None,
            (Profile::Test, url) => Some(url.unwrap_or_else(|| DEFAULT_TEST_DATABASE_URL.to_string())),
            (Profile::Production, Some(url)) => Some(url),
            (Profile::Production, None) => return Err(ConfigError::Missing("DATABASE_URL", profile)),
        };

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "DATABASE_MAX_CONNECTIONS",
                    reason: format!("'{raw}' is not a positive integer"),
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_raw = var("VOUCHERDESK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse().map_err(|e| ConfigError::Invalid {
            name: "VOUCHERDESK_BIND",
            reason: format!("'{bind_raw}': {e}"),
        })?;

        Ok(Self {
            profile,
            database_url,
            max_connections,
            bind,
        })
    }
}
