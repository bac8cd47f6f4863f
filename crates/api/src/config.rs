//! Environment-driven server configuration.
//!
//! | Env Var                | Default                  |
//! |------------------------|--------------------------|
//! | `HOST`                 | `0.0.0.0`                |
//! | `PORT`                 | `3000`                   |
//! | `CORS_ORIGINS`         | `http://localhost:5173`  |
//! | `REQUEST_TIMEOUT_SECS` | `30`                     |
//! | `MAX_GENERATION_DAYS`  | `90`                     |
//!
//! JWT settings are documented on [`JwtConfig::from_env`].

use std::fmt::Display;
use std::str::FromStr;

use rollcall_core::generation::DEFAULT_MAX_GENERATION_DAYS;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; `CORS_ORIGINS` is comma-separated.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Largest `end - start` span, in days, accepted by range generation.
    pub max_generation_days: i64,
    pub jwt: JwtConfig,
}

/// Read `key`, falling back to `default` when unset.
///
/// Panics on a value that does not parse; configuration is only read at
/// startup.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let max_generation_days = env_or("MAX_GENERATION_DAYS", DEFAULT_MAX_GENERATION_DAYS);
        assert!(
            max_generation_days >= 0,
            "MAX_GENERATION_DAYS must not be negative"
        );

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:5173".to_string(),
            )),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            max_generation_days,
            jwt: JwtConfig::from_env(),
        }
    }
}
