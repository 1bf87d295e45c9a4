use std::env;

use anyhow::{Context, Result, anyhow, ensure};
use dotenvy::dotenv;

/// Upper bound for `ACCESS_TOKEN_TTL`, one year in seconds.
const MAX_ACCESS_TOKEN_TTL: usize = 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    /// MySQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_host: String,
    pub port: u16,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_auth_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let access_token_ttl = parse_or(&lookup, "ACCESS_TOKEN_TTL", 3600)?; // default 1 hour
        ensure!(
            (1..=MAX_ACCESS_TOKEN_TTL).contains(&access_token_ttl),
            "ACCESS_TOKEN_TTL must be between 1 and {MAX_ACCESS_TOKEN_TTL} seconds"
        );

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            jwt_secret,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            access_token_ttl,

            rate_auth_per_min: parse_or(&lookup, "RATE_AUTH_PER_MIN", 60)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::INFO)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
