use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;

/// 8 days.
pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 8;
/// 10 years; keeps `now + ttl` far inside `OffsetDateTime`'s range.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 366 * 10;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: parse_secret(std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?)?,
            algorithm: parse_algorithm(
                &std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            )?,
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );
        Ok(Self {
            database_url,
            jwt,
            cors_origins,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

/// Only shared-secret algorithms make sense with a single `JWT_SECRET`.
pub fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let alg = Algorithm::from_str(raw.trim())
        .map_err(|e| anyhow::anyhow!("unknown JWT_ALGORITHM {raw:?}: {e}"))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => anyhow::bail!("JWT_ALGORITHM {other:?} needs a key pair; use HS256/HS384/HS512"),
    }
}

fn parse_secret(raw: String) -> anyhow::Result<String> {
    if raw.trim().is_empty() {
        anyhow::bail!("JWT_SECRET must not be empty");
    }
    Ok(raw)
}

/// Unset means the default; anything else must be a whole number of minutes in range.
fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TTL_MINUTES);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("JWT_TTL_MINUTES must be a positive integer, got {raw:?}"))?;
    if minutes <= 0 {
        anyhow::bail!("JWT_TTL_MINUTES must be a positive integer, got {minutes}");
    }
    if minutes > MAX_TTL_MINUTES {
        anyhow::bail!("JWT_TTL_MINUTES must be at most {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
