use std::ops::RangeInclusive;

use serde::Deserialize;

pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24;
pub const DEFAULT_REMEMBER_DAYS: i64 = 7;
pub const TTL_MINUTES_RANGE: RangeInclusive<i64> = 1..=60 * 24 * 365;
pub const REMEMBER_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of a browser-scoped session token.
    pub ttl_minutes: i64,
    /// Lifetime of token and cookie when "remember me" is checked.
    pub remember_days: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "homebudget".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "homebudget-web".into()),
            ttl_minutes: parse_bounded(
                std::env::var("SESSION_TTL_MINUTES").ok().as_deref(),
                TTL_MINUTES_RANGE,
                DEFAULT_TTL_MINUTES,
            ),
            remember_days: parse_bounded(
                std::env::var("SESSION_REMEMBER_DAYS").ok().as_deref(),
                REMEMBER_DAYS_RANGE,
                DEFAULT_REMEMBER_DAYS,
            ),
            secure_cookie: std::env::var("SESSION_SECURE_COOKIE")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        };
        Ok(Self {
            database_url,
            session,
        })
    }
}

/// Unparseable or out-of-range values fall back to `default`.
fn parse_bounded(value: Option<&str>, range: RangeInclusive<i64>, default: i64) -> i64 {
    match value.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(v) if range.contains(&v) => v,
        Some(v) => {
            tracing::warn!(value = v, ?range, default, "session lifetime out of range");
            default
        }
        None => default,
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_cookie_flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn session_lifetimes_fall_back_to_defaults() {
        let huge = (i64::MAX / 2).to_string();
        assert_eq!(
            parse_bounded(Some(&huge), REMEMBER_DAYS_RANGE, DEFAULT_REMEMBER_DAYS),
            DEFAULT_REMEMBER_DAYS
        );
        assert_eq!(
            parse_bounded(Some("0"), TTL_MINUTES_RANGE, DEFAULT_TTL_MINUTES),
            DEFAULT_TTL_MINUTES
        );
        assert_eq!(
            parse_bounded(Some("soon"), TTL_MINUTES_RANGE, DEFAULT_TTL_MINUTES),
            DEFAULT_TTL_MINUTES
        );
        assert_eq!(parse_bounded(None, REMEMBER_DAYS_RANGE, DEFAULT_REMEMBER_DAYS), 7);
        assert_eq!(parse_bounded(Some(" 30 "), REMEMBER_DAYS_RANGE, DEFAULT_REMEMBER_DAYS), 30);
    }
}
