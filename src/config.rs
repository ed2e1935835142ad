use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("PORT") {
            Ok(v) => v.parse::<u16>().with_context(|| format!("invalid PORT {v:?}"))?,
            Err(_) => 5000,
        };
        let expires_in = std::env::var("EXPIRES_IN").unwrap_or_else(|_| "1h".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            ttl: parse_expires_in(&expires_in)?,
        };
        Ok(Self {
            database_url,
            host,
            port,
            jwt,
        })
    }
}

/// Longest token lifetime accepted from configuration.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Parses a token lifetime in the `ms` notation used by `EXPIRES_IN`:
/// a number followed by an optional unit, e.g. `90s`, `15m`, `2.5h`,
/// `7 days`, `1w`, `1y`, `100ms`. A bare number is seconds.
pub fn parse_expires_in(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let amount: f64 = number
        .parse()
        .with_context(|| format!("invalid EXPIRES_IN {raw:?}"))?;
    let secs_per_unit: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 0.001,
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600.0,
        "d" | "day" | "days" => 86_400.0,
        "w" | "week" | "weeks" => 604_800.0,
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600.0,
        other => anyhow::bail!("invalid EXPIRES_IN unit {other:?}"),
    };
    let secs = amount * secs_per_unit;
    if secs <= 0.0 {
        anyhow::bail!("EXPIRES_IN must be positive");
    }
    if secs > MAX_TOKEN_TTL.as_secs_f64() {
        anyhow::bail!("EXPIRES_IN {raw:?} exceeds {} seconds", MAX_TOKEN_TTL.as_secs());
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("invalid EXPIRES_IN {raw:?}"))
}
