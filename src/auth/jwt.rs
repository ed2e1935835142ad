use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    pub iat: i64, // issued at (unix timestamp)
    pub exp: i64, // expires at (unix timestamp)
}

/// HS256 signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl } = &state.config.jwt;
        Self::new(secret, *ttl)
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn sign(&self, email: &str) -> anyhow::Result<String> {
        self.sign_at(email, OffsetDateTime::now_utc())
    }

    fn sign_at(&self, email: &str, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let ttl = TimeDuration::try_from(self.ttl).context("token lifetime out of range")?;
        let exp = issued_at
            .checked_add(ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            email: email.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%email, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Rejects bad signatures and anything past `exp`, with no leeway.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(email = %data.claims.email, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[test]
    fn sign_and_verify_carries_email() {
        let keys = make_keys();
        let token = keys.sign("ada@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = make_keys().sign("ada@example.com").unwrap();
        let other = JwtKeys::new("another-secret", Duration::from_secs(300));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign("ada@example.com").unwrap();
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        let keys = JwtKeys::new("test-secret", Duration::from_secs(100_000_000 * 86_400));
        assert!(keys.sign("ada@example.com").is_err());

        let keys = JwtKeys::new("test-secret", Duration::from_secs(u64::MAX));
        assert!(keys.sign("ada@example.com").is_err());
    }

    #[test]
    fn token_valid_until_expiry_only() {
        let keys = JwtKeys::new("test-secret", Duration::from_secs(60));
        let now = OffsetDateTime::now_utc();

        let fresh = keys.sign_at("ada@example.com", now - TimeDuration::seconds(30)).unwrap();
        assert!(keys.verify(&fresh).is_ok());

        let stale = keys.sign_at("ada@example.com", now - TimeDuration::seconds(120)).unwrap();
        let err = keys.verify(&stale).unwrap_err();
        let kind = err
            .downcast_ref::<jsonwebtoken::errors::Error>()
            .map(|e| e.kind().clone());
        assert_eq!(kind, Some(jsonwebtoken::errors::ErrorKind::ExpiredSignature));
    }
}
