use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id memory cost in KiB.
pub const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2id passes over memory.
pub const TIME_COST: u32 = 2;
/// Argon2id lanes.
pub const PARALLELISM: u32 = 1;

lazy_static! {
    /// Fixed hash verified for unknown emails.
    static ref DUMMY_HASH: Option<String> = hash_password("techedge-dummy-password").ok();
}

fn hasher() -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None).map_err(|e| {
        error!(error = %e, "argon2 params error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes with a fresh random salt; the result is a self-describing PHC string.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
/// Cost parameters are read from the stored hash.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(hasher()?
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs a full verification against a fixed hash and always reports a
/// mismatch. Used for logins with an unknown email.
pub fn verify_against_dummy(plain: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
    false
}
