use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

lazy_static! {
    // Verified against when the user does not exist, so both login failures cost one Argon2 run.
    static ref DUMMY_HASH: String =
        hash_password("kuyumcu-timing-equaliser").unwrap_or_default();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Whether `hash` is a PHC string this module can verify. Hashes carried over
/// from older data files (bcrypt `$2a$...`) are not.
pub fn is_argon2_hash(hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| parsed.algorithm.as_str().starts_with("argon2"))
        .unwrap_or(false)
}

/// Checks `plain` against the stored hash, or against a throwaway hash when
/// there is no stored user. A hash that cannot be parsed never matches.
pub fn check_credentials(plain: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(plain, hash).unwrap_or_else(|e| {
            warn!(error = %e, "stored password hash unusable");
            false
        }),
        None => {
            let _ = verify_password(plain, &DUMMY_HASH);
            false
        }
    }
}
