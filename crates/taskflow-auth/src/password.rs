//! Salted Argon2id password digests with a configurable cost

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Cost applied when none is configured (`BCRYPT_ROUNDS` defaults to 10)
pub const DEFAULT_HASH_ROUNDS: u32 = 10;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash cost must be at least 1, got {0}")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

fn hasher(rounds: u32) -> Result<Argon2<'static>, PasswordError> {
    if rounds == 0 {
        return Err(PasswordError::InvalidCost(rounds));
    }
    let params = Params::new(Params::DEFAULT_M_COST, rounds, Params::DEFAULT_P_COST, None)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Produce a PHC string for `password` using `rounds` Argon2 passes
///
/// Each call draws a fresh salt.
///
/// ```
/// use taskflow_auth::password::hash_password;
///
/// let digest = hash_password("Demo@123", 2).unwrap();
/// assert!(digest.starts_with("$argon2id$v=19$"));
/// ```
pub fn hash_password(password: &str, rounds: u32) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher(rounds)?
        .hash_password(password.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string
///
/// Cost parameters come from the stored string, so digests made with any number of
/// rounds still verify. A mismatch is `Ok(false)`, not an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let digest =
        PasswordHash::new(stored).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &digest) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}
