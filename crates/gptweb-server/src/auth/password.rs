//! Password hashing with argon2id.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Errors from checking a password against a stored hash.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password does not match")]
    Mismatch,

    #[error("Stored password hash is unusable: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Hash a password with a fresh random salt into a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a PHC hash produced by [`hash_password`].
pub fn check_password(password: &str, hashed: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hashed).map_err(PasswordError::Hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
        Err(e) => Err(PasswordError::Hash(e)),
    }
}
