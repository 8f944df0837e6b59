//! Password hashing
//!
//! Account passwords are stored as Argon2id PHC strings with a random salt
//! per hash and the argon2 crate's default cost parameters.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password, returning the PHC string to store.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id() {
        let hash = hash_password("gallery-pass").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("gallery-pass"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("same").expect("Failed to hash password");
        let b = hash_password("same").expect("Failed to hash password");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_roundtrip() {
        let hash = hash_password("큐레이터🎨").expect("Failed to hash password");
        assert!(verify_password("큐레이터🎨", &hash).expect("Verification should not error"));
        assert!(!verify_password("visitor", &hash).expect("Verification should not error"));
    }

    #[test]
    fn test_verify_malformed_hash_errors() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
    }
}
