//! # Password Hashing
//!
//! Password strength checks, hashing and verification using Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Message returned whenever a password fails [`check_strength`].
pub const PASSWORD_STRENGTH_MESSAGE: &str = "Password must be at least 8 characters long and contain at least one digit, one lowercase letter, and one uppercase letter";

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{}", PASSWORD_STRENGTH_MESSAGE)]
    WeakPassword,

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to parse hash: {0}")]
    InvalidHash(String),
}

/// Check that a password has at least 8 characters, one digit, one lowercase
/// and one uppercase letter.
pub fn check_strength(password: &str) -> Result<(), Error> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());

    if long_enough && has_digit && has_lower && has_upper {
        Ok(())
    } else {
        Err(Error::WeakPassword)
    }
}

/// Hash a password using the Argon2 algorithm.
///
/// The password must pass [`check_strength`] first.
pub fn hash_password(password: &str) -> Result<String, Error> {
    check_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Hash(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::InvalidHash(e.to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "TestPassword123";
        let hash = hash_password(password)
            .expect("Password hashing should succeed for valid password");

        assert!(verify_password(password, &hash)
            .expect("Password verification should succeed for correct password"));
        assert!(!verify_password("WrongPassword1", &hash)
            .expect("Password verification should fail for incorrect password"));
    }

    #[test]
    fn test_password_too_short() {
        let result = hash_password("Ab1");

        assert_eq!(result.expect_err("Hash should fail for short password"), Error::WeakPassword);
    }

    #[test]
    fn test_strength_rules() {
        assert!(check_strength("Password1").is_ok());
        assert_eq!(check_strength("password1"), Err(Error::WeakPassword));
        assert_eq!(check_strength("PASSWORD1"), Err(Error::WeakPassword));
        assert_eq!(check_strength("Passwordd"), Err(Error::WeakPassword));
    }

    #[test]
    fn test_weak_password_message() {
        assert_eq!(Error::WeakPassword.to_string(), PASSWORD_STRENGTH_MESSAGE);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("Password1", "not-a-hash"),
            Err(Error::InvalidHash(_))
        ));
    }
}
