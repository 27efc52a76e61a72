//! # Authentication Library
//!
//! Password strength rules, password hashing, and JWT token management.

pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use pwd::{check_strength, hash_password, verify_password, PASSWORD_STRENGTH_MESSAGE};
pub use token::{decode_jwt, encode_jwt, Claims};
