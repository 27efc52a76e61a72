//! # Utilities Library
//!
//! Shared utility functions for environment variables, time, and field validation.

pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_or, get_env_parse, get_env_parse_or};
pub use time::{format_time, now_utc};
pub use validation::{
    validate_alphanumeric, validate_email, validate_length, validate_not_empty,
    validate_phone_number,
};
