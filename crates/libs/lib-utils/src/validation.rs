//! # Validation Utilities
//!
//! Input validation helpers shared by the signup and profile update paths.
//!
//! Every helper returns `Err(message)` with a user-facing message so callers can
//! collect several failures and report them together.

use regex::Regex;
use std::sync::LazyLock;

/// Local part without quoting, then a dotted domain ending in a 2+ letter TLD.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[^\s@<>()\[\]\\.,;:"]+(\.[^\s@<>()\[\]\\.,;:"]+)*@([A-Za-z0-9-]+\.)+[A-Za-z]{2,}$"#)
        .expect("email pattern is valid")
});

const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a string's length (in characters) is within `min..=max`.
pub fn validate_length(
    value: &str,
    min: usize,
    max: usize,
    field_name: &str,
) -> Result<(), String> {
    let len = value.chars().count();
    if len < min || len > max {
        Err(format!("{} must be between {} and {} characters", field_name, min, max))
    } else {
        Ok(())
    }
}

/// Validate that a string only contains ASCII letters and digits.
pub fn validate_alphanumeric(value: &str, field_name: &str) -> Result<(), String> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(format!("{} must be alphanumeric", field_name))
    }
}

/// Validate email format.
pub fn validate_email(email: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err("Please provide a valid email".to_string())
    }
}

/// Validate a phone number.
///
/// Accepts an optional leading `+` followed by 7 to 15 digits. Spaces, dashes,
/// dots and parentheses are allowed as separators.
pub fn validate_phone_number(phone: &str) -> Result<(), String> {
    let invalid = || Err("Please provide a valid phone number".to_string());

    let body = phone.trim();
    let body = body.strip_prefix('+').unwrap_or(body);

    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return invalid(),
        }
    }

    if (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        Ok(())
    } else {
        invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(validate_not_empty("wallet", "Title").is_ok());
        assert_eq!(
            validate_not_empty("   ", "Title").unwrap_err(),
            "Title cannot be empty"
        );
    }

    #[test]
    fn test_length_bounds() {
        assert!(validate_length("abc", 3, 50, "Username").is_ok());
        assert!(validate_length("ab", 3, 50, "Username").is_err());
        assert!(validate_length(&"a".repeat(51), 3, 50, "Username").is_err());
        assert!(validate_length(&"a".repeat(50), 3, 50, "Username").is_ok());
    }

    #[test]
    fn test_alphanumeric() {
        assert!(validate_alphanumeric("alice42", "Username").is_ok());
        assert!(validate_alphanumeric("alice_42", "Username").is_err());
        assert!(validate_alphanumeric("alice 42", "Username").is_err());
        assert!(validate_alphanumeric("", "Username").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice.smith@mail.example.org").is_ok());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("alice.example.com").is_err());
        assert!(validate_email("alice@@example.com").is_err());
        assert!(validate_email("al ice@example.com").is_err());
    }

    #[test]
    fn test_phone_number() {
        assert!(validate_phone_number("+1 (555) 123-4567").is_ok());
        assert!(validate_phone_number("5551234").is_ok());
        assert!(validate_phone_number("555-12").is_err());
        assert!(validate_phone_number("555-CALL-NOW").is_err());
        assert!(validate_phone_number("+1234567890123456").is_err());
    }
}
