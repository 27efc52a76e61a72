//! # User Account Data Transfer Objects
//!
//! Request and response structures for the `/api/v1/users` endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/v1/users/signup` - [`SignupRequest`] -> [`AuthResponse`]
//! - `POST /api/v1/users/login` - [`LoginRequest`] -> [`AuthResponse`]
//! - `GET /api/v1/users/{username}` -> [`UserResponse`]
//! - `PUT /api/v1/users/{userId}` - [`UpdateUserRequest`] -> [`UserMessageResponse`]
//! - `DELETE /api/v1/users/{userId}` -> [`UserMessageResponse`]
//! - `POST /api/v1/users/{userId}/upload-profile-picture` (multipart) -> [`UploadResponse`]
//!
//! ## Wire Format
//!
//! All DTOs use **camelCase** field names in JSON. Request fields are optional at
//! the serde level so that a missing field is reported by validation together with
//! every other field problem, instead of as a JSON rejection.
//!
//! ```text
//! POST /api/v1/users/signup
//! Content-Type: application/json
//!
//! {
//!   "username": "alice",
//!   "email": "Alice@Example.com",
//!   "password": "Secret123",
//!   "phoneNumber": "+1 555 0100"
//! }
//! ```
//!
//! Response (201):
//! ```text
//! {
//!   "user": {
//!     "userId": 1,
//!     "username": "alice",
//!     "email": "alice@example.com",
//!     "phoneNumber": "+1 555 0100",
//!     "createdAt": "2024-01-01T00:00:00.000Z"
//!   },
//!   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!   "message": "Signup successful"
//! }
//! ```

use crate::error::{AppError, Result};
use crate::model::store::models::{User, UserForUpdate};
use lib_auth::{check_strength, PASSWORD_STRENGTH_MESSAGE};
use lib_utils::{
    format_time, validate_alphanumeric, validate_email, validate_length, validate_phone_number,
};
use serde::{Deserialize, Serialize};

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 50;

/// Signup request for new user registration.
///
/// # Validation Rules
///
/// - Username is required, trimmed, 3-50 characters, ASCII alphanumeric
/// - Email is required, trimmed, lowercased, valid format
/// - Password is required and must pass [`check_strength`]
/// - Location is optional and trimmed
/// - Phone number is optional and must be a valid phone number
///
/// Uniqueness of username and email is enforced by the database on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub location: Option<String>,
    pub phone_number: Option<String>,
}

/// Signup fields after validation and normalization. The password is still
/// plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub location: Option<String>,
    pub phone_number: Option<String>,
}

impl SignupRequest {
    /// Validate every field, collecting all failures into one
    /// [`AppError::Validation`].
    pub fn validate(self) -> Result<ValidSignup> {
        let mut errors = Vec::new();

        let username = match non_blank(self.username) {
            Some(username) => {
                check_username(&username, &mut errors);
                username
            }
            None => {
                errors.push("Please provide your username".to_string());
                String::new()
            }
        };

        let email = match non_blank(self.email) {
            Some(email) => {
                let email = email.to_lowercase();
                if let Err(msg) = validate_email(&email) {
                    errors.push(msg);
                }
                email
            }
            None => {
                errors.push("Please provide an email".to_string());
                String::new()
            }
        };

        let password = match self.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                if check_strength(&password).is_err() {
                    errors.push(PASSWORD_STRENGTH_MESSAGE.to_string());
                }
                password
            }
            None => {
                errors.push("Please provide a password".to_string());
                String::new()
            }
        };

        let location = non_blank(self.location);

        let phone_number = non_blank(self.phone_number);
        if let Some(phone) = &phone_number {
            if let Err(msg) = validate_phone_number(phone) {
                errors.push(msg);
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ValidSignup {
            username,
            email,
            password,
            location,
            phone_number,
        })
    }
}

/// Login request. Users log in with their username.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the trimmed username and the password.
    pub fn validate(self) -> Result<(String, String)> {
        match (non_blank(self.username), self.password.filter(|p| !p.is_empty())) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::BadRequest(
                "Please provide username and password".to_string(),
            )),
        }
    }
}

/// Profile update request. Absent fields are left unchanged; an empty
/// `location` or `phoneNumber` clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub location: Option<String>,
    pub phone_number: Option<String>,
}

/// Validated profile changes. `password` is plaintext and still has to be
/// hashed before it becomes part of a [`UserForUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidUserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub location: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
}

impl UpdateUserRequest {
    /// A weak password is rejected on its own as [`AppError::BadRequest`]
    /// before the other fields are looked at. Other field problems are
    /// collected into [`AppError::Validation`].
    pub fn validate(self) -> Result<ValidUserUpdate> {
        if let Some(password) = &self.password {
            check_strength(password)?;
        }

        let mut errors = Vec::new();

        let username = self.username.map(|u| u.trim().to_string());
        if let Some(username) = &username {
            check_username(username, &mut errors);
        }

        let email = self.email.map(|e| e.trim().to_lowercase());
        if let Some(email) = &email {
            if let Err(msg) = validate_email(email) {
                errors.push(msg);
            }
        }

        let location = self.location.map(|l| non_blank(Some(l)));

        let phone_number = self.phone_number.map(|p| non_blank(Some(p)));
        if let Some(Some(phone)) = &phone_number {
            if let Err(msg) = validate_phone_number(phone) {
                errors.push(msg);
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ValidUserUpdate {
            username,
            email,
            password: self.password,
            location,
            phone_number,
        })
    }
}

impl ValidUserUpdate {
    /// Build the repository update, given the hash of `self.password` if any.
    pub fn into_update(self, password_hash: Option<String>) -> UserForUpdate {
        UserForUpdate {
            username: self.username,
            email: self.email,
            password_hash,
            location: self.location,
            phone_number: self.phone_number,
            profile_picture: None,
        }
    }
}

/// Public user information. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            location: user.location.clone(),
            phone_number: user.phone_number.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: format_time(user.created_at),
        }
    }
}

/// Returned by signup (201) and login (200).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub user: UserInfo,
}

/// Returned by profile update and account deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: UserInfo,
}

/// Stored file names of an accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<String>,
}

/// Standard error body for all API endpoints.
///
/// ```json
/// { "error": "Authentication invalid", "code": "Unauthenticated" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_username(username: &str, errors: &mut Vec<String>) {
    if let Err(msg) = validate_length(username, USERNAME_MIN_LEN, USERNAME_MAX_LEN, "Username") {
        errors.push(msg);
    }
    if !username.is_empty() {
        if let Err(msg) = validate_alphanumeric(username, "Username") {
            errors.push(msg);
        }
    }
}
