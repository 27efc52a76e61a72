use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data structure for creating a new user.
///
/// Fields must already be validated and normalized, and the password hashed.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub location: Option<String>,
    pub phone_number: Option<String>,
}

/// Data structure for updating an existing user.
///
/// Only `Some` fields are written. For the nullable columns the inner
/// `Option` is the new value, so `Some(None)` clears the column.
#[derive(Debug, Clone, Default)]
pub struct UserForUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub location: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub profile_picture: Option<Option<String>>,
}

impl UserForUpdate {
    /// Create a new empty `UserForUpdate` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the username.
    pub fn username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Set the email.
    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    /// Set the password hash.
    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    /// Set or clear the location.
    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = Some(location);
        self
    }

    /// Set or clear the phone number.
    pub fn phone_number(mut self, phone_number: Option<String>) -> Self {
        self.phone_number = Some(phone_number);
        self
    }

    /// Set or clear the profile picture file name.
    pub fn profile_picture(mut self, profile_picture: Option<String>) -> Self {
        self.profile_picture = Some(profile_picture);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.location.is_none()
            && self.phone_number.is_none()
            && self.profile_picture.is_none()
    }
}

/// Lost-and-found item.
///
/// `lost == false` implies `claimed_by` and `date_claimed` are set; the
/// schema's CHECK constraint rejects any write breaking that.
#[derive(Debug, Clone, FromRow)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub lost: bool,
    pub reported_by: i64,
    pub date_reported: DateTime<Utc>,
    pub claimed_by: Option<i64>,
    pub date_claimed: Option<DateTime<Utc>>,
    pub claim_confirmed: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn is_claim_confirmed(&self) -> bool {
        self.claim_confirmed.unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct ItemForCreate {
    pub title: String,
    pub description: String,
    pub location: String,
    pub reported_by: i64,
}

/// Reporter-editable fields. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ItemForUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl ItemForUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.location.is_none()
    }
}

/// Image file attached to an item.
#[derive(Debug, Clone, FromRow)]
pub struct ItemImage {
    pub id: i64,
    pub item_id: i64,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A deleted account and the stored files that went with it.
#[derive(Debug, Clone)]
pub struct DeletedUser {
    pub user: User,
    /// Image files of the items the user reported.
    pub item_images: Vec<String>,
}
