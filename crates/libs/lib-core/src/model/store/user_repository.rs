//! # User Repository
//!
//! Provides database access layer for user-related operations.
//!
//! This module implements the repository pattern for user data access,
//! providing a clean abstraction over SQL queries. Uniqueness of username and
//! email is enforced by the schema; a violation surfaces as a
//! `sqlx::Error::Database` that `AppError` turns into a conflict.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_memory_pool, UserRepository};
//! # use lib_core::model::store::models::UserForCreate;
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_memory_pool().await?;
//!
//! let user = UserRepository::create(&pool, UserForCreate {
//!     username: "alice".to_string(),
//!     email: "alice@example.com".to_string(),
//!     password_hash: "hashed_password".to_string(),
//!     location: None,
//!     phone_number: None,
//! }).await?;
//!
//! let found = UserRepository::find_by_username(&pool, "alice").await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

use super::models::{DeletedUser, User, UserForCreate, UserForUpdate};
use super::DbPool;
use lib_utils::now_utc;
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that id
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by their username.
    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Check whether a user id exists.
    pub async fn exists(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Username already exists (UNIQUE constraint violation)
    /// - Email already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &DbPool, user_data: UserForCreate) -> Result<User, sqlx::Error> {
        let now = now_utc();

        query_as::<_, User>(
            r#"
            INSERT INTO users
                (username, email, password_hash, location, phone_number, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&user_data.username)
        .bind(&user_data.email)
        .bind(&user_data.password_hash)
        .bind(&user_data.location)
        .bind(&user_data.phone_number)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Update an existing user using `UserForUpdate`.
    ///
    /// Only fields that are `Some` in `user_data` will be updated.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - The updated user
    /// * `Ok(None)` - No user with that id
    /// * `Err(sqlx::Error)` - Database error (including uniqueness violations)
    pub async fn update(
        pool: &DbPool,
        id: i64,
        user_data: UserForUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        if user_data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        // Build update query dynamically
        let mut updates = Vec::new();

        if user_data.username.is_some() {
            updates.push("username = ?");
        }
        if user_data.email.is_some() {
            updates.push("email = ?");
        }
        if user_data.password_hash.is_some() {
            updates.push("password_hash = ?");
        }
        if user_data.location.is_some() {
            updates.push("location = ?");
        }
        if user_data.phone_number.is_some() {
            updates.push("phone_number = ?");
        }
        if user_data.profile_picture.is_some() {
            updates.push("profile_picture = ?");
        }
        updates.push("updated_at = ?");

        let query_str = format!(
            "UPDATE users SET {} WHERE id = ? RETURNING *",
            updates.join(", ")
        );

        // Bind in the same order the SET clauses were pushed
        let mut query = query_as::<_, User>(&query_str);

        if let Some(ref username) = user_data.username {
            query = query.bind(username);
        }
        if let Some(ref email) = user_data.email {
            query = query.bind(email);
        }
        if let Some(ref password_hash) = user_data.password_hash {
            query = query.bind(password_hash);
        }
        if let Some(ref location) = user_data.location {
            query = query.bind(location);
        }
        if let Some(ref phone_number) = user_data.phone_number {
            query = query.bind(phone_number);
        }
        if let Some(ref profile_picture) = user_data.profile_picture {
            query = query.bind(profile_picture);
        }

        query.bind(now_utc()).bind(id).fetch_optional(pool).await
    }

    /// Delete a user account.
    ///
    /// Runs in one transaction: claims the user made on other items are
    /// reopened, then the user row is deleted (their reported items and
    /// those items' image rows cascade). The image file names are collected
    /// first so the caller can remove the files.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(DeletedUser))` - The deleted user and its items' image files
    /// * `Ok(None)` - No user with that id, nothing changed
    pub async fn delete(pool: &DbPool, id: i64) -> Result<Option<DeletedUser>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let item_images = sqlx::query_scalar::<_, String>(
            r#"
            SELECT item_images.file_name
            FROM item_images
            JOIN items ON items.id = item_images.item_id
            WHERE items.reported_by = ?
            ORDER BY item_images.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE items
            SET lost = 1, claimed_by = NULL, date_claimed = NULL,
                claim_confirmed = NULL, updated_at = ?
            WHERE claimed_by = ?
            "#,
        )
        .bind(now_utc())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(DeletedUser { user, item_images }))
    }
}
