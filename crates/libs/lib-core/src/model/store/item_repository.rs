//! # Item Repository
//!
//! Database access for lost-and-found items and their images.
//!
//! Every lifecycle transition is a single conditional statement whose `WHERE`
//! clause carries the ownership rule, so "not found" and "not yours" are the
//! same outcome (`None` / `false`) for callers. Transitions are not serialized
//! against each other: two concurrent claims both succeed and the last one wins.

use super::models::{Item, ItemForCreate, ItemForUpdate, ItemImage};
use super::DbPool;
use lib_utils::now_utc;
use sqlx::query_as;

pub struct ItemRepository;

impl ItemRepository {
    /// Insert a newly reported item. `lost` defaults to true and the report
    /// date is now.
    pub async fn create(pool: &DbPool, item: ItemForCreate) -> Result<Item, sqlx::Error> {
        let now = now_utc();

        query_as::<_, Item>(
            r#"
            INSERT INTO items
                (title, description, location, lost, reported_by, date_reported, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.location)
        .bind(item.reported_by)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Item>, sqlx::Error> {
        query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an item only if `reporter_id` reported it.
    pub async fn find_owned(
        pool: &DbPool,
        id: i64,
        reporter_id: i64,
    ) -> Result<Option<Item>, sqlx::Error> {
        query_as::<_, Item>("SELECT * FROM items WHERE id = ? AND reported_by = ?")
            .bind(id)
            .bind(reporter_id)
            .fetch_optional(pool)
            .await
    }

    /// All items, oldest report first.
    pub async fn list_all(pool: &DbPool) -> Result<Vec<Item>, sqlx::Error> {
        query_as::<_, Item>("SELECT * FROM items ORDER BY date_reported ASC, id ASC")
            .fetch_all(pool)
            .await
    }

    /// Items reported by one user, oldest report first.
    pub async fn list_by_reporter(
        pool: &DbPool,
        reporter_id: i64,
    ) -> Result<Vec<Item>, sqlx::Error> {
        query_as::<_, Item>(
            "SELECT * FROM items WHERE reported_by = ? ORDER BY date_reported ASC, id ASC",
        )
        .bind(reporter_id)
        .fetch_all(pool)
        .await
    }

    /// Apply reporter edits.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Item))` - The updated item
    /// * `Ok(None)` - No item with that id reported by `reporter_id`
    pub async fn update_owned(
        pool: &DbPool,
        id: i64,
        reporter_id: i64,
        changes: ItemForUpdate,
    ) -> Result<Option<Item>, sqlx::Error> {
        if changes.is_empty() {
            return Self::find_owned(pool, id, reporter_id).await;
        }

        let mut updates = Vec::new();
        if changes.title.is_some() {
            updates.push("title = ?");
        }
        if changes.description.is_some() {
            updates.push("description = ?");
        }
        if changes.location.is_some() {
            updates.push("location = ?");
        }
        updates.push("updated_at = ?");

        let query_str = format!(
            "UPDATE items SET {} WHERE id = ? AND reported_by = ? RETURNING *",
            updates.join(", ")
        );

        let mut query = query_as::<_, Item>(&query_str);
        if let Some(ref title) = changes.title {
            query = query.bind(title);
        }
        if let Some(ref description) = changes.description {
            query = query.bind(description);
        }
        if let Some(ref location) = changes.location {
            query = query.bind(location);
        }

        query
            .bind(now_utc())
            .bind(id)
            .bind(reporter_id)
            .fetch_optional(pool)
            .await
    }

    /// Record `claimer_id` as the claimer: `lost` becomes false and the claim
    /// date is now. An existing claim is overwritten.
    pub async fn claim(
        pool: &DbPool,
        id: i64,
        claimer_id: i64,
    ) -> Result<Option<Item>, sqlx::Error> {
        let now = now_utc();

        query_as::<_, Item>(
            r#"
            UPDATE items
            SET lost = 0, claimed_by = ?, date_claimed = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(claimer_id)
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Reporter confirms the current claim.
    pub async fn confirm_claim(
        pool: &DbPool,
        id: i64,
        reporter_id: i64,
    ) -> Result<Option<Item>, sqlx::Error> {
        query_as::<_, Item>(
            r#"
            UPDATE items
            SET claim_confirmed = 1, updated_at = ?
            WHERE id = ? AND reported_by = ?
            RETURNING *
            "#,
        )
        .bind(now_utc())
        .bind(id)
        .bind(reporter_id)
        .fetch_optional(pool)
        .await
    }

    /// Reporter deletes an item whose claim has not been confirmed.
    ///
    /// Returns `false` when nothing matched.
    pub async fn delete_by_reporter(
        pool: &DbPool,
        id: i64,
        reporter_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM items
            WHERE id = ? AND reported_by = ? AND COALESCE(claim_confirmed, 0) = 0
            "#,
        )
        .bind(id)
        .bind(reporter_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Confirmed claimer deletes the item.
    ///
    /// Returns `false` when nothing matched.
    pub async fn delete_confirmed_by_claimer(
        pool: &DbPool,
        id: i64,
        claimer_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM items WHERE id = ? AND claimed_by = ? AND claim_confirmed = 1",
        )
        .bind(id)
        .bind(claimer_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach stored image files to an item, all or none.
    pub async fn add_images(
        pool: &DbPool,
        item_id: i64,
        file_names: &[String],
    ) -> Result<Vec<ItemImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let now = now_utc();

        let mut images = Vec::with_capacity(file_names.len());
        for file_name in file_names {
            let image = query_as::<_, ItemImage>(
                r#"
                INSERT INTO item_images (item_id, file_name, uploaded_at)
                VALUES (?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(item_id)
            .bind(file_name)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            images.push(image);
        }

        tx.commit().await?;
        Ok(images)
    }

    pub async fn list_images(pool: &DbPool, item_id: i64) -> Result<Vec<ItemImage>, sqlx::Error> {
        query_as::<_, ItemImage>("SELECT * FROM item_images WHERE item_id = ? ORDER BY id ASC")
            .bind(item_id)
            .fetch_all(pool)
            .await
    }
}
