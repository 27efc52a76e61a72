//! # Item Data Transfer Objects
//!
//! Request and response structures for the `/api/v1/items` endpoints.
//!
//! ## Lifecycle
//!
//! ```text
//! POST   /api/v1/items                       reported   (lost = true)
//! PUT    /api/v1/items/{itemId}/claim        claimed    (lost = false, claimedBy, dateClaimed)
//! PUT    /api/v1/items/{itemId}/confirmClaim confirmed  (claimConfirmed = true)
//! DELETE /api/v1/items/{itemId}/deleteClaim  deleted by the confirmed claimer
//! ```
//!
//! ## JSON Example
//!
//! ```text
//! {
//!   "message": "The item has been successfully claimed.",
//!   "item": {
//!     "itemId": 3,
//!     "title": "Wallet",
//!     "description": "black leather",
//!     "location": "Park Ave",
//!     "lost": false,
//!     "reportedBy": 1,
//!     "dateReported": "2024-01-01T09:00:00.000Z",
//!     "claimedBy": 2,
//!     "dateClaimed": "2024-01-02T17:30:00.000Z",
//!     "claimConfirmed": null,
//!     "createdAt": "2024-01-01T09:00:00.000Z",
//!     "updatedAt": "2024-01-02T17:30:00.000Z"
//!   }
//! }
//! ```

use crate::error::{AppError, Result};
use crate::model::store::models::{Item, ItemForCreate, ItemForUpdate, ItemImage};
use lib_utils::{format_time, validate_not_empty};
use serde::{Deserialize, Serialize};

/// Shown instead of an empty list when a reporter exists but has no items.
pub const NO_REPORTED_ITEMS_MESSAGE: &str = "This user has not reported any items yet.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl CreateItemRequest {
    /// Check the required fields and attach the reporter.
    ///
    /// Missing and blank fields are both reported, all at once.
    pub fn validate(self, reported_by: i64) -> Result<ItemForCreate> {
        let mut errors = Vec::new();

        let mut required = |value: Option<String>, message: &str| -> String {
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    errors.push(message.to_string());
                    String::new()
                }
            }
        };

        let title = required(self.title, "Please provide an item title");
        let description = required(self.description, "Please provide an item description");
        let location = required(
            self.location,
            "Please enter the location where the item was lost",
        );

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ItemForCreate {
            title,
            description,
            location,
            reported_by,
        })
    }
}

/// Reporter edits. Only these three fields can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl UpdateItemRequest {
    /// A field that is present but empty is a [`AppError::BadRequest`].
    pub fn validate(self) -> Result<ItemForUpdate> {
        let fields = [
            (&self.title, "Title"),
            (&self.description, "Description"),
            (&self.location, "Location"),
        ];
        for (value, name) in fields {
            if let Some(value) = value {
                validate_not_empty(value, name).map_err(AppError::BadRequest)?;
            }
        }

        Ok(ItemForUpdate {
            title: self.title.map(|v| v.trim().to_string()),
            description: self.description.map(|v| v.trim().to_string()),
            location: self.location.map(|v| v.trim().to_string()),
        })
    }
}

/// Item as sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    pub item_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub lost: bool,
    pub reported_by: i64,
    pub date_reported: String,
    pub claimed_by: Option<i64>,
    pub date_claimed: Option<String>,
    pub claim_confirmed: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Item> for ItemInfo {
    fn from(item: &Item) -> Self {
        Self {
            item_id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            location: item.location.clone(),
            lost: item.lost,
            reported_by: item.reported_by,
            date_reported: format_time(item.date_reported),
            claimed_by: item.claimed_by,
            date_claimed: item.date_claimed.map(format_time),
            claim_confirmed: item.claim_confirmed,
            created_at: format_time(item.created_at),
            updated_at: format_time(item.updated_at),
        }
    }
}

/// Single item with the file names of its uploaded images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse {
    pub item: ItemInfo,
    pub images: Vec<String>,
}

impl ItemResponse {
    pub fn new(item: &Item, images: &[ItemImage]) -> Self {
        Self {
            item: item.into(),
            images: images.iter().map(|i| i.file_name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemListResponse {
    pub items: Vec<ItemInfo>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ItemListResponse {
    pub fn new(items: &[Item]) -> Self {
        Self {
            items: items.iter().map(ItemInfo::from).collect(),
            count: items.len(),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemMessageResponse {
    pub message: String,
    pub item: ItemInfo,
}

impl ItemMessageResponse {
    pub fn new(message: &str, item: &Item) -> Self {
        Self {
            message: message.to_string(),
            item: item.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_all_fields() {
        let request = CreateItemRequest {
            title: Some("  ".to_string()),
            description: None,
            location: Some("Park Ave".to_string()),
        };

        assert_eq!(
            request.validate(1).unwrap_err().user_message(),
            "Please provide an item title, Please provide an item description"
        );
    }

    #[test]
    fn test_create_attaches_reporter() {
        let request = CreateItemRequest {
            title: Some("Wallet".to_string()),
            description: Some("black leather".to_string()),
            location: Some(" Park Ave ".to_string()),
        };

        let item = request.validate(42).unwrap();
        assert_eq!(item.reported_by, 42);
        assert_eq!(item.location, "Park Ave");
    }

    #[test]
    fn test_update_rejects_empty_field() {
        let request = UpdateItemRequest {
            description: Some(String::new()),
            ..Default::default()
        };

        let err = request.validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.user_message(), "Description cannot be empty");
    }

    #[test]
    fn test_update_keeps_absent_fields_unset() {
        let request = UpdateItemRequest {
            title: Some("Brown wallet".to_string()),
            ..Default::default()
        };

        let changes = request.validate().unwrap();
        assert_eq!(changes.title.as_deref(), Some("Brown wallet"));
        assert!(changes.description.is_none());
        assert!(changes.location.is_none());
    }
}
