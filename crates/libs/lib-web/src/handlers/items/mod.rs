//! # Item Handlers
//!
//! HTTP request handlers for the `/api/v1/items` endpoints. Every route here
//! sits behind the authentication middleware.
//!
//! ## Lifecycle
//!
//! ```text
//! reported ──claim──▶ claimed ──confirmClaim──▶ confirmed ──deleteClaim──▶ deleted
//!    │                   │
//!    └──── delete (reporter, before confirmation) ────▶ deleted
//! ```
//!
//! Ownership rules live in the repository's `WHERE` clauses: a request on an
//! item the caller may not touch gets the same 404 as a missing item.

use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::upload::UploadStore;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use lib_core::dto::{
    CreateItemRequest, ItemListResponse, ItemMessageResponse, ItemResponse, MessageResponse,
    UpdateItemRequest, UploadResponse, NO_REPORTED_ITEMS_MESSAGE,
};
use lib_core::error::parse_id;
use lib_core::model::store::{ItemRepository, UserRepository};
use lib_core::{AppError, DbPool, Resource, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Report a lost item. The caller becomes the reporter.
#[instrument(skip_all, fields(caller = current.id))]
pub async fn create_item(
    State(pool): State<DbPool>,
    Extension(current): Extension<CurrentUser>,
    AppJson(req): AppJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemMessageResponse>)> {
    let new_item = req
        .validate(current.id)
        .inspect_err(|e| warn!("[ITEM CREATE] {}", e))?;

    let item = ItemRepository::create(&pool, new_item).await?;

    info!("[ITEM CREATE] Item {} reported by user {}", item.id, current.id);

    Ok((
        StatusCode::CREATED,
        Json(ItemMessageResponse::new("The item has been created.", &item)),
    ))
}

/// Single item with its uploaded image file names.
#[instrument(skip(pool))]
pub async fn get_item(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
) -> Result<Json<ItemResponse>> {
    let item_id = parse_id(Resource::Item, &raw_id)?;

    let item = ItemRepository::find_by_id(&pool, item_id)
        .await?
        .ok_or_else(|| AppError::item_not_found(item_id))?;

    let images = ItemRepository::list_images(&pool, item_id).await?;

    Ok(Json(ItemResponse::new(&item, &images)))
}

/// Every item, oldest report first.
#[instrument(skip_all)]
pub async fn get_all_items(State(pool): State<DbPool>) -> Result<Json<ItemListResponse>> {
    let items = ItemRepository::list_all(&pool).await?;
    debug!("[ITEM LIST] {} item(s)", items.len());

    Ok(Json(ItemListResponse::new(&items)))
}

/// Items reported by one user. An existing user without items is not an
/// error; the response then carries a message instead.
#[instrument(skip(pool))]
pub async fn get_items_by_user(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
) -> Result<Json<ItemListResponse>> {
    let user_id = parse_id(Resource::User, &raw_id)?;

    if !UserRepository::exists(&pool, user_id).await? {
        return Err(AppError::NotFound(format!(
            "The user with id:{} was not found.",
            user_id
        )));
    }

    let items = ItemRepository::list_by_reporter(&pool, user_id).await?;

    let mut response = ItemListResponse::new(&items);
    if items.is_empty() {
        response.message = Some(NO_REPORTED_ITEMS_MESSAGE.to_string());
    }

    Ok(Json(response))
}

/// Reporter edits title, description or location.
#[instrument(skip(pool, current, req), fields(caller = current.id))]
pub async fn update_item(
    State(pool): State<DbPool>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    AppJson(req): AppJson<UpdateItemRequest>,
) -> Result<Json<ItemMessageResponse>> {
    let item_id = parse_id(Resource::Item, &raw_id)?;
    let changes = req.validate()?;

    let item = ItemRepository::update_owned(&pool, item_id, current.id, changes)
        .await?
        .ok_or_else(|| AppError::item_not_found(item_id))?;

    info!("[ITEM UPDATE] Item {} updated", item.id);

    Ok(Json(ItemMessageResponse::new("The item has been updated.", &item)))
}

/// Any authenticated user may claim any item. A later claim replaces an
/// earlier one.
#[instrument(skip(pool, current), fields(caller = current.id))]
pub async fn claim_item(
    State(pool): State<DbPool>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<ItemMessageResponse>> {
    let item_id = parse_id(Resource::Item, &raw_id)?;

    let item = ItemRepository::claim(&pool, item_id, current.id)
        .await?
        .ok_or_else(|| AppError::item_not_found(item_id))?;

    info!("[ITEM CLAIM] Item {} claimed by user {}", item.id, current.id);

    Ok(Json(ItemMessageResponse::new(
        "The item has been successfully claimed.",
        &item,
    )))
}

#[instrument(skip(pool, current), fields(caller = current.id))]
pub async fn confirm_claim(
    State(pool): State<DbPool>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<ItemMessageResponse>> {
    let item_id = parse_id(Resource::Item, &raw_id)?;

    let item = ItemRepository::confirm_claim(&pool, item_id, current.id)
        .await?
        .ok_or_else(|| AppError::item_not_found(item_id))?;

    info!("[ITEM CONFIRM] Claim on item {} confirmed", item.id);

    Ok(Json(ItemMessageResponse::new(
        "The claim of this item has successfully been confirmed.",
        &item,
    )))
}

/// Reporter deletes an item whose claim is not confirmed yet.
#[instrument(skip(pool, uploads, current), fields(caller = current.id))]
pub async fn delete_item(
    State(pool): State<DbPool>,
    State(uploads): State<Arc<UploadStore>>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let item_id = parse_id(Resource::Item, &raw_id)?;

    let images = ItemRepository::list_images(&pool, item_id).await?;
    if !ItemRepository::delete_by_reporter(&pool, item_id, current.id).await? {
        return Err(AppError::item_not_found(item_id));
    }

    for image in &images {
        uploads.remove(&image.file_name).await;
    }

    info!("[ITEM DELETE] Item {} deleted by reporter", item_id);

    Ok(Json(MessageResponse {
        message: "The item has been deleted.".to_string(),
    }))
}

/// Confirmed claimer deletes the item.
#[instrument(skip(pool, uploads, current), fields(caller = current.id))]
pub async fn delete_confirmed_item(
    State(pool): State<DbPool>,
    State(uploads): State<Arc<UploadStore>>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let item_id = parse_id(Resource::Item, &raw_id)?;

    let images = ItemRepository::list_images(&pool, item_id).await?;
    if !ItemRepository::delete_confirmed_by_claimer(&pool, item_id, current.id).await? {
        return Err(AppError::item_not_found(item_id));
    }

    for image in &images {
        uploads.remove(&image.file_name).await;
    }

    info!("[ITEM DELETE] Item {} deleted by confirmed claimer", item_id);

    Ok(Json(MessageResponse {
        message: "The item has been deleted.".to_string(),
    }))
}

/// Attach JPEG/PNG images to an item. Reporter only.
#[instrument(skip(pool, uploads, current, multipart), fields(caller = current.id))]
pub async fn upload_item_images(
    State(pool): State<DbPool>,
    State(uploads): State<Arc<UploadStore>>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let item_id = parse_id(Resource::Item, &raw_id)?;

    ItemRepository::find_owned(&pool, item_id, current.id)
        .await?
        .ok_or_else(|| AppError::item_not_found(item_id))?;

    let files = uploads.save_all(multipart).await?;

    if let Err(e) = ItemRepository::add_images(&pool, item_id, &files).await {
        uploads.remove_all(&files).await;
        return Err(e.into());
    }

    info!("[ITEM IMAGES] {} image(s) added to item {}", files.len(), item_id);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Images uploaded successfully".to_string(),
            files,
        }),
    ))
}

#[cfg(test)]
mod tests;
