//! # User Account Handlers
//!
//! HTTP request handlers for the `/api/v1/users` endpoints.
//!
//! ## Overview
//!
//! - Signup with username, email and password, returning a JWT
//! - Login with username and password
//! - Public profile lookup by username
//! - Profile update, account deletion and profile picture upload, each limited
//!   to the caller's own account
//!
//! Requests for another user's account are answered exactly like requests for
//! a missing account (`404 User not found`).

use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::upload::UploadStore;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use lib_auth::{encode_jwt, hash_password, verify_password};
use lib_core::dto::{
    AuthResponse, LoginRequest, SignupRequest, UpdateUserRequest, UploadResponse, UserInfo,
    UserMessageResponse, UserResponse,
};
use lib_core::error::parse_id;
use lib_core::model::store::models::{DeletedUser, User, UserForCreate, UserForUpdate};
use lib_core::model::store::UserRepository;
use lib_core::{AppError, Config, DbPool, Resource, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Signup handler - creates a new user account.
///
/// # Returns
///
/// * `201 Created` with [`AuthResponse`] - user created, JWT issued
/// * `400` - one or more fields failed validation (all messages joined)
/// * `409` - username or email already taken
#[instrument(skip_all)]
pub async fn signup(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("[SIGNUP] New user signup request");

    let valid = req.validate().inspect_err(|e| warn!("[SIGNUP] {}", e))?;
    debug!("[SIGNUP] Username: {}, email: {}", valid.username, valid.email);

    debug!("[SIGNUP] Hashing password...");
    let password_hash = hash_password(&valid.password)?;

    let user = UserRepository::create(
        &pool,
        UserForCreate {
            username: valid.username,
            email: valid.email,
            password_hash,
            location: valid.location,
            phone_number: valid.phone_number,
        },
    )
    .await
    .map_err(AppError::from)
    .inspect_err(|e| warn!("[SIGNUP] Failed to create user: {}", e))?;

    let token = issue_token(&user, &config)?;

    info!("[SIGNUP] User created: {} (id: {})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
            message: "Signup successful".to_string(),
        }),
    ))
}

/// Login handler - authenticates an existing user by username.
///
/// An unknown username and a wrong password produce the same `401` body.
#[instrument(skip_all)]
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (username, password) = req.validate()?;
    info!("[LOGIN] Login attempt for {}", username);

    let invalid = || AppError::Unauthenticated(INVALID_CREDENTIALS_MESSAGE.to_string());

    let user = UserRepository::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| {
            warn!("[LOGIN] Unknown username: {}", username);
            invalid()
        })?;

    if !verify_password(&password, &user.password_hash)? {
        warn!("[LOGIN] Invalid password for user: {}", user.username);
        return Err(invalid());
    }

    let token = issue_token(&user, &config)?;

    info!("[LOGIN] User authenticated: {} (id: {})", user.username, user.id);

    Ok(Json(AuthResponse {
        user: UserInfo::from(&user),
        token,
        message: "Login successful".to_string(),
    }))
}

/// Public profile by username. No authentication required.
#[instrument(skip(pool))]
pub async fn get_user_by_username(
    State(pool): State<DbPool>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::find_by_username(&pool, &username)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(Json(UserResponse {
        user: UserInfo::from(&user),
    }))
}

/// Update the caller's own profile.
///
/// A weak password is `400` on its own; other field problems are reported
/// together. A new password is re-hashed before it is stored.
#[instrument(skip(pool, current, req), fields(caller = current.id))]
pub async fn update_user(
    State(pool): State<DbPool>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<UserMessageResponse>> {
    let user_id = own_account(&current, &raw_id)?;

    let valid = req.validate().inspect_err(|e| warn!("[USER UPDATE] {}", e))?;

    let password_hash = match &valid.password {
        Some(password) => {
            debug!("[USER UPDATE] Re-hashing password");
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = UserRepository::update(&pool, user_id, valid.into_update(password_hash))
        .await?
        .ok_or_else(AppError::user_not_found)?;

    info!("[USER UPDATE] Updated user {}", user.id);

    Ok(Json(UserMessageResponse {
        message: "User updated successfully".to_string(),
        user: UserInfo::from(&user),
    }))
}

/// Delete the caller's own account.
///
/// Items the user reported go with the account, together with their image
/// files; claims the user made on other items are reopened.
#[instrument(skip(pool, uploads, current), fields(caller = current.id))]
pub async fn delete_user(
    State(pool): State<DbPool>,
    State(uploads): State<Arc<UploadStore>>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserMessageResponse>> {
    let user_id = own_account(&current, &raw_id)?;

    let DeletedUser { user, item_images } = UserRepository::delete(&pool, user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    if let Some(picture) = &user.profile_picture {
        uploads.remove(picture).await;
    }
    for file_name in &item_images {
        uploads.remove(file_name).await;
    }

    info!(
        "[USER DELETE] Deleted user {} ({}), {} item image(s) removed",
        user.id,
        user.username,
        item_images.len()
    );

    Ok(Json(UserMessageResponse {
        message: "User deleted successfully".to_string(),
        user: UserInfo::from(&user),
    }))
}

/// Store one JPEG/PNG as the caller's profile picture, replacing the old one.
#[instrument(skip(pool, uploads, current, multipart), fields(caller = current.id))]
pub async fn upload_profile_picture(
    State(pool): State<DbPool>,
    State(uploads): State<Arc<UploadStore>>,
    Extension(current): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let user_id = own_account(&current, &raw_id)?;

    let previous = UserRepository::find_by_id(&pool, user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?
        .profile_picture;

    let file_name = uploads.save_first(multipart).await?;

    let updated = UserRepository::update(
        &pool,
        user_id,
        UserForUpdate::new().profile_picture(Some(file_name.clone())),
    )
    .await;

    match updated {
        Ok(Some(_)) => {}
        Ok(None) => {
            uploads.remove(&file_name).await;
            return Err(AppError::user_not_found());
        }
        Err(e) => {
            uploads.remove(&file_name).await;
            return Err(e.into());
        }
    }

    if let Some(previous) = previous {
        uploads.remove(&previous).await;
    }

    info!("[PROFILE PICTURE] Stored {} for user {}", file_name, user_id);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Profile picture uploaded successfully".to_string(),
            files: vec![file_name],
        }),
    ))
}

/// Parse the path id and require it to be the caller's own.
fn own_account(current: &CurrentUser, raw_id: &str) -> Result<i64> {
    let user_id = parse_id(Resource::User, raw_id)?;
    if user_id != current.id {
        warn!("[USERS] User {} tried to act on account {}", current.id, user_id);
        return Err(AppError::user_not_found());
    }
    Ok(user_id)
}

fn issue_token(user: &User, config: &Config) -> Result<String> {
    let token = encode_jwt(
        user.id,
        user.username.clone(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests;
