//! # Authentication Middleware
//!
//! Axum middleware for JWT token validation and user authentication.
//!
//! This middleware extracts and validates JWT tokens from the `Authorization` header,
//! then injects the authenticated [`CurrentUser`] into the request extensions.
//! The signing secret comes from the [`Config`] held in application state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use lib_web::middleware::require_auth;
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .route_layer(from_fn_with_state(state.clone(), require_auth))
//!     .with_state(state);
//! ```
//!
//! Handlers can then extract the caller using `Extension<CurrentUser>`:
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_web::middleware::CurrentUser;
//!
//! async fn protected_handler(Extension(user): Extension<CurrentUser>) -> String {
//!     format!("Hello, user {}!", user.username)
//! }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::decode_jwt;
use lib_core::{AppError, Config};
use tracing::{debug, warn};

/// Message for every authentication failure. The cause is only logged.
pub const AUTH_INVALID_MESSAGE: &str = "Authentication invalid";

/// Identity decoded from a valid bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Authentication middleware that validates JWT tokens.
///
/// # Behavior
///
/// - **Valid token**: Continues to next middleware/handler with [`CurrentUser`] in extensions
/// - **Missing header, no `Bearer ` prefix, bad signature, expired**: `401 Unauthorized`
pub async fn require_auth(
    State(config): State<Config>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let unauthenticated = || AppError::Unauthenticated(AUTH_INVALID_MESSAGE.to_string());

    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            unauthenticated()
        })?;

    // Extract Bearer token
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("[AUTH] Invalid Authorization header format");
        unauthenticated()
    })?;

    // Decode and validate JWT
    let claims = decode_jwt(token, &config.jwt_secret).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        unauthenticated()
    })?;

    let id = claims.user_id().map_err(|e| {
        warn!("[AUTH] {}", e);
        unauthenticated()
    })?;

    debug!("[AUTH] Authenticated user: {} (id: {})", claims.username, id);

    req.extensions_mut().insert(CurrentUser {
        id,
        username: claims.username,
    });

    Ok(next.run(req).await)
}
