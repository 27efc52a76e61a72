//! # HTTP Request Handlers
//!
//! Axum request handlers, one module per resource.
//!
//! ## Handler Modules
//!
//! - **[`users`]**: accounts and profile pictures
//!   - `POST /api/v1/users/signup` - Create an account, returns a JWT
//!   - `POST /api/v1/users/login` - Authenticate with username/password
//!   - `GET /api/v1/users/{username}` - Public profile
//!   - `PUT`/`DELETE /api/v1/users/{userId}` - Own account only
//!   - `POST /api/v1/users/{userId}/upload-profile-picture`
//!
//! - **[`items`]**: the lost item lifecycle and item images (all authenticated)
//!
//! ## Handler Architecture
//!
//! ```rust,ignore
//! async fn handler(
//!     State(pool): State<DbPool>,                   // Shared state
//!     Extension(current): Extension<CurrentUser>,   // Set by the auth middleware
//!     AppJson(req): AppJson<RequestBody>,           // Body, rejections become AppError
//! ) -> Result<Json<Response>> {
//!     // Handler logic...
//! }
//! ```
//!
//! Handlers return [`lib_core::Result`]; the error's `IntoResponse` picks the
//! status code and writes `{"error", "code"}`.

pub mod items;
pub mod users;
