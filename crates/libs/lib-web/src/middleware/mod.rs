//! # Middleware
//!
//! Axum middleware for authentication, request stamping, logging and response mapping.
//!
//! ## Modules
//!
//! - **[`mw_auth`]**: JWT authentication middleware
//! - **[`mw_req_stamp`]**: Request ID and timestamp stamping
//! - **[`mw_logging`]**: Request/response logging
//! - **[`mw_res_map`]**: JSON error bodies for framework-generated failures

// region: --- Modules
pub mod mw_auth;
pub mod mw_logging;
pub mod mw_req_stamp;
pub mod mw_res_map;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::{require_auth, CurrentUser, AUTH_INVALID_MESSAGE};
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp, REQUEST_ID_HEADER};
pub use mw_res_map::map_res;
// endregion: --- Re-exports
