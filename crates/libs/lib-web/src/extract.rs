//! # Extractors
//!
//! [`AppJson`] behaves like [`axum::Json`] but rejects with [`AppError`], so a
//! malformed body produces the same JSON error shape as every other failure.

use axum::extract::FromRequest;
use lib_core::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
