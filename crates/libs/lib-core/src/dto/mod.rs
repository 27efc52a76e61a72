//! # Data Transfer Objects (DTOs)
//!
//! Request and response bodies of the REST API. Request DTOs also carry the
//! field validation that runs before anything is written.

pub mod item;
pub mod user;

pub use item::*;
pub use user::*;
