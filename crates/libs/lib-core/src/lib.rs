//! # Core Library
//!
//! Core models, database, configuration, error taxonomy and DTOs for the application.

pub mod config;
pub mod error;
pub mod model;
pub mod dto;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Resource, Result};
pub use model::store::{create_memory_pool, create_pool, run_migrations, DbPool};
