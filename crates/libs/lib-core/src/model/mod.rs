//! # Model Layer
//!
//! Persistence types and repositories.

pub mod store;
