//! # Web Library
//!
//! HTTP handlers, middleware, routes, and the upload service.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

#[cfg(test)]
mod test_utils;

pub use server::{build_router, start_server, AppState, ServerConfig};
