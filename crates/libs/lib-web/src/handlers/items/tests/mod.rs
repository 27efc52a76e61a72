//! # Item Handler Tests
//!
//! Test suite for the item lifecycle, ownership rules and image uploads.

mod images;

use crate::test_utils::{empty_request, json_request, TestApp};
use axum::http::{Method, StatusCode};
use serde_json::json;
