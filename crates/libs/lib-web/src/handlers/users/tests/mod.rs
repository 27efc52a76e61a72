//! # User Handler Tests
//!
//! Test suite for signup, login and account management.

mod login;

use crate::test_utils::{empty_request, json_request, TestApp, TEST_PASSWORD};
use axum::http::{Method, StatusCode};
use serde_json::json;
