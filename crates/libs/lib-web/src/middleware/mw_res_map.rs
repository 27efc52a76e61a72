//! # Response Mapping Middleware
//!
//! Rewrites error responses that did not come from [`AppError`] into the same
//! `{"error", "code"}` JSON body.
//!
//! Axum and tower-http produce plain-text or empty bodies for unmatched methods,
//! rejected extractors and oversized requests. Responses that already carry a
//! JSON body pass through untouched.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use lib_core::dto::ErrorResponse;
use lib_core::error::INTERNAL_ERROR_MESSAGE;
use tracing::{debug, error};

/// Plain-text error bodies from the framework are short.
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

pub async fn map_res(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status.is_client_error() || status.is_server_error()) || is_json(&res) {
        return res;
    }

    let (parts, body) = res.into_parts();
    let text = to_bytes(body, MAX_ERROR_BODY_BYTES)
        .await
        .map(|b| String::from_utf8_lossy(&b).trim().to_string())
        .unwrap_or_default();

    let message = error_message(status, text);
    if status.is_server_error() {
        error!("[RESPONSE MAP] {} rewritten to JSON", status);
    } else {
        debug!("[RESPONSE MAP] {} rewritten to JSON: {}", status, message);
    }

    let body = ErrorResponse::new(message, error_code(status));
    let mut mapped = (status, Json(body)).into_response();

    // Keep headers such as `Allow` from the original response.
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            mapped.headers_mut().insert(name.clone(), value.clone());
        }
    }

    mapped
}

fn is_json(res: &Response<Body>) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn error_message(status: StatusCode, text: String) -> String {
    if status.is_server_error() {
        return INTERNAL_ERROR_MESSAGE.to_string();
    }
    match status {
        StatusCode::NOT_FOUND => "Route does not exist".to_string(),
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed".to_string(),
        StatusCode::PAYLOAD_TOO_LARGE if text.is_empty() => "Request body too large".to_string(),
        _ if text.is_empty() => status
            .canonical_reason()
            .unwrap_or("Bad request")
            .to_string(),
        _ => text,
    }
}

fn error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "Unauthenticated",
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::METHOD_NOT_ALLOWED => "MethodNotAllowed",
        StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLarge",
        s if s.is_server_error() => "Internal",
        _ => "BadRequest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_for_framework_statuses() {
        assert_eq!(
            error_message(StatusCode::METHOD_NOT_ALLOWED, String::new()),
            "Method not allowed"
        );
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, "missing field `x`".to_string()),
            "missing field `x`"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream said no".to_string()),
            INTERNAL_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(StatusCode::PAYLOAD_TOO_LARGE), "PayloadTooLarge");
        assert_eq!(error_code(StatusCode::UNSUPPORTED_MEDIA_TYPE), "BadRequest");
        assert_eq!(error_code(StatusCode::INTERNAL_SERVER_ERROR), "Internal");
    }
}
