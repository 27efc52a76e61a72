//! # Login Tests

use super::*;

#[tokio::test]
async fn test_login_success() {
    // Arrange
    let app = TestApp::new().await;
    let (id, _) = app.signup("alice").await;

    // Act
    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/users/login",
            None,
            json!({ "username": "alice", "password": TEST_PASSWORD }),
        ))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["userId"], id);
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = TestApp::new().await;
    app.signup("alice").await;

    let (wrong_status, wrong_password) = app
        .send(json_request(
            Method::POST,
            "/api/v1/users/login",
            None,
            json!({ "username": "alice", "password": "Wrong1234" }),
        ))
        .await;

    let (unknown_status, unknown_user) = app
        .send(json_request(
            Method::POST,
            "/api/v1/users/login",
            None,
            json!({ "username": "nobody", "password": TEST_PASSWORD }),
        ))
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_login_missing_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/users/login",
            None,
            json!({ "username": "alice" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide username and password");
}
