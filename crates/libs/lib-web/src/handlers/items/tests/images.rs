//! # Item Image Upload Tests

use super::*;
use crate::services::upload::MAX_FILE_BYTES;
use crate::test_utils::{multipart_request, with_bearer, Part};

#[tokio::test]
async fn test_upload_images_listed_on_item() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("alice").await;
    let item_id = app.create_item(&token, "Wallet").await;

    let (status, body) = app
        .send(with_bearer(
            multipart_request(
                &format!("/api/v1/items/{item_id}/upload-item-images"),
                &[
                    Part::file("images", "front.jpg", "image/jpeg", b"front".to_vec()),
                    Part::file("images", "back.png", "image/png", b"back".to_vec()),
                ],
            ),
            &token,
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let files: Vec<String> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap().to_string())
        .collect();
    assert_eq!(files.len(), 2);

    let (_, body) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/v1/items/{item_id}"),
            Some(&token),
        ))
        .await;
    assert_eq!(body["images"], json!(files));

    // Deleting the item removes its files
    app.send(empty_request(
        Method::DELETE,
        &format!("/api/v1/items/{item_id}"),
        Some(&token),
    ))
    .await;
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_upload_text_file_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("alice").await;
    let item_id = app.create_item(&token, "Wallet").await;

    let (status, body) = app
        .send(with_bearer(
            multipart_request(
                &format!("/api/v1/items/{item_id}/upload-item-images"),
                &[Part::file("images", "notes.txt", "text/plain", b"hello".to_vec())],
            ),
            &token,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only JPEG and PNG files are allowed");
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_upload_oversized_image() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("alice").await;
    let item_id = app.create_item(&token, "Wallet").await;

    let (status, body) = app
        .send(with_bearer(
            multipart_request(
                &format!("/api/v1/items/{item_id}/upload-item-images"),
                &[Part::file("images", "huge.png", "image/png", vec![0u8; MAX_FILE_BYTES + 1])],
            ),
            &token,
        ))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PayloadTooLarge");
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("alice").await;
    let item_id = app.create_item(&token, "Wallet").await;

    let (status, _) = app
        .send(with_bearer(
            multipart_request(
                &format!("/api/v1/items/{item_id}/upload-item-images"),
                &[Part::text("caption", "my wallet")],
            ),
            &token,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_to_someone_elses_item() {
    let app = TestApp::new().await;
    let (_, alice_token) = app.signup("alice").await;
    let (_, bob_token) = app.signup("bob").await;
    let item_id = app.create_item(&alice_token, "Wallet").await;

    let (status, _) = app
        .send(with_bearer(
            multipart_request(
                &format!("/api/v1/items/{item_id}/upload-item-images"),
                &[Part::file("images", "front.jpg", "image/jpeg", b"front".to_vec())],
            ),
            &bob_token,
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_upload_many_parts_with_same_name() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("alice").await;
    let item_id = app.create_item(&token, "Wallet").await;

    let parts: Vec<Part> = (0..20)
        .map(|_| Part::file("images", "photo.jpg", "image/jpeg", b"photo".to_vec()))
        .collect();

    let (status, body) = app
        .send(with_bearer(
            multipart_request(&format!("/api/v1/items/{item_id}/upload-item-images"), &parts),
            &token,
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 20);
    assert_eq!(app.uploaded_files().len(), 20);

    let (_, body) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/v1/items/{item_id}"),
            Some(&token),
        ))
        .await;
    assert_eq!(body["images"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_same_name_on_two_items_kept_apart() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("alice").await;
    let first = app.create_item(&token, "Wallet").await;
    let second = app.create_item(&token, "Keys").await;

    for item_id in [first, second] {
        let (status, _) = app
            .send(with_bearer(
                multipart_request(
                    &format!("/api/v1/items/{item_id}/upload-item-images"),
                    &[Part::file("images", "photo.jpg", "image/jpeg", b"photo".to_vec())],
                ),
                &token,
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Removing one item's image leaves the other's in place
    app.send(empty_request(
        Method::DELETE,
        &format!("/api/v1/items/{first}"),
        Some(&token),
    ))
    .await;

    let (_, body) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/v1/items/{second}"),
            Some(&token),
        ))
        .await;
    assert_eq!(app.uploaded_files(), vec![body["images"][0].as_str().unwrap().to_string()]);
}
