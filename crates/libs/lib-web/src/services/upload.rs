//! # Upload Service
//!
//! Stores multipart image uploads in the configured upload directory.
//!
//! ## Rules
//!
//! - Only `image/jpeg` and `image/png` parts are accepted. The content type is
//!   checked before anything is written.
//! - Each file may be at most [`MAX_FILE_BYTES`]. Bodies are streamed chunk by
//!   chunk, and a file crossing the limit is removed before the error returns.
//! - Stored names are `<unix-millis>-<original name>`, where the original name
//!   is reduced to its final path component and to `[A-Za-z0-9._-]`. Files
//!   are created exclusively; a name that is already taken becomes
//!   `<unix-millis>-<n>-<original name>`.
//! - If any file of a request fails, files already stored for that request are
//!   removed as well.
//!
//! ```text
//! UploadStore::save_all(multipart) → ["1714000000000-front.jpg", "1714000000001-back.png"]
//! ```

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use lib_core::{AppError, Result};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Per-file size limit (5 MiB).
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

pub const INVALID_TYPE_MESSAGE: &str = "Only JPEG and PNG files are allowed";

const MAX_NAME_ATTEMPTS: u32 = 1000;

const NO_FILE_MESSAGE: &str = "Please upload at least one JPEG or PNG file";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_file_bytes: MAX_FILE_BYTES,
        }
    }

    #[cfg(test)]
    fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Store every file part of the request.
    ///
    /// Parts without a file name (plain form fields) are skipped. A request
    /// without any file part is a [`AppError::BadRequest`].
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub async fn save_all(&self, mut multipart: Multipart) -> Result<Vec<String>> {
        let mut stored = Vec::new();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    self.remove_all(&stored).await;
                    return Err(multipart_error(e));
                }
            };

            if field.file_name().is_none() {
                debug!("[UPLOAD] Skipping non-file part {:?}", field.name());
                continue;
            }

            match self.save_field(field).await {
                Ok(name) => stored.push(name),
                Err(e) => {
                    self.remove_all(&stored).await;
                    return Err(e);
                }
            }
        }

        if stored.is_empty() {
            return Err(AppError::BadRequest(NO_FILE_MESSAGE.to_string()));
        }

        info!("[UPLOAD] Stored {} file(s)", stored.len());
        Ok(stored)
    }

    /// Store the first file part of the request and ignore the rest.
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub async fn save_first(&self, mut multipart: Multipart) -> Result<String> {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.file_name().is_some() {
                let name = self.save_field(field).await?;
                info!("[UPLOAD] Stored {}", name);
                return Ok(name);
            }
        }

        Err(AppError::BadRequest(NO_FILE_MESSAGE.to_string()))
    }

    /// Remove a previously stored file. Missing files are not an error.
    pub async fn remove(&self, file_name: &str) {
        let path = self.dir.join(file_name);
        match fs::remove_file(&path).await {
            Ok(()) => debug!("[UPLOAD] Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("[UPLOAD] Failed to remove {}: {}", path.display(), e),
        }
    }

    async fn save_field(&self, mut field: Field<'_>) -> Result<String> {
        check_content_type(field.content_type())?;

        let (name, mut file) = self
            .create_unique(field.file_name().unwrap_or_default())
            .await?;
        let path = self.dir.join(&name);

        let mut written = 0usize;
        let outcome = loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break Ok(()),
                Err(e) => break Err(multipart_error(e)),
            };

            written += chunk.len();
            if written > self.max_file_bytes {
                break Err(AppError::PayloadTooLarge(format!(
                    "File too large, the maximum size is {} MB",
                    self.max_file_bytes / (1024 * 1024)
                )));
            }

            if let Err(e) = file.write_all(&chunk).await {
                break Err(AppError::Internal(format!("Failed to write {}: {}", path.display(), e)));
            }
        };

        let outcome = match outcome {
            Ok(()) => file.flush().await.map_err(|e| {
                AppError::Internal(format!("Failed to flush {}: {}", path.display(), e))
            }),
            Err(e) => Err(e),
        };
        drop(file);

        if let Err(e) = outcome {
            warn!("[UPLOAD] Rejected {}: {}", name, e);
            self.remove(&name).await;
            return Err(e);
        }

        debug!("[UPLOAD] Wrote {} ({} bytes)", path.display(), written);
        Ok(name)
    }

    /// Create a new file for `original` without touching existing ones.
    ///
    /// A taken name gets a counter after the timestamp:
    /// `<millis>-<n>-<name>`.
    async fn create_unique(&self, original: &str) -> Result<(String, fs::File)> {
        let base = stored_name(original);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                base.clone()
            } else {
                numbered_name(&base, attempt)
            };
            let path = self.dir.join(&name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((name, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("[UPLOAD] {} taken, retrying", name);
                }
                Err(e) => {
                    return Err(AppError::Internal(format!(
                        "Failed to create {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        Err(AppError::Internal(format!(
            "No free file name for {} after {} attempts",
            base, MAX_NAME_ATTEMPTS
        )))
    }

    /// Remove every file in `stored`.
    pub async fn remove_all(&self, stored: &[String]) {
        for name in stored {
            self.remove(name).await;
        }
    }
}

fn check_content_type(content_type: Option<&str>) -> Result<()> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match essence {
        Some(ct) if ALLOWED_CONTENT_TYPES.contains(&ct.as_str()) => Ok(()),
        _ => Err(AppError::BadRequest(INVALID_TYPE_MESSAGE.to_string())),
    }
}

/// `<unix-millis>-<sanitized original name>`.
pub fn stored_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.');
    let sanitized = if sanitized.is_empty() { "upload" } else { sanitized };

    format!("{}-{}", lib_utils::now_utc().timestamp_millis(), sanitized)
}

/// `<millis>-<name>` → `<millis>-<n>-<name>`.
fn numbered_name(base: &str, n: u32) -> String {
    match base.split_once('-') {
        Some((millis, rest)) => format!("{millis}-{n}-{rest}"),
        None => format!("{n}-{base}"),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{multipart_request, Part};
    use axum::extract::FromRequest;
    use std::path::Path;

    async fn multipart(parts: &[Part]) -> Multipart {
        Multipart::from_request(multipart_request("/", parts), &())
            .await
            .expect("valid multipart request")
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_stored_name_sanitizes() {
        let name = stored_name("../../etc/pass wd.png");
        let (millis, rest) = name.split_once('-').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest, "pass_wd.png");

        assert!(stored_name("C:\\photos\\cat.jpg").ends_with("-cat.jpg"));
        assert!(stored_name("..").ends_with("-upload"));
    }

    #[test]
    fn test_content_type_check() {
        assert!(check_content_type(Some("image/png")).is_ok());
        assert!(check_content_type(Some("IMAGE/JPEG; charset=binary")).is_ok());
        assert!(check_content_type(Some("image/gif")).is_err());
        assert!(check_content_type(None).is_err());
    }

    #[tokio::test]
    async fn test_save_all_stores_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let stored = store
            .save_all(multipart(&[
                Part::file("images", "front.jpg", "image/jpeg", b"jpeg-bytes".to_vec()),
                Part::text("note", "ignored"),
                Part::file("images", "back.png", "image/png", b"png-bytes".to_vec()),
            ]).await)
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored[0].ends_with("-front.jpg"));
        assert!(stored[1].ends_with("-back.png"));
        assert_eq!(std::fs::read(dir.path().join(&stored[0])).unwrap(), b"jpeg-bytes");
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("1714000000000-photo.jpg", 3), "1714000000000-3-photo.jpg");
    }

    #[tokio::test]
    async fn test_same_name_parts_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let parts: Vec<Part> = (0..20u8)
            .map(|i| Part::file("images", "photo.jpg", "image/jpeg", vec![i; 8]))
            .collect();

        let stored = store.save_all(multipart(&parts).await).await.unwrap();

        assert_eq!(stored.len(), 20);
        assert_eq!(files_in(dir.path()).len(), 20);
        for (i, name) in stored.iter().enumerate() {
            assert!(name.ends_with("-photo.jpg"));
            assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), vec![i as u8; 8]);
        }
    }

    #[tokio::test]
    async fn test_existing_file_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let (first, _) = store.create_unique("cat.png").await.unwrap();
        let (second, _) = store.create_unique("cat.png").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(files_in(dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_type_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let err = store
            .save_all(
                multipart(&[Part::file("images", "notes.txt", "text/plain", b"hello".to_vec())])
                    .await,
            )
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), INVALID_TYPE_MESSAGE);
        assert!(files_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).with_max_file_bytes(1024);

        let err = store
            .save_all(multipart(&[
                Part::file("images", "small.png", "image/png", vec![1u8; 16]),
                Part::file("images", "big.png", "image/png", vec![0u8; 1025]),
            ]).await)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert!(files_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_no_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let err = store
            .save_first(multipart(&[Part::text("note", "no files here")]).await)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
