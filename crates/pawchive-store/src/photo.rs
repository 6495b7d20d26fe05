//! Stray photo uploads

use crate::error::StoreError;
use crate::source::BlobStorage;
use chrono::Utc;

/// Content type guessed from the file extension
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Object name for an upload: `{unix_millis}-{file_name}`
///
/// Only the last path segment is kept and anything outside
/// `[A-Za-z0-9._-]` becomes `_`, so the name is safe as a single URL path
/// segment without further escaping.
#[must_use]
pub fn object_name(file_name: &str, unix_millis: i64) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        format!("{unix_millis}-upload")
    } else {
        format!("{unix_millis}-{cleaned}")
    }
}

/// Upload a photo and return its public URL
///
/// # Errors
/// - `StoreError::Config` for an empty file name
/// - Any error from the storage backend
pub async fn upload_photo(
    storage: &dyn BlobStorage,
    bucket: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, StoreError> {
    if file_name.trim().is_empty() {
        return Err(StoreError::Config("photo file name is empty".to_string()));
    }

    let object = object_name(file_name, Utc::now().timestamp_millis());
    storage
        .upload(bucket, &object, bytes, content_type_for(file_name))
        .await?;
    Ok(storage.public_url(bucket, &object))
}
