//! Image upload.
//!
//! - POST /api/upload - multipart field `image`; JPEG, PNG or GIF only
//!
//! The type is decided by the file's leading bytes, never by the client's
//! filename or content type. Files are stored under a fresh UUID name and
//! served back from `/uploads/<name>`.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// `FF D8 FF`
    Jpeg,
    /// `89 50 4E 47 0D 0A 1A 0A`
    Png,
    /// `GIF87a` or `GIF89a`
    Gif,
}

impl ImageKind {
    /// Identify an image by its magic bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

/// A stored upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL, `/uploads/<filename>`
    pub url: String,
    /// Stored file name
    pub filename: String,
    /// Size in bytes
    pub file_size: usize,
    /// Sniffed MIME type
    pub mime_type: &'static str,
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Image is too large")
    } else {
        AppError::bad_request(err.body_text())
    }
}

/// Store an uploaded image.
///
/// # Errors
///
/// - 400 if the request is not multipart, has no `image` field, or the
///   file is not JPEG, PNG or GIF
/// - 413 if the file exceeds the configured limit
/// - 500 if the file cannot be written
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut multipart = multipart.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let limits = &state.config.upload;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        if field.name() == Some("image") {
            image = Some(field.bytes().await.map_err(|e| multipart_error(&e))?);
            break;
        }
    }
    let bytes = image.ok_or_else(|| AppError::bad_request("No image file provided"))?;

    if bytes.len() > limits.max_bytes {
        return Err(AppError::payload_too_large(format!(
            "Image exceeds the {} byte limit",
            limits.max_bytes
        )));
    }
    let kind = ImageKind::sniff(&bytes).ok_or_else(|| {
        AppError::bad_request("Invalid file type. Only JPEG, PNG, and GIF are allowed")
    })?;

    let filename = format!("{}.{}", Uuid::new_v4(), kind.extension());
    let path = limits.dir.join(&filename);
    let write = async {
        tokio::fs::create_dir_all(&limits.dir).await?;
        tokio::fs::write(&path, &bytes).await
    };
    write.await.map_err(|e| {
        AppError::internal("Failed to save image").with_source(
            anyhow::Error::new(e).context(format!("writing {}", path.display())),
        )
    })?;

    tracing::info!(filename = %filename, size = bytes.len(), mime_type = kind.mime_type(), "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: format!("/uploads/{filename}"),
            filename,
            file_size: bytes.len(),
            mime_type: kind.mime_type(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), Some(ImageKind::Jpeg));
        assert_eq!(
            ImageKind::sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::sniff(b"GIF89a\x01\x00"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::sniff(b"GIF87a"), Some(ImageKind::Gif));
    }

    #[test]
    fn test_sniff_rejects_everything_else() {
        assert_eq!(ImageKind::sniff(b""), None);
        assert_eq!(ImageKind::sniff(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"), None);
        assert_eq!(ImageKind::sniff(b"%PDF-1.7"), None);
        // truncated PNG signature
        assert_eq!(ImageKind::sniff(&[0x89, 0x50, 0x4E, 0x47]), None);
    }

    #[test]
    fn test_extension_matches_mime() {
        assert_eq!(ImageKind::Png.extension(), "png");
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
    }
}
