use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// An image picked by the user, read into memory for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read an image from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_for_extension(path).to_string();
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadMetadata {
    #[serde(rename = "imageId")]
    pub image_id: i64,
}

/// Upload endpoint response.
///
/// The image service answers `{ "imageId": 1, ... }`; the signup flow's
/// upload function wraps it as `{ "metadata": { "imageId": 1 }, "s3Url": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UploadedImage {
    Flat {
        #[serde(rename = "imageId")]
        image_id: i64,
    },
    Wrapped {
        metadata: UploadMetadata,
    },
}

impl UploadedImage {
    pub fn image_id(&self) -> i64 {
        match self {
            UploadedImage::Flat { image_id } => *image_id,
            UploadedImage::Wrapped { metadata } => metadata.image_id,
        }
    }
}
