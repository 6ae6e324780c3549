/// Image storage for post attachments
///
/// Uploads arrive base64-encoded in the JSON payload. A file must decode as
/// a raster image or validation fails with no persistence side effect. Each
/// stored upload gets one derived rendition (the 960x339 display crop);
/// deleting a post releases both the original and the rendition.
use base64::{engine::general_purpose, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Post;

const RENDITION_WIDTH: u32 = 960;
const RENDITION_HEIGHT: u32 = 339;

/// Paths (relative to the media root) of a stored upload.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub image_path: String,
    pub rendition_path: String,
}

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

/// Decode a base64 payload field into raw bytes.
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(content)
        .map_err(|_| AppError::Validation("image: not valid base64 data".to_string()))
}

/// Decode raw bytes as a raster image, or fail validation.
pub fn decode_image(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
    let format = image::guess_format(bytes)
        .map_err(|_| AppError::Validation("image: not a decodable image".to_string()))?;
    let img = image::load_from_memory(bytes)
        .map_err(|_| AppError::Validation("image: not a decodable image".to_string()))?;
    Ok((img, format))
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate and persist an upload plus its display rendition.
    /// Decoding and encoding run on the blocking pool.
    pub async fn store(&self, bytes: Vec<u8>) -> Result<StoredImage> {
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || -> Result<StoredImage> {
            let (img, format) = decode_image(&bytes)?;

            let ext = format.extensions_str().first().copied().unwrap_or("img");
            let stem = Uuid::new_v4();
            let image_rel = format!("posts/{stem}.{ext}");
            let rendition_rel = format!("renditions/{stem}.jpg");

            let image_abs = root.join(&image_rel);
            let rendition_abs = root.join(&rendition_rel);

            for path in [&image_abs, &rendition_abs] {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| AppError::Internal(format!("media dir: {e}")))?;
                }
            }

            std::fs::write(&image_abs, &bytes)
                .map_err(|e| AppError::Internal(format!("media write: {e}")))?;

            let rendition =
                img.resize_to_fill(RENDITION_WIDTH, RENDITION_HEIGHT, FilterType::Lanczos3);
            rendition
                .to_rgb8()
                .save(&rendition_abs)
                .map_err(|e| AppError::Internal(format!("rendition write: {e}")))?;

            Ok(StoredImage {
                image_path: image_rel,
                rendition_path: rendition_rel,
            })
        })
        .await
        .map_err(|e| AppError::Internal(format!("media task: {e}")))?
    }

    /// Best-effort removal of a post's stored files. Missing files are fine;
    /// other failures are logged, never surfaced.
    pub fn remove(&self, post: &Post) {
        for rel in [&post.image_path, &post.rendition_path] {
            let Some(rel) = rel else { continue };
            self.remove_file(rel);
        }
    }

    /// Discard a freshly stored upload whose row never made it to the
    /// database, so a failed write leaves no orphans on disk.
    pub fn discard(&self, stored: &StoredImage) {
        self.remove_file(&stored.image_path);
        self.remove_file(&stored.rendition_path);
    }

    fn remove_file(&self, rel: &str) {
        let path = self.root.join(rel);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::new_rgb8(4, 4);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_a_real_image() {
        let (img, format) = decode_image(&png_bytes()).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(img.width(), 4);
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = decode_image(b"just some text file").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(decode_base64("!!!not-base64!!!").is_err());
    }

    #[tokio::test]
    async fn store_then_remove() {
        let root = std::env::temp_dir().join(format!("pulse-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&root);

        let stored = store.store(png_bytes()).await.unwrap();
        assert!(root.join(&stored.image_path).exists());
        assert!(root.join(&stored.rendition_path).exists());

        let post = Post {
            id: Uuid::new_v4(),
            text: "t".into(),
            pub_date: Utc::now(),
            author_id: Uuid::new_v4(),
            group_id: None,
            image_path: Some(stored.image_path.clone()),
            rendition_path: Some(stored.rendition_path.clone()),
        };
        store.remove(&post);
        assert!(!root.join(&stored.image_path).exists());
        assert!(!root.join(&stored.rendition_path).exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn store_rejects_non_image() {
        let root = std::env::temp_dir().join(format!("pulse-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&root);

        assert!(store.store(b"definitely not an image".to_vec()).await.is_err());
        // Nothing may be left behind on a failed upload.
        assert!(!root.join("posts").exists());
    }
}
