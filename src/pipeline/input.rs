//! Input resolution: turn a user-supplied image path or URL into validated
//! image bytes.
//!
//! Only png / jpg / jpeg are accepted. The extension (when the name has one)
//! and the sniffed content must both agree, and the header must decode far
//! enough to yield dimensions, so the model is never sent a file it cannot
//! read.

use crate::error::FormsError;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions accepted by the uploader.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Image format of an accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

/// A validated image ready to be encoded for the model.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name (or last URL segment) for display.
    pub name: String,
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
}

impl ImageUpload {
    /// Validate raw bytes as a png / jpeg image.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, FormsError> {
        let name = name.into();

        if let Some(ext) = Path::new(&name).extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(FormsError::UnsupportedImageType { name });
            }
        }

        let kind = match image::guess_format(&bytes) {
            Ok(ImageFormat::Png) => ImageKind::Png,
            Ok(ImageFormat::Jpeg) => ImageKind::Jpeg,
            Ok(_) => return Err(FormsError::UnsupportedImageType { name }),
            Err(e) => {
                return Err(FormsError::InvalidImage {
                    name,
                    detail: e.to_string(),
                })
            }
        };

        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| FormsError::InvalidImage {
                name: name.clone(),
                detail: e.to_string(),
            })?
            .into_dimensions()
            .map_err(|e| FormsError::InvalidImage {
                name: name.clone(),
                detail: e.to_string(),
            })?;

        debug!("Accepted {} ({:?}, {}x{}, {} bytes)", name, kind, width, height, bytes.len());

        Ok(Self {
            name,
            bytes,
            kind,
            width,
            height,
        })
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a validated image.
///
/// If the input is a URL, download it; otherwise read the local file.
pub async fn resolve_image(input: &str, timeout_secs: u64) -> Result<ImageUpload, FormsError> {
    let input = input.trim();
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<ImageUpload, FormsError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FormsError::PermissionDenied { path });
        }
        Err(_) => return Err(FormsError::ImageNotFound { path }),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());

    debug!("Read local image: {}", path.display());
    ImageUpload::from_bytes(name, bytes)
}

/// Download an image URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ImageUpload, FormsError> {
    info!("Downloading image from: {}", url);

    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }
    let client = builder.build().map_err(|e| FormsError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FormsError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            FormsError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(FormsError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FormsError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    ImageUpload::from_bytes(filename_from_url(url), bytes.to_vec())
}

/// Last path segment of the URL, or a generic name when there is none.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded-image".to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    pub(crate) fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(w, h, image::Rgb([0, 0, 0])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg).unwrap();
        buf
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/form.png"));
        assert!(is_url("http://example.com/form.png"));
        assert!(!is_url("/tmp/form.png"));
        assert!(!is_url("form.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn accepts_png_with_dimensions() {
        let up = ImageUpload::from_bytes("form.PNG", png_bytes(12, 7)).unwrap();
        assert_eq!(up.kind, ImageKind::Png);
        assert_eq!((up.width, up.height), (12, 7));
        assert_eq!(up.kind.mime_type(), "image/png");
    }

    #[test]
    fn accepts_jpeg_under_jpg_extension() {
        let up = ImageUpload::from_bytes("scan.jpg", jpeg_bytes(8, 8)).unwrap();
        assert_eq!(up.kind, ImageKind::Jpeg);
    }

    #[test]
    fn rejects_other_extensions() {
        let err = ImageUpload::from_bytes("form.gif", png_bytes(2, 2)).unwrap_err();
        assert!(matches!(err, FormsError::UnsupportedImageType { .. }));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = ImageUpload::from_bytes("form.png", b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, FormsError::InvalidImage { .. }));
    }

    #[test]
    fn extensionless_name_relies_on_content() {
        let up = ImageUpload::from_bytes("downloaded-image", png_bytes(3, 3)).unwrap();
        assert_eq!(up.kind, ImageKind::Png);
    }

    #[test]
    fn filename_from_url_uses_last_segment() {
        assert_eq!(filename_from_url("https://x.test/a/b/form.jpeg"), "form.jpeg");
        assert_eq!(filename_from_url("https://x.test/"), "downloaded-image");
    }

    #[tokio::test]
    async fn missing_local_file() {
        let err = resolve_image("/definitely/not/here.png", 5).await.unwrap_err();
        assert!(matches!(err, FormsError::ImageNotFound { .. }));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact.png");
        std::fs::write(&path, png_bytes(4, 5)).unwrap();
        let up = resolve_image(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(up.name, "contact.png");
        assert_eq!((up.width, up.height), (4, 5));
    }
}
