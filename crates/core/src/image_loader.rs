//! Image loading and encoding utilities.
//!
//! This module turns a user-selected file into an [`EncodedImage`], the
//! base64 representation that is shown as a preview and sent to the
//! Gemini API.
//!
//! # Upload policy
//!
//! The upload area advertises a 10 MB limit and image-only files. Both
//! checks are enforced by [`UploadPolicy`] unless `enforce` is switched off,
//! in which case any readable file is accepted and sent as `image/jpeg`.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// MIME type assumed for bytes whose format cannot be detected.
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// File extensions offered by the file picker.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Size and type restrictions applied when loading a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Largest accepted file, in bytes.
    pub max_bytes: u64,
    /// When false, neither size nor type is checked.
    pub enforce: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enforce: true,
        }
    }
}

/// An uploaded photo held in memory as base64 text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    mime_type: String,
    data: String,
    file_name: Option<String>,
    byte_len: usize,
}

impl EncodedImage {
    /// Encodes raw bytes with the given MIME type.
    pub fn new(bytes: &[u8], mime_type: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
            file_name,
            byte_len: bytes.len(),
        }
    }

    /// Parses a `data:<mime>;base64,<payload>` URI.
    ///
    /// A string without a comma is taken to be the bare base64 payload of a
    /// JPEG image.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (mime_type, payload) = match uri.split_once(',') {
            Some((header, payload)) => {
                let mime = header
                    .strip_prefix("data:")
                    .and_then(|rest| rest.strip_suffix(";base64"))
                    .filter(|mime| !mime.is_empty())
                    .ok_or_else(|| AppError::image(format!("Unsupported data URI header '{}'", header)))?;
                (mime.to_string(), payload)
            }
            None => (FALLBACK_MIME_TYPE.to_string(), uri),
        };

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| AppError::image(format!("Invalid base64 payload: {}", e)))?;

        Ok(Self {
            mime_type,
            data: payload.trim().to_string(),
            file_name: None,
            byte_len: bytes.len(),
        })
    }

    /// Returns the image as a data URI suitable for embedding.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// The base64 payload without any data URI header.
    pub fn payload(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Size of the original file in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Decodes the payload back into raw bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| AppError::image(format!("Invalid base64 payload: {}", e)))
    }

    /// Decodes the payload into pixels, e.g. for a preview.
    pub fn decode_image(&self) -> Result<DynamicImage> {
        let bytes = self.decode_bytes()?;
        image::load_from_memory(&bytes)
            .map_err(|e| AppError::image(format!("Failed to decode image: {}", e)))
    }
}

/// Reads files into [`EncodedImage`]s according to an [`UploadPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageLoader {
    policy: UploadPolicy,
}

impl ImageLoader {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    /// Reads and encodes a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnreadableFile`] if the file cannot be read, and
    /// the policy errors described in [`ImageLoader::load_bytes`].
    pub fn load_path(&self, path: &Path) -> Result<EncodedImage> {
        if self.policy.enforce {
            // Check the size before reading the whole file into memory
            let size = std::fs::metadata(path)
                .map_err(|e| AppError::unreadable(format!("{}: {}", path.display(), e)))?
                .len();
            self.check_size(size)?;
        }

        let bytes = std::fs::read(path)
            .map_err(|e| AppError::unreadable(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        self.load_bytes(&bytes, file_name)
    }

    /// Encodes bytes that were already read (e.g. from a drag-and-drop).
    ///
    /// # Errors
    ///
    /// With an enforcing policy, returns [`AppError::FileTooLarge`] for
    /// oversized input and [`AppError::UnsupportedImageType`] when the bytes
    /// are not PNG, JPEG, GIF or WebP. Empty input is always
    /// [`AppError::UnreadableFile`].
    pub fn load_bytes(&self, bytes: &[u8], file_name: Option<String>) -> Result<EncodedImage> {
        if bytes.is_empty() {
            return Err(AppError::unreadable(format!(
                "{} is empty",
                file_name.as_deref().unwrap_or("file")
            )));
        }

        let detected = detect_format(bytes);

        let mime_type = if self.policy.enforce {
            self.check_size(bytes.len() as u64)?;
            let format = detected.ok_or_else(|| {
                AppError::UnsupportedImageType(
                    file_name.clone().unwrap_or_else(|| "unnamed file".to_string()),
                )
            })?;
            format.to_mime_type()
        } else {
            detected.map_or(FALLBACK_MIME_TYPE, |format| format.to_mime_type())
        };

        Ok(EncodedImage::new(bytes, mime_type, file_name))
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.policy.max_bytes {
            return Err(AppError::FileTooLarge {
                size,
                limit: self.policy.max_bytes,
            });
        }
        Ok(())
    }
}

/// Detects one of the accepted formats from the file header.
fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP)) => {
            Some(format)
        }
        _ => None,
    }
}
