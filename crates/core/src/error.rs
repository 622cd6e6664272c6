//! Error types for the shuttergen-core library.
//!
//! Loader failures and generation failures are kept apart so the UI can
//! route them differently: the former become a notice, the latter the
//! `Failed` request status.

use thiserror::Error;

/// Errors that can occur within the shuttergen-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing keys, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required environment variable was not found.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// The selected file could not be read.
    #[error("Could not read file: {0}")]
    UnreadableFile(String),

    /// The selected file is not a recognised image format.
    #[error("Unsupported file type: {0}. Supported formats: PNG, JPG, GIF, WebP")]
    UnsupportedImageType(String),

    /// The selected file exceeds the upload limit.
    #[error("File too large: {:.1} MB exceeds the maximum of {:.0} MB", megabytes(.size), megabytes(.limit))]
    FileTooLarge { size: u64, limit: u64 },

    /// Image decoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// Metadata generation failed. Displayed verbatim to the user.
    #[error("{0}")]
    GenerationFailed(String),

    /// UI-related errors (rendering, window management).
    #[error("UI error: {0}")]
    Ui(String),

    /// The system clipboard could not be accessed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an unreadable-file error with the given message.
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self::UnreadableFile(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }

    /// Creates a generation error with the given message.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }

    /// Creates a clipboard error with the given message.
    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self::Clipboard(msg.into())
    }
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1_048_576.0
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_failure_displays_bare_message() {
        let err = AppError::generation("No response received from the AI.");
        assert_eq!(err.to_string(), "No response received from the AI.");
    }

    #[test]
    fn file_too_large_reports_megabytes() {
        let err = AppError::FileTooLarge {
            size: 15 * 1_048_576,
            limit: 10 * 1_048_576,
        };
        assert_eq!(
            err.to_string(),
            "File too large: 15.0 MB exceeds the maximum of 10 MB"
        );
    }
}
