//! ShutterGen Core Library
//!
//! This library provides the core functionality for the ShutterGen stock
//! metadata generator: loading a photo, asking Google's Gemini for a title,
//! description and keyword list, and presenting the result.
//!
//! # Overview
//!
//! - **Image Loading**: Reading and base64-encoding uploads via [`image_loader`]
//! - **Metadata Contract**: Prompt, response schema and reply parsing via [`metadata`]
//! - **AI Integration**: The Gemini-backed [`MetadataService`] via [`gemini`]
//! - **Request State**: The four-state [`RequestStatus`] machine via [`session`]
//! - **User Interface**: The desktop window via [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use shuttergen_core::ShutterGen;
//!
//! let app = ShutterGen::new()?;
//! let metadata = app.analyze_path("sunset.jpg".as_ref()).await?;
//! println!("{}", metadata.keywords_text());
//! ```
//!
//! # Module Structure
//!
//! - [`clipboard`]: System clipboard access
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`gemini`]: Gemini AI client
//! - [`image_loader`]: Upload validation and encoding
//! - [`metadata`]: Generated metadata model
//! - [`session`]: Request status state machine
//! - [`ui`]: User interface components

pub mod clipboard;
pub mod config;
pub mod error;
pub mod gemini;
pub mod image_loader;
pub mod metadata;
pub mod session;
pub mod ui;

// Re-export primary types for convenience
pub use config::{Config, Overrides};
pub use error::{AppError, Result};
pub use gemini::{GeminiClient, MetadataService};
pub use image_loader::{EncodedImage, ImageLoader, UploadPolicy};
pub use metadata::{CopyTarget, GeneratedMetadata};
pub use session::{RequestStatus, Session};

use std::path::Path;

/// Main entry point for the ShutterGen application.
///
/// This struct provides a facade over the loader, the Gemini client and the
/// desktop UI. It's the recommended way to use the library for most use
/// cases.
pub struct ShutterGen {
    config: Config,
    overrides: Overrides,
}

impl ShutterGen {
    /// Creates a new instance with configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured.
    pub fn new() -> Result<Self> {
        Ok(Self::with_config(Config::load()?))
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            overrides: Overrides::default(),
        }
    }

    /// Sets command line overrides for this run.
    ///
    /// They are kept apart from `config` so the window can layer them over
    /// saved settings without persisting them.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Configuration with the overrides applied.
    pub fn effective_config(&self) -> Config {
        self.overrides.apply(self.config.clone())
    }

    /// Loader honouring the effective upload policy.
    pub fn loader(&self) -> ImageLoader {
        ImageLoader::new(self.effective_config().upload_policy)
    }

    /// Reads a photo from disk using the configured upload policy.
    pub fn load_image(&self, path: &Path) -> Result<EncodedImage> {
        self.loader().load_path(path)
    }

    /// Loads a photo and generates its metadata in one step.
    ///
    /// # Errors
    ///
    /// Returns loader errors for unreadable or rejected files, and
    /// [`AppError::GenerationFailed`] if the request fails.
    pub async fn analyze_path(&self, path: &Path) -> Result<GeneratedMetadata> {
        let client = GeminiClient::new(&self.effective_config())?;
        let mut state = Session::new();
        state.select_image(self.load_image(path)?);

        session::generate_with(&mut state, &client).await;
        match state.status() {
            RequestStatus::Succeeded(metadata) => Ok(metadata.clone()),
            RequestStatus::Failed(message) => Err(AppError::generation(message.clone())),
            RequestStatus::Idle | RequestStatus::Loading => {
                Err(AppError::generation(session::FALLBACK_FAILURE_MESSAGE))
            }
        }
    }

    /// Launches the desktop window, optionally preloaded with an image.
    pub fn run_interactive(&self, initial_image: Option<EncodedImage>) -> Result<()> {
        ui::run_app(self.config.clone(), self.overrides.clone(), initial_image)
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present.
pub fn init() {
    let _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::builder().with_api_key("k").build().unwrap()
    }

    #[test]
    fn overrides_apply_to_loading_and_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let strict = ShutterGen::with_config(base_config());
        assert!(matches!(strict.load_image(&path), Err(AppError::UnsupportedImageType(_))));

        let relaxed = ShutterGen::with_config(base_config()).with_overrides(Overrides {
            model: Some("gemini-2.5-pro".to_string()),
            enforce_upload_limits: Some(false),
        });
        assert!(relaxed.load_image(&path).is_ok());
        assert_eq!(relaxed.effective_config().model_name, "gemini-2.5-pro");
        assert_eq!(relaxed.config.model_name, config::DEFAULT_MODEL);
    }
}
