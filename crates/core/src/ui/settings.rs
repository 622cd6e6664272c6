//! User settings persistence and UI configuration.
//!
//! Only preferences are stored here (model, API key override, upload
//! checks). Generated metadata is never written to disk.

use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::image_loader::UploadPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Gemini models offered in the settings panel.
pub const AVAILABLE_MODELS: &[&str] = &[
    "gemini-3-flash-preview",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

/// User-configurable settings persisted between sessions.
///
/// Stored as JSON in the user's config directory
/// (e.g., `~/.config/shuttergen/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected Gemini model name.
    pub model: String,
    /// API key override (takes precedence over environment).
    #[serde(default)]
    pub api_key: String,
    /// Reject oversized and non-image uploads.
    #[serde(default = "default_enforce")]
    pub enforce_upload_limits: bool,
    /// Command line values for this run; never written to disk.
    #[serde(skip)]
    overrides: Overrides,
}

fn default_enforce() -> bool {
    true
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "shuttergen", "shuttergen").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    pub fn load(config: &Config) -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path, config))
            .unwrap_or_else(|| Self::from_config(config))
    }

    /// Loads settings from `path`, falling back to `config` if the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path, config: &Config) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt settings file");
                    None
                }
            })
            .unwrap_or_else(|| Self::from_config(config))
    }

    /// Settings mirroring the environment configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model_name.clone(),
            api_key: String::new(),
            enforce_upload_limits: config.upload_policy.enforce,
            overrides: Overrides::default(),
        }
    }

    /// Applies per-run overrides on top of the saved values.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// Model used for requests, honouring a `--model` override.
    pub fn effective_model(&self) -> &str {
        self.overrides.model.as_deref().unwrap_or(&self.model)
    }

    /// Persists settings to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Returns whether an API key override is set.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Upload policy with these settings applied on top of `base`.
    pub fn upload_policy(&self, base: &Config) -> UploadPolicy {
        UploadPolicy {
            enforce: self
                .overrides
                .enforce_upload_limits
                .unwrap_or(self.enforce_upload_limits),
            ..base.upload_policy
        }
    }

    /// Builds the configuration for a request.
    ///
    /// The key entered here wins over the environment key.
    pub fn request_config(&self, base: &Config) -> Result<Config> {
        let api_key = if self.has_api_key() {
            &self.api_key
        } else {
            &base.gemini_api_key
        };

        Config::builder()
            .with_api_key(api_key)
            .with_model(self.effective_model())
            .with_upload_policy(self.upload_policy(base))
            .build()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            enforce_upload_limits: true,
            overrides: Overrides::default(),
        }
    }
}
