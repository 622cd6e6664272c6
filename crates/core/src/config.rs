use crate::error::{AppError, Result};
use crate::image_loader::UploadPolicy;
use dotenvy::dotenv;
use std::env;

/// Model used when neither the environment nor the user picks one.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: String,
    pub model_name: String,
    pub upload_policy: UploadPolicy,
}

impl Config {
    /// Loads configuration from the process environment, requiring an API key.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok(), true)
    }

    /// Loads configuration but tolerates a missing API key.
    ///
    /// The desktop app uses this so the key can still be entered in the
    /// settings panel; a missing key surfaces when a request is made.
    pub fn load_lenient() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok(), false)
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Recognised variables:
    /// - `GEMINI_API_KEY` (falls back to `API_KEY`)
    /// - `GEMINI_MODEL`
    /// - `SHUTTERGEN_MAX_UPLOAD_MB`
    /// - `SHUTTERGEN_ENFORCE_UPLOAD_LIMITS` (`0`, `false`, `no` or `off` disable)
    pub fn from_lookup<F>(lookup: F, require_key: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|key| !key.trim().is_empty());

        let api_key = match api_key {
            Some(key) => key,
            None if require_key => return Err(AppError::MissingEnvVar("GEMINI_API_KEY".to_string())),
            None => String::new(),
        };

        let model_name = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut upload_policy = UploadPolicy::default();
        if let Some(raw) = lookup("SHUTTERGEN_MAX_UPLOAD_MB") {
            let mb: u64 = raw.trim().parse().map_err(|_| {
                AppError::config(format!("SHUTTERGEN_MAX_UPLOAD_MB must be a whole number, got '{}'", raw))
            })?;
            upload_policy.max_bytes = mb.checked_mul(1024 * 1024).ok_or_else(|| {
                AppError::config(format!("SHUTTERGEN_MAX_UPLOAD_MB is too large, got '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("SHUTTERGEN_ENFORCE_UPLOAD_LIMITS") {
            upload_policy.enforce = !matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        Ok(Self {
            gemini_api_key: api_key,
            model_name,
            upload_policy,
        })
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Model name in the `models/<name>` form the API expects.
    pub fn qualified_model_name(&self) -> String {
        if self.model_name.starts_with("models/") {
            self.model_name.clone()
        } else {
            format!("models/{}", self.model_name)
        }
    }
}

/// Values supplied on the command line for a single run.
///
/// They win over both the environment and saved settings, but are never
/// persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub model: Option<String>,
    pub enforce_upload_limits: Option<bool>,
}

impl Overrides {
    /// Returns `config` with these overrides applied.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(model) = &self.model {
            config.model_name = model.clone();
        }
        if let Some(enforce) = self.enforce_upload_limits {
            config.upload_policy.enforce = enforce;
        }
        config
    }
}

/// Builder for configurations assembled from user settings.
#[derive(Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    upload_policy: Option<UploadPolicy>,
}

impl ConfigBuilder {
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = Some(policy);
        self
    }

    /// Fails if no non-empty API key was provided.
    pub fn build(self) -> Result<Config> {
        let gemini_api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::config("No Gemini API key configured. Set GEMINI_API_KEY or add a key in Settings.")
            })?;

        Ok(Config {
            gemini_api_key,
            model_name: self
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            upload_policy: self.upload_policy.unwrap_or_default(),
        })
    }
}
