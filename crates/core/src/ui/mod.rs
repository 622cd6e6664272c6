//! Desktop user interface for shuttergen.
//!
//! A single window with the upload column on the left and the generated
//! metadata on the right, built on eframe/egui.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: copy feedback and background request events
//! - [`settings`]: User preferences and persistence
//! - [`rendering`]: Drawing helpers for fields, chips and the drop zone
//! - [`app`]: Main application logic
//!
//! The request status itself is owned by [`crate::session::Session`].
//!
//! # Usage
//!
//! ```ignore
//! use shuttergen_core::{ui, Config, Overrides};
//!
//! let config = Config::load_lenient()?;
//! ui::run_app(config, Overrides::default(), None)?;
//! ```

mod app;
mod rendering;
mod settings;
mod state;

// Public API exports
pub use app::MetadataApp;
pub use settings::{AVAILABLE_MODELS, Settings};
pub use state::{COPY_FEEDBACK_DURATION, CopyFeedback};

use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::image_loader::EncodedImage;

/// Opens the metadata generator window and blocks until it is closed.
///
/// # Arguments
/// * `config` - Application configuration with API key and model
/// * `overrides` - Command line values layered over saved settings
/// * `initial_image` - Optional image to preload into the upload column
///
/// # Errors
/// Returns an error if the window cannot be created.
pub fn run_app(config: Config, overrides: Overrides, initial_image: Option<EncodedImage>) -> Result<()> {
    app::run(config, overrides, initial_image)
}
