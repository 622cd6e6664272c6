//! System clipboard access.

use crate::error::{AppError, Result};
use arboard::Clipboard;

/// Places `text` on the system clipboard.
///
/// # Errors
///
/// Returns [`AppError::Clipboard`] if the clipboard is unavailable (e.g. no
/// display server) or rejects the write.
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| AppError::clipboard(format!("Could not access clipboard: {}", e)))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| AppError::clipboard(format!("Failed to copy to clipboard: {}", e)))?;

    tracing::debug!(chars = text.chars().count(), "copied to clipboard");
    Ok(())
}
