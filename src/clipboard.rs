//! System clipboard integration for cut, copy, and paste
//!
//! Uses the arboard crate for cross-platform clipboard access. The
//! frontend owns a `ClipboardManager` instance; there is no process-global
//! clipboard state.

use arboard::Clipboard;
use thiserror::Error;

/// Clipboard-related errors
#[derive(Error, Debug, Clone)]
pub enum ClipboardError {
    #[error("Could not access clipboard: {0}")]
    AccessError(String),

    #[error("Clipboard is empty")]
    Empty,

    #[error("Could not write to clipboard: {0}")]
    WriteError(String),
}

/// Clipboard wrapper with a cached-content fallback
///
/// arboard's Clipboard is not Send/Sync on all platforms, so a fresh
/// handle is opened per operation. The last text written or read is cached
/// and served when the system clipboard is unavailable (e.g. no display
/// server), which keeps cut/copy/paste working within the process.
pub struct ClipboardManager {
    last_content: Option<String>,
}

impl ClipboardManager {
    /// Create a new clipboard manager
    pub fn new() -> Self {
        Self { last_content: None }
    }

    /// Get text from the clipboard
    pub fn get_text(&mut self) -> Result<String, ClipboardError> {
        match Clipboard::new() {
            Ok(mut clipboard) => match clipboard.get_text() {
                Ok(text) => {
                    self.last_content = Some(text.clone());
                    Ok(text)
                }
                Err(arboard::Error::ContentNotAvailable) => Err(ClipboardError::Empty),
                Err(e) => Err(ClipboardError::AccessError(e.to_string())),
            },
            Err(e) => match &self.last_content {
                Some(text) => Ok(text.clone()),
                None => Err(ClipboardError::AccessError(e.to_string())),
            },
        }
    }

    /// Set text to the clipboard
    pub fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.last_content = Some(text.to_string());

        match Clipboard::new() {
            Ok(mut clipboard) => clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::WriteError(e.to_string())),
            // Cache already holds the text, so in-process paste still works
            Err(e) => {
                log::debug!("system clipboard unavailable: {}", e);
                Ok(())
            }
        }
    }
}

impl Default for ClipboardManager {
    fn default() -> Self {
        Self::new()
    }
}
