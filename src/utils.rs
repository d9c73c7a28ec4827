//! Shared helper functions
//!
//! Path and text utilities used by the console frontend and the
//! command-line surface.

use std::path::{Path, PathBuf};

/// Path utilities
pub mod path {
    use super::*;

    /// Expand a leading tilde to the home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }
}

/// Text utilities
pub mod text {
    /// Truncate a string with an ellipsis
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            s.to_string()
        } else if max_len <= 3 {
            "...".to_string()
        } else {
            format!("{}...", &s[..max_len - 3])
        }
    }
}
