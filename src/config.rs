//! Application constants for Multipad
//!
//! There is no persisted configuration: documents are the only state the
//! application keeps, so the configuration surface is a set of constants.

/// Application name for logging and version output
pub const APP_NAME: &str = "multipad";

/// Prefix for auto-generated untitled document names
pub const UNTITLED_PREFIX: &str = "document";

/// Extension for auto-generated untitled document names
pub const UNTITLED_EXTENSION: &str = "txt";

/// Maximum file size to open (in bytes) - 10MB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File size warning threshold (in bytes) - 1MB
pub const WARNING_FILE_SIZE: u64 = 1024 * 1024;

/// Build the display name for the n-th untitled document
pub fn untitled_name(n: u64) -> String {
    format!("{}{}.{}", UNTITLED_PREFIX, n, UNTITLED_EXTENSION)
}
