//! Error types for Multipad
//!
//! This module defines the custom error types used throughout the
//! application. Errors are organized by category for clear handling and
//! user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIo(#[from] FileError),

    /// Save flow errors (including a dismissed save picker)
    #[error(transparent)]
    Save(#[from] SaveError),

    /// Clipboard errors
    #[error(transparent)]
    Clipboard(#[from] crate::clipboard::ClipboardError),

    /// Generic unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at the specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when accessing file
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// File is too large to open
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File content could not be decoded as text
    #[error("Unable to read file as text. File may be binary or use an unsupported encoding: {path}")]
    EncodingError { path: PathBuf },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not save file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the save flow
///
/// A dismissed save picker is a normal negative outcome, not a failure;
/// it is distinguished from real I/O errors so callers can stay silent.
#[derive(Error, Debug)]
pub enum SaveError {
    /// The user dismissed the save-path picker
    #[error("Save cancelled")]
    Cancelled,

    /// The write itself failed
    #[error(transparent)]
    File(#[from] FileError),
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for the save flow
pub type SaveResult<T> = Result<T, SaveError>;

impl FileError {
    /// Create a user-friendly error message suitable for display in dialogs
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The file could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::PermissionDenied { .. } => {
                "You don't have permission to access this file. Check file permissions.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This file is too large to open. Maximum file size is {} bytes.",
                    max_size
                )
            }
            FileError::EncodingError { .. } => {
                "This file cannot be opened as text. It may be a binary file or use an unsupported encoding.".to_string()
            }
            FileError::WriteError { .. } => {
                "Could not save the file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
