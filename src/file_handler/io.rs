//! File I/O operations with encoding detection and atomic writes
//!
//! Provides safe file reading and writing with:
//! - UTF-8 and UTF-16 encoding detection
//! - Strict decoding: undecodable content fails the read
//! - Atomic writes to prevent data loss
//! - File size limits

use crate::config::{MAX_FILE_SIZE, WARNING_FILE_SIZE};
use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

/// Detected encoding of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian with BOM
    Utf16Le,
    /// UTF-16 Big Endian with BOM
    Utf16Be,
}

impl FileEncoding {
    /// Get display name for the encoding
    pub fn display_name(&self) -> &'static str {
        match self {
            FileEncoding::Utf8 => "UTF-8",
            FileEncoding::Utf8Bom => "UTF-8 with BOM",
            FileEncoding::Utf16Le => "UTF-16 LE",
            FileEncoding::Utf16Be => "UTF-16 BE",
        }
    }
}

/// Result of reading a text file
#[derive(Debug, Clone)]
pub struct TextFile {
    /// The file content as a string
    pub content: String,
    /// Detected encoding
    pub encoding: FileEncoding,
    /// Original file size in bytes
    pub size_bytes: u64,
}

/// Detect file encoding from raw bytes
///
/// Returns `None` when the content carries no BOM and is not valid UTF-8.
fn detect_encoding(bytes: &[u8]) -> Option<FileEncoding> {
    // Check for BOM markers
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return Some(FileEncoding::Utf8Bom);
    }
    if bytes.len() >= 2 {
        if bytes[0] == 0xFF && bytes[1] == 0xFE {
            return Some(FileEncoding::Utf16Le);
        }
        if bytes[0] == 0xFE && bytes[1] == 0xFF {
            return Some(FileEncoding::Utf16Be);
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        Some(FileEncoding::Utf8)
    } else {
        None
    }
}

/// Decode bytes to a string based on the detected encoding
///
/// Strict: any undecodable sequence fails with `EncodingError` rather than
/// substituting replacement characters, so a later save cannot silently
/// rewrite bytes the user never typed.
fn decode_content(bytes: &[u8], encoding: FileEncoding, path: &Path) -> FileResult<String> {
    match encoding {
        FileEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| FileError::EncodingError {
                path: path.to_path_buf(),
            }),
        FileEncoding::Utf8Bom => {
            // Skip BOM bytes
            std::str::from_utf8(&bytes[3..])
                .map(|s| s.to_string())
                .map_err(|_| FileError::EncodingError {
                    path: path.to_path_buf(),
                })
        }
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes, path),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes, path),
    }
}

/// Decode UTF-16 bytes (BOM already stripped) with the given byte order
fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16, path: &Path) -> FileResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(FileError::EncodingError {
            path: path.to_path_buf(),
        });
    }

    let units = bytes.chunks_exact(2).map(|chunk| combine([chunk[0], chunk[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| FileError::EncodingError {
            path: path.to_path_buf(),
        })
}

/// Map an I/O error from a read to the matching `FileError` variant
fn read_error(path: &Path, err: std::io::Error) -> FileError {
    match err.kind() {
        std::io::ErrorKind::NotFound => FileError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => FileError::ReadError {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

/// Read a text file with encoding detection
pub fn read_text(path: impl AsRef<Path>) -> FileResult<TextFile> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    if !path.exists() {
        return Err(FileError::NotFound(path_buf));
    }

    // Check file size before reading
    let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;
    let size_bytes = metadata.len();
    if size_bytes > MAX_FILE_SIZE {
        return Err(FileError::FileTooLarge {
            path: path_buf,
            size: size_bytes,
            max_size: MAX_FILE_SIZE,
        });
    }
    if size_bytes > WARNING_FILE_SIZE {
        log::warn!("large file: {} ({} bytes)", path.display(), size_bytes);
    }

    let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;

    let encoding = detect_encoding(&bytes).ok_or_else(|| FileError::EncodingError {
        path: path_buf.clone(),
    })?;
    let content = decode_content(&bytes, encoding, path)?;

    Ok(TextFile {
        content,
        encoding,
        size_bytes,
    })
}

/// Write content to a file using an atomic write
///
/// The target is either fully replaced or left untouched: content goes to
/// a temp file in the same directory, which is then renamed over the
/// target.
pub fn write_text_atomic(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    // Generate temp filename in the same directory
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let temp_filename = format!(".{}.{}.tmp", filename, timestamp);
    let temp_path = parent.join(&temp_filename);

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        // Clean up temp file on failure
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    Ok(())
}

/// Extract the base name of a path for display
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
