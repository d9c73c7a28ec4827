//! Per-document session state
//!
//! A `DocumentSession` owns the text content of one open document, its
//! backing path (if it has ever been saved), and the unsaved-changes
//! flag. All content mutation goes through the session so the dirty flag
//! stays correct.

use crate::error::{FileResult, SaveError, SaveResult};
use crate::file_handler::io::{self, FileEncoding};
use crate::frontend::{CloseChoice, Frontend};
use ropey::Rope;
use std::ops::Range;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for document sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a close request may go ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The session may be closed
    Proceed,
    /// The user kept the session open
    Abort,
}

/// One open document and its editing state
#[derive(Debug)]
pub struct DocumentSession {
    /// Unique identifier for this session
    id: SessionId,

    /// File path (None until the first successful save)
    path: Option<PathBuf>,

    /// Document content
    content: Rope,

    /// Content as of the last load or save; drives the dirty rule
    saved: Rope,

    /// Whether the document has unsaved changes
    dirty: bool,

    /// Whether the user has never saved this document
    untitled: bool,

    /// Display name: the path's base name, or the auto-generated
    /// placeholder assigned at creation
    display_name: String,

    /// Encoding detected at load time
    encoding: FileEncoding,
}

impl DocumentSession {
    /// Create a new untitled session with a caller-assigned placeholder
    /// name. The name remains stable until the first successful save.
    pub fn untitled(display_name: String) -> Self {
        Self {
            id: SessionId::new(),
            path: None,
            content: Rope::new(),
            saved: Rope::new(),
            dirty: false,
            untitled: true,
            display_name,
            encoding: FileEncoding::default(),
        }
    }

    /// Create a session by loading an existing file
    ///
    /// On failure no session exists; the caller surfaces the error and
    /// moves on.
    pub fn open(path: PathBuf) -> FileResult<Self> {
        let file = io::read_text(&path)?;
        let content = Rope::from_str(&file.content);

        Ok(Self {
            id: SessionId::new(),
            display_name: io::display_name(&path),
            path: Some(path),
            saved: content.clone(),
            content,
            dirty: false,
            untitled: false,
            encoding: file.encoding,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_untitled(&self) -> bool {
        self.untitled
    }

    pub fn encoding(&self) -> FileEncoding {
        self.encoding
    }

    pub fn content(&self) -> &Rope {
        &self.content
    }

    /// Get content as a string
    pub fn content_str(&self) -> String {
        self.content.to_string()
    }

    /// Get line count
    pub fn line_count(&self) -> usize {
        self.content.len_lines()
    }

    /// Get character count
    pub fn char_count(&self) -> usize {
        self.content.len_chars()
    }

    /// Get the document title for display (with modification indicator)
    pub fn title(&self) -> String {
        if self.dirty {
            format!("• {}", self.display_name)
        } else {
            self.display_name.clone()
        }
    }

    /// Replace the entire content
    pub fn set_content(&mut self, text: &str) {
        self.content = Rope::from_str(text);
        self.mark_edited();
    }

    /// Insert text at a character offset (clamped to the content length)
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let idx = char_idx.min(self.content.len_chars());
        self.content.insert(idx, text);
        self.mark_edited();
    }

    /// Remove a character range (clamped to the content length)
    pub fn remove(&mut self, char_range: Range<usize>) {
        let end = char_range.end.min(self.content.len_chars());
        let start = char_range.start.min(end);
        if start == end {
            return;
        }
        self.content.remove(start..end);
        self.mark_edited();
    }

    /// An edit sets the dirty flag unless the resulting content is
    /// identical to the last-saved content. The flag is never cleared by
    /// an edit: undoing back to the saved text leaves the session dirty
    /// (known limitation, kept from the original behavior).
    fn mark_edited(&mut self) {
        if !self.dirty && self.content != self.saved {
            self.dirty = true;
        }
    }

    /// Save to the current path, or ask the frontend for one if the
    /// session has never been saved
    ///
    /// A dismissed picker yields `SaveError::Cancelled` and leaves the
    /// session untouched.
    pub fn save(&mut self, frontend: &mut dyn Frontend) -> SaveResult<()> {
        match self.path.clone() {
            Some(path) => {
                self.write_to(&path)?;
                Ok(())
            }
            None => {
                let suggested = self.display_name.clone();
                match frontend.pick_save_path(&suggested) {
                    Some(path) => self.save_as(path).map_err(SaveError::from),
                    None => Err(SaveError::Cancelled),
                }
            }
        }
    }

    /// Save to a new path, adopting it as the backing path
    ///
    /// The file at the previous path, if any, is not touched.
    pub fn save_as(&mut self, path: PathBuf) -> FileResult<()> {
        self.write_to(&path)?;
        self.display_name = io::display_name(&path);
        self.path = Some(path);
        self.untitled = false;
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> FileResult<()> {
        io::write_text_atomic(path, &self.content_str())?;
        self.saved = self.content.clone();
        self.dirty = false;
        Ok(())
    }

    /// Decide whether this session may be closed
    ///
    /// Clean sessions proceed without any dialog. Dirty sessions put the
    /// three-way choice to the user; choosing to save runs the full save
    /// flow, and a failed or cancelled save keeps the session open.
    pub fn confirm_close(&mut self, frontend: &mut dyn Frontend) -> CloseOutcome {
        if !self.dirty {
            return CloseOutcome::Proceed;
        }

        let name = self.display_name.clone();
        match frontend.ask_save_discard_cancel(&name) {
            CloseChoice::Save => match self.save(frontend) {
                Ok(()) => CloseOutcome::Proceed,
                Err(SaveError::Cancelled) => CloseOutcome::Abort,
                Err(SaveError::File(e)) => {
                    frontend.report_error("Save failed", &e.user_message());
                    CloseOutcome::Abort
                }
            },
            CloseChoice::Discard => CloseOutcome::Proceed,
            CloseChoice::Cancel => CloseOutcome::Abort,
        }
    }
}
