//! Collaborator contracts for the toolkit layer
//!
//! The session core never talks to a windowing toolkit directly. Whatever
//! hosts the editor (a GUI shell, the bundled terminal frontend, a test
//! stub) implements `Frontend`: modal pickers and dialogs as synchronous
//! calls returning plain values, plus the selection state of the text
//! surface rendering a session.

use crate::session::{DocumentSession, SessionId};
use std::path::PathBuf;

/// The user's answer to the unsaved-changes dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    /// Save the document, then close it
    Save,
    /// Close the document, discarding changes
    Discard,
    /// Keep the document open
    Cancel,
}

/// Clipboard commands routed to the text surface of the focused session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Cut,
    Copy,
    Paste,
}

/// The toolkit-side collaborator
///
/// All methods are synchronous; "modal" dialogs block until the user
/// answers. `report_error` is fire-and-forget.
pub trait Frontend {
    /// Ask the user for a file to open. `None` means dismissed.
    fn pick_open_path(&mut self) -> Option<PathBuf>;

    /// Ask the user where to save, seeded with a suggested name.
    /// `None` means dismissed.
    fn pick_save_path(&mut self, suggested: &str) -> Option<PathBuf>;

    /// Present the three-way unsaved-changes choice for the named document.
    fn ask_save_discard_cancel(&mut self, name: &str) -> CloseChoice;

    /// Surface an error to the user. No return value is consumed.
    fn report_error(&mut self, title: &str, message: &str);

    /// Whether the text surface showing this session has a non-empty
    /// selection. Queried on focus changes to drive cut/copy enablement.
    fn has_selection(&self, id: SessionId) -> bool;

    /// Execute a clipboard command against the text surface of a session.
    ///
    /// The frontend owns the selection; the session owns the content.
    /// Content changes must go through the session's mutators so dirty
    /// tracking stays correct.
    fn apply_edit(&mut self, session: &mut DocumentSession, command: EditCommand);
}
