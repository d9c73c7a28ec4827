//! Session collection, focus, and command routing
//!
//! The `SessionManager` exclusively owns every open `DocumentSession`;
//! removal from the collection is the only way a session is destroyed.
//! Toolbar/menu commands are dispatched to the focused session, and the
//! enabled/disabled state of each command is recomputed whenever focus
//! changes.

use super::document::{CloseOutcome, DocumentSession, SessionId};
use crate::config;
use crate::error::SaveError;
use crate::frontend::{EditCommand, Frontend};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Commands routed to the focused session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cut,
    Copy,
    Paste,
    Save,
    SaveAs,
}

/// Enabled/disabled state of each user command
///
/// A plain map the hosting layer can poll or render however it likes;
/// no toolkit action objects are involved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStates {
    pub save: bool,
    pub save_as: bool,
    pub close: bool,
    pub close_all: bool,
    pub cut: bool,
    pub copy: bool,
    pub paste: bool,
}

/// Owns all open sessions and routes commands to the focused one
pub struct SessionManager {
    /// Ordered collection of open sessions, one per window
    sessions: Vec<DocumentSession>,

    /// The session currently receiving user commands
    focused: Option<SessionId>,

    /// Counter for untitled document names, scoped to this manager so
    /// independent instances do not share numbering. Numbers are never
    /// reused within one manager.
    untitled_counter: AtomicU64,

    /// Command enablement, recomputed on focus changes
    commands: CommandStates,
}

impl SessionManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            focused: None,
            untitled_counter: AtomicU64::new(0),
            commands: CommandStates::default(),
        }
    }

    /// Number of open sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if there are any open sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterate the open sessions in order
    pub fn sessions(&self) -> &[DocumentSession] {
        &self.sessions
    }

    /// Get the focused session's ID
    pub fn focused_id(&self) -> Option<SessionId> {
        self.focused
    }

    /// Get the focused session
    pub fn focused(&self) -> Option<&DocumentSession> {
        self.focused.and_then(|id| self.get(id))
    }

    /// Get a session by ID
    pub fn get(&self, id: SessionId) -> Option<&DocumentSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Get a session mutably by ID
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut DocumentSession> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    /// Current command enablement
    pub fn command_states(&self) -> CommandStates {
        self.commands
    }

    /// Check if any session has unsaved changes
    pub fn has_unsaved_changes(&self) -> bool {
        self.sessions.iter().any(|s| s.is_dirty())
    }

    fn index_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }

    /// Assign the next untitled name. Opens never consume a number, only
    /// brand-new documents do.
    fn next_untitled_name(&self) -> String {
        let n = self.untitled_counter.fetch_add(1, Ordering::Relaxed) + 1;
        config::untitled_name(n)
    }

    /// Create a new untitled document, add it, and focus it
    pub fn new_document(&mut self) -> SessionId {
        let session = DocumentSession::untitled(self.next_untitled_name());
        let id = session.id();
        log::info!("new document {}", session.display_name());
        self.sessions.push(session);
        // A brand-new view cannot have a selection yet
        self.apply_focus(Some(id), false);
        id
    }

    /// Open a file into a new session, add it, and focus it
    ///
    /// On failure nothing is added: the error is surfaced once via the
    /// notifier and the collection is left unchanged.
    pub fn open_document(
        &mut self,
        path: PathBuf,
        frontend: &mut dyn Frontend,
    ) -> Option<SessionId> {
        match DocumentSession::open(path) {
            Ok(session) => {
                let id = session.id();
                log::info!("opened {}", session.display_name());
                self.sessions.push(session);
                self.apply_focus(Some(id), false);
                Some(id)
            }
            Err(e) => {
                log::warn!("open failed: {}", e);
                frontend.report_error("Open failed", &e.user_message());
                None
            }
        }
    }

    /// Ask the frontend for a file and open it; a dismissed picker is a
    /// no-op
    pub fn open_document_interactive(&mut self, frontend: &mut dyn Frontend) -> Option<SessionId> {
        let path = frontend.pick_open_path()?;
        self.open_document(path, frontend)
    }

    /// Close one session, honoring the unsaved-changes flow
    ///
    /// On `Proceed` the session is removed and, if it was focused, the
    /// session now at its index (clamped) is promoted. On `Abort` the
    /// session stays open and becomes focused.
    pub fn close_document(&mut self, id: SessionId, frontend: &mut dyn Frontend) -> CloseOutcome {
        let Some(index) = self.index_of(id) else {
            return CloseOutcome::Proceed;
        };

        match self.sessions[index].confirm_close(frontend) {
            CloseOutcome::Abort => {
                self.apply_focus(Some(id), frontend.has_selection(id));
                CloseOutcome::Abort
            }
            CloseOutcome::Proceed => {
                let session = self.sessions.remove(index);
                log::info!("closed {}", session.display_name());

                if self.focused == Some(id) {
                    let next = if self.sessions.is_empty() {
                        None
                    } else {
                        Some(self.sessions[index.min(self.sessions.len() - 1)].id())
                    };
                    let selection = next.map_or(false, |n| frontend.has_selection(n));
                    self.apply_focus(next, selection);
                }
                CloseOutcome::Proceed
            }
        }
    }

    /// Attempt to close every session in current order
    ///
    /// An abort does not stop the sweep: later sessions still get their
    /// close attempt, so the result can be partial progress. The overall
    /// outcome is `Abort` if any session stayed open, which callers treat
    /// as a reason to cancel whatever triggered the close-all.
    pub fn close_all(&mut self, frontend: &mut dyn Frontend) -> CloseOutcome {
        let ids: Vec<SessionId> = self.sessions.iter().map(|s| s.id()).collect();
        let mut outcome = CloseOutcome::Proceed;
        for id in ids {
            if self.close_document(id, frontend) == CloseOutcome::Abort {
                outcome = CloseOutcome::Abort;
            }
        }
        outcome
    }

    /// Route a command to the focused session; no-op without focus
    pub fn dispatch(&mut self, command: Command, frontend: &mut dyn Frontend) {
        let Some(id) = self.focused else {
            log::debug!("dispatch {:?} with no focused session", command);
            return;
        };

        match command {
            Command::Save => self.save_session(id, frontend),
            Command::SaveAs => self.save_session_as(id, frontend),
            Command::Cut | Command::Copy | Command::Paste => {
                let op = match command {
                    Command::Cut => EditCommand::Cut,
                    Command::Copy => EditCommand::Copy,
                    _ => EditCommand::Paste,
                };
                if let Some(index) = self.index_of(id) {
                    frontend.apply_edit(&mut self.sessions[index], op);
                }
                // A cut consumes the selection; refresh enablement
                self.refresh_commands(&*frontend);
            }
        }
    }

    /// Update focus from the hosting layer and recompute command states
    ///
    /// IDs that are not members are ignored, preserving the invariant
    /// that `focused` always names an open session.
    pub fn on_focus_changed(&mut self, id: Option<SessionId>, frontend: &dyn Frontend) {
        if let Some(id) = id {
            if self.index_of(id).is_none() {
                log::warn!("focus change to unknown session {}", id);
                return;
            }
        }
        let selection = id.map_or(false, |i| frontend.has_selection(i));
        self.apply_focus(id, selection);
    }

    fn save_session(&mut self, id: SessionId, frontend: &mut dyn Frontend) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id() == id) else {
            return;
        };
        match session.save(frontend) {
            Ok(()) => log::info!("saved {}", session.display_name()),
            // A dismissed picker is a normal negative outcome
            Err(SaveError::Cancelled) => {}
            Err(SaveError::File(e)) => {
                log::warn!("save failed: {}", e);
                frontend.report_error("Save failed", &e.user_message());
            }
        }
    }

    fn save_session_as(&mut self, id: SessionId, frontend: &mut dyn Frontend) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let suggested = self.sessions[index].display_name().to_string();
        let Some(path) = frontend.pick_save_path(&suggested) else {
            return;
        };
        if let Err(e) = self.sessions[index].save_as(path) {
            log::warn!("save as failed: {}", e);
            frontend.report_error("Save failed", &e.user_message());
        }
    }

    fn apply_focus(&mut self, id: Option<SessionId>, has_selection: bool) {
        self.focused = id;
        let focused = id.is_some();
        self.commands = CommandStates {
            save: focused,
            save_as: focused,
            close: focused,
            close_all: focused,
            paste: focused,
            cut: focused && has_selection,
            copy: focused && has_selection,
        };
    }

    fn refresh_commands(&mut self, frontend: &dyn Frontend) {
        let selection = self.focused.map_or(false, |id| frontend.has_selection(id));
        self.apply_focus(self.focused, selection);
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::CloseChoice;
    use std::collections::{HashSet, VecDeque};

    /// Scripted frontend recording every collaborator interaction
    #[derive(Default)]
    struct StubFrontend {
        open_path: Option<PathBuf>,
        save_path: Option<PathBuf>,
        choices: VecDeque<CloseChoice>,
        selected: HashSet<SessionId>,
        edits: Vec<EditCommand>,
        errors: Vec<String>,
    }

    impl Frontend for StubFrontend {
        fn pick_open_path(&mut self) -> Option<PathBuf> {
            self.open_path.clone()
        }

        fn pick_save_path(&mut self, _suggested: &str) -> Option<PathBuf> {
            self.save_path.clone()
        }

        fn ask_save_discard_cancel(&mut self, _name: &str) -> CloseChoice {
            self.choices
                .pop_front()
                .expect("dialog invoked without a scripted choice")
        }

        fn report_error(&mut self, _title: &str, message: &str) {
            self.errors.push(message.to_string());
        }

        fn has_selection(&self, id: SessionId) -> bool {
            self.selected.contains(&id)
        }

        fn apply_edit(&mut self, _session: &mut DocumentSession, command: EditCommand) {
            self.edits.push(command);
        }
    }

    #[test]
    fn test_untitled_names_increase_across_opens_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.txt");
        std::fs::write(&path, "x").unwrap();

        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let d1 = manager.new_document();
        assert_eq!(manager.get(d1).unwrap().display_name(), "document1.txt");

        // An open in between must not consume a number
        manager.open_document(path, &mut frontend).unwrap();

        let d2 = manager.new_document();
        assert_eq!(manager.get(d2).unwrap().display_name(), "document2.txt");

        // Closing must not free a number either
        assert_eq!(
            manager.close_document(d1, &mut frontend),
            CloseOutcome::Proceed
        );
        let d3 = manager.new_document();
        assert_eq!(manager.get(d3).unwrap().display_name(), "document3.txt");
    }

    #[test]
    fn test_counters_are_per_manager() {
        let mut a = SessionManager::new();
        let mut b = SessionManager::new();

        let da = a.new_document();
        let db = b.new_document();
        assert_eq!(a.get(da).unwrap().display_name(), "document1.txt");
        assert_eq!(b.get(db).unwrap().display_name(), "document1.txt");
    }

    #[test]
    fn test_new_document_gets_focus_and_commands() {
        let mut manager = SessionManager::new();
        assert_eq!(manager.command_states(), CommandStates::default());

        let id = manager.new_document();
        assert_eq!(manager.focused_id(), Some(id));

        let states = manager.command_states();
        assert!(states.save && states.save_as && states.close && states.paste);
        assert!(!states.cut && !states.copy);
    }

    #[test]
    fn test_open_missing_file_adds_nothing() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();
        manager.new_document();

        let result = manager.open_document(PathBuf::from("/missing/file.txt"), &mut frontend);
        assert!(result.is_none());
        assert_eq!(manager.len(), 1);
        assert_eq!(frontend.errors.len(), 1);
    }

    #[test]
    fn test_open_interactive_dismissed_is_noop() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        assert!(manager.open_document_interactive(&mut frontend).is_none());
        assert!(manager.is_empty());
        assert!(frontend.errors.is_empty());
    }

    #[test]
    fn test_close_focused_promotes_next_session() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let a = manager.new_document();
        let b = manager.new_document();
        let c = manager.new_document();
        manager.on_focus_changed(Some(b), &frontend);

        assert_eq!(
            manager.close_document(b, &mut frontend),
            CloseOutcome::Proceed
        );
        // Session at the closed index is promoted
        assert_eq!(manager.focused_id(), Some(c));

        manager.close_document(c, &mut frontend);
        assert_eq!(manager.focused_id(), Some(a));

        manager.close_document(a, &mut frontend);
        assert_eq!(manager.focused_id(), None);
        assert!(!manager.command_states().save);
    }

    #[test]
    fn test_close_aborted_session_stays_focused() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let a = manager.new_document();
        let b = manager.new_document();
        manager.get_mut(a).unwrap().set_content("unsaved");
        assert_eq!(manager.focused_id(), Some(b));

        frontend.choices.push_back(CloseChoice::Cancel);
        assert_eq!(
            manager.close_document(a, &mut frontend),
            CloseOutcome::Abort
        );
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.focused_id(), Some(a));
    }

    #[test]
    fn test_close_all_continues_past_abort() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let a = manager.new_document();
        let b = manager.new_document();
        manager.get_mut(a).unwrap().set_content("unsaved");

        // A is dirty and the user cancels; B is clean
        frontend.choices.push_back(CloseChoice::Cancel);
        assert_eq!(manager.close_all(&mut frontend), CloseOutcome::Abort);

        assert_eq!(manager.len(), 1);
        assert!(manager.get(a).is_some());
        assert!(manager.get(b).is_none());
    }

    #[test]
    fn test_close_all_clean_proceeds() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        manager.new_document();
        manager.new_document();
        assert_eq!(manager.close_all(&mut frontend), CloseOutcome::Proceed);
        assert!(manager.is_empty());
        assert_eq!(manager.focused_id(), None);
    }

    #[test]
    fn test_dispatch_without_focus_is_noop() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        manager.dispatch(Command::Save, &mut frontend);
        manager.dispatch(Command::Cut, &mut frontend);
        assert!(frontend.edits.is_empty());
        assert!(frontend.errors.is_empty());
    }

    #[test]
    fn test_dispatch_routes_clipboard_commands_to_frontend() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        manager.new_document();
        manager.dispatch(Command::Copy, &mut frontend);
        manager.dispatch(Command::Paste, &mut frontend);
        assert_eq!(frontend.edits, vec![EditCommand::Copy, EditCommand::Paste]);
    }

    #[test]
    fn test_dispatch_save_writes_focused_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "v1").unwrap();

        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let id = manager.open_document(path.clone(), &mut frontend).unwrap();
        manager.get_mut(id).unwrap().set_content("v2");

        manager.dispatch(Command::Save, &mut frontend);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "v2");
        assert!(!manager.get(id).unwrap().is_dirty());
    }

    #[test]
    fn test_dispatch_save_cancelled_pick_is_silent() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let id = manager.new_document();
        manager.get_mut(id).unwrap().set_content("text");

        manager.dispatch(Command::Save, &mut frontend);
        assert!(frontend.errors.is_empty());
        assert!(manager.get(id).unwrap().is_dirty());
    }

    #[test]
    fn test_focus_change_tracks_selection() {
        let mut manager = SessionManager::new();
        let mut frontend = StubFrontend::default();

        let a = manager.new_document();
        let b = manager.new_document();
        frontend.selected.insert(a);

        manager.on_focus_changed(Some(a), &frontend);
        let states = manager.command_states();
        assert!(states.cut && states.copy);

        manager.on_focus_changed(Some(b), &frontend);
        let states = manager.command_states();
        assert!(!states.cut && !states.copy);
        assert!(states.paste);
    }

    #[test]
    fn test_focus_change_to_unknown_session_is_ignored() {
        let mut manager = SessionManager::new();
        let frontend = StubFrontend::default();

        let a = manager.new_document();
        manager.on_focus_changed(Some(SessionId::new()), &frontend);
        assert_eq!(manager.focused_id(), Some(a));
    }

    #[test]
    fn test_has_unsaved_changes() {
        let mut manager = SessionManager::new();
        let id = manager.new_document();
        assert!(!manager.has_unsaved_changes());

        manager.get_mut(id).unwrap().set_content("text");
        assert!(manager.has_unsaved_changes());
    }
}
