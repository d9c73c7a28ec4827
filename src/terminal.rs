//! Interactive terminal frontend
//!
//! The reference `Frontend` implementation plus the command loop that
//! drives the session manager. Dialogs become `inquire` prompts; the text
//! surface is a line-oriented command set with an explicit selection
//! range per session.

use crate::clipboard::{ClipboardError, ClipboardManager};
use crate::config;
use crate::frontend::{CloseChoice, EditCommand, Frontend};
use crate::session::{CloseOutcome, Command, DocumentSession, SessionId, SessionManager};
use crate::utils;
use console::style;
use inquire::{Select, Text};
use ropey::Rope;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Terminal implementation of the toolkit collaborator
///
/// Owns the system clipboard handle and one selection (a character
/// range) per session, the piece of view state the core deliberately
/// does not model.
pub struct TerminalFrontend {
    clipboard: ClipboardManager,
    selections: HashMap<SessionId, Range<usize>>,
}

impl TerminalFrontend {
    /// Create a new terminal frontend
    pub fn new() -> Self {
        Self {
            clipboard: ClipboardManager::new(),
            selections: HashMap::new(),
        }
    }

    /// Set the selection for a session
    pub fn set_selection(&mut self, id: SessionId, range: Range<usize>) {
        self.selections.insert(id, range);
    }

    /// Clear the selection for a session
    pub fn clear_selection(&mut self, id: SessionId) {
        self.selections.remove(&id);
    }

    /// The stored selection clamped to the current content length
    fn clamped_selection(&self, id: SessionId, len: usize) -> Option<Range<usize>> {
        let range = self.selections.get(&id)?;
        let end = range.end.min(len);
        let start = range.start.min(end);
        (start < end).then(|| start..end)
    }
}

impl Default for TerminalFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for TerminalFrontend {
    fn pick_open_path(&mut self) -> Option<PathBuf> {
        prompt_path("Open file:", "")
    }

    fn pick_save_path(&mut self, suggested: &str) -> Option<PathBuf> {
        prompt_path("Save to:", suggested)
    }

    fn ask_save_discard_cancel(&mut self, name: &str) -> CloseChoice {
        let prompt = format!("\"{}\" has been modified. Save your changes?", name);
        match Select::new(&prompt, vec!["Save", "Discard", "Cancel"]).prompt() {
            Ok("Save") => CloseChoice::Save,
            Ok("Discard") => CloseChoice::Discard,
            // Esc or a prompt failure keeps the document open
            _ => CloseChoice::Cancel,
        }
    }

    fn report_error(&mut self, title: &str, message: &str) {
        log::error!("{}: {}", title, message);
        eprintln!("{} {}", style(format!("{}:", title)).red().bold(), message);
    }

    fn has_selection(&self, id: SessionId) -> bool {
        self.selections.get(&id).map_or(false, |r| !r.is_empty())
    }

    fn apply_edit(&mut self, session: &mut DocumentSession, command: EditCommand) {
        let id = session.id();
        match command {
            EditCommand::Copy | EditCommand::Cut => {
                let Some(range) = self.clamped_selection(id, session.char_count()) else {
                    log::debug!("clipboard command with no usable selection");
                    return;
                };
                let text = session.content().slice(range.clone()).to_string();
                if let Err(e) = self.clipboard.set_text(&text) {
                    self.report_error("Clipboard error", &e.to_string());
                    return;
                }
                if command == EditCommand::Cut {
                    session.remove(range);
                    self.selections.remove(&id);
                }
            }
            EditCommand::Paste => match self.clipboard.get_text() {
                Ok(text) => {
                    // Insert after the selection, or at the end of the document
                    let at = self
                        .clamped_selection(id, session.char_count())
                        .map(|r| r.end)
                        .unwrap_or_else(|| session.char_count());
                    session.insert(at, &text);
                }
                Err(ClipboardError::Empty) => log::debug!("paste with empty clipboard"),
                Err(e) => self.report_error("Clipboard error", &e.to_string()),
            },
        }
    }
}

/// Ask for a path, returning `None` when dismissed or left empty
fn prompt_path(message: &str, initial: &str) -> Option<PathBuf> {
    let text = Text::new(message);
    let text = if initial.is_empty() {
        text
    } else {
        text.with_initial_value(initial)
    };
    match text.prompt_skippable() {
        Ok(Some(answer)) => {
            let answer = answer.trim();
            if answer.is_empty() {
                None
            } else {
                Some(utils::path::expand_tilde(Path::new(answer)))
            }
        }
        Ok(None) => None,
        Err(e) => {
            log::debug!("prompt failed: {}", e);
            None
        }
    }
}

/// One parsed command-loop input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Help,
    New,
    Open(Option<PathBuf>),
    List,
    Focus(usize),
    Show,
    Edit,
    Append,
    Select(usize, usize),
    Unselect,
    Cut,
    Copy,
    Paste,
    Save,
    SaveAs(Option<PathBuf>),
    Close,
    Quit,
    Empty,
}

/// Parse one input line; the remainder after the first word is taken
/// verbatim so paths may contain spaces
fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let optional_path = || (!rest.is_empty()).then(|| PathBuf::from(rest));

    match word {
        "help" | "?" => Ok(ReplCommand::Help),
        "new" => Ok(ReplCommand::New),
        "open" => Ok(ReplCommand::Open(optional_path())),
        "list" | "ls" => Ok(ReplCommand::List),
        "focus" => rest
            .parse::<usize>()
            .map(ReplCommand::Focus)
            .map_err(|_| "usage: focus N".to_string()),
        "show" | "cat" => Ok(ReplCommand::Show),
        "edit" => Ok(ReplCommand::Edit),
        "append" => Ok(ReplCommand::Append),
        "select" => {
            let mut parts = rest.split_whitespace();
            match (
                parts.next().and_then(|p| p.parse::<usize>().ok()),
                parts.next().and_then(|p| p.parse::<usize>().ok()),
            ) {
                (Some(from), Some(to)) if parts.next().is_none() => {
                    Ok(ReplCommand::Select(from, to))
                }
                _ => Err("usage: select FROM-LINE TO-LINE".to_string()),
            }
        }
        "unselect" => Ok(ReplCommand::Unselect),
        "cut" => Ok(ReplCommand::Cut),
        "copy" => Ok(ReplCommand::Copy),
        "paste" => Ok(ReplCommand::Paste),
        "save" => Ok(ReplCommand::Save),
        "saveas" => Ok(ReplCommand::SaveAs(optional_path())),
        "close" => Ok(ReplCommand::Close),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        _ => Err(format!("unknown command: {} (try 'help')", word)),
    }
}

/// Convert a 1-based inclusive line range to a character range
fn line_range(rope: &Rope, from: usize, to: usize) -> Option<Range<usize>> {
    if from == 0 || to < from || from > rope.len_lines() {
        return None;
    }
    let start = rope.line_to_char(from - 1);
    let end = if to >= rope.len_lines() {
        rope.len_chars()
    } else {
        rope.line_to_char(to)
    };
    (start < end).then(|| start..end)
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the command loop until the user quits (or input ends)
pub fn run(manager: &mut SessionManager, frontend: &mut TerminalFrontend) -> anyhow::Result<()> {
    println!(
        "{} {} (type 'help' for commands)",
        config::APP_NAME,
        env!("CARGO_PKG_VERSION")
    );

    let mut input = std::io::stdin().lock();
    loop {
        let title = manager
            .focused()
            .map(|s| s.title())
            .unwrap_or_else(|| "no document".to_string());
        print!("[{}]> ", title);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // End of input is a quit request; there is no terminal left to
            // ask on, so unsaved documents can only be noted
            if manager.close_all(frontend) == CloseOutcome::Abort {
                log::warn!("exiting with unsaved documents still open");
            }
            return Ok(());
        }

        match parse_command(&line) {
            Err(msg) => println!("{}", msg),
            Ok(command) => {
                if execute(command, manager, frontend, &mut input)? == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

fn execute(
    command: ReplCommand,
    manager: &mut SessionManager,
    frontend: &mut TerminalFrontend,
    input: &mut dyn BufRead,
) -> anyhow::Result<Flow> {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Help => print_help(),
        ReplCommand::New => {
            manager.new_document();
        }
        ReplCommand::Open(Some(path)) => {
            manager.open_document(utils::path::expand_tilde(&path), frontend);
        }
        ReplCommand::Open(None) => {
            manager.open_document_interactive(frontend);
        }
        ReplCommand::List => list_sessions(manager),
        ReplCommand::Focus(n) => {
            match manager.sessions().get(n.wrapping_sub(1)).map(|s| s.id()) {
                Some(id) => manager.on_focus_changed(Some(id), frontend),
                None => println!("no document {}", n),
            }
        }
        ReplCommand::Show => match manager.focused() {
            Some(session) => {
                let text = session.content_str();
                print!("{}", text);
                if !text.ends_with('\n') {
                    println!();
                }
            }
            None => println!("no focused document"),
        },
        ReplCommand::Edit | ReplCommand::Append => {
            let Some(id) = manager.focused_id() else {
                println!("no focused document");
                return Ok(Flow::Continue);
            };
            let append = command == ReplCommand::Append;
            let block = read_block(input)?;
            if let Some(session) = manager.get_mut(id) {
                if append {
                    let at = session.char_count();
                    session.insert(at, &block);
                } else {
                    session.set_content(&block);
                }
            }
        }
        ReplCommand::Select(from, to) => select_lines(manager, frontend, from, to),
        ReplCommand::Unselect => {
            if let Some(id) = manager.focused_id() {
                frontend.clear_selection(id);
                manager.on_focus_changed(Some(id), frontend);
            }
        }
        ReplCommand::Cut => clipboard_command(manager, frontend, Command::Cut),
        ReplCommand::Copy => clipboard_command(manager, frontend, Command::Copy),
        ReplCommand::Paste => clipboard_command(manager, frontend, Command::Paste),
        ReplCommand::Save => manager.dispatch(Command::Save, frontend),
        ReplCommand::SaveAs(None) => manager.dispatch(Command::SaveAs, frontend),
        ReplCommand::SaveAs(Some(path)) => {
            let Some(id) = manager.focused_id() else {
                println!("no focused document");
                return Ok(Flow::Continue);
            };
            let path = utils::path::expand_tilde(&path);
            if let Some(session) = manager.get_mut(id) {
                if let Err(e) = session.save_as(path) {
                    frontend.report_error("Save failed", &e.user_message());
                }
            }
        }
        ReplCommand::Close => match manager.focused_id() {
            Some(id) => {
                manager.close_document(id, frontend);
            }
            None => println!("no focused document"),
        },
        ReplCommand::Quit => {
            if manager.close_all(frontend) == CloseOutcome::Proceed {
                return Ok(Flow::Quit);
            }
            println!("Quit cancelled; unsaved documents remain open");
        }
    }
    Ok(Flow::Continue)
}

/// Route a clipboard command, honoring the enablement map
fn clipboard_command(manager: &mut SessionManager, frontend: &mut TerminalFrontend, command: Command) {
    let states = manager.command_states();
    let enabled = match command {
        Command::Cut => states.cut,
        Command::Copy => states.copy,
        Command::Paste => states.paste,
        _ => false,
    };
    if !enabled {
        println!("nothing to do (no document focused or nothing selected)");
        return;
    }
    manager.dispatch(command, frontend);
}

fn select_lines(manager: &mut SessionManager, frontend: &mut TerminalFrontend, from: usize, to: usize) {
    let Some(id) = manager.focused_id() else {
        println!("no focused document");
        return;
    };
    let (range, lines) = match manager.get(id) {
        Some(session) => (line_range(session.content(), from, to), session.line_count()),
        None => return,
    };
    match range {
        Some(range) => {
            frontend.set_selection(id, range);
            manager.on_focus_changed(Some(id), frontend);
        }
        None => println!(
            "invalid line range {} {} (document has {} lines)",
            from, to, lines
        ),
    }
}

fn list_sessions(manager: &SessionManager) {
    if manager.is_empty() {
        println!("no open documents");
        return;
    }
    for (i, session) in manager.sessions().iter().enumerate() {
        let marker = if Some(session.id()) == manager.focused_id() {
            "*"
        } else {
            " "
        };
        let path = session
            .path()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| "(never saved)".to_string());
        println!(
            "{} {:>2}  {:<24} {:<14} {}",
            marker,
            i + 1,
            session.title(),
            session.encoding().display_name(),
            utils::text::truncate(&path, 48)
        );
    }
}

/// Read input lines until a single `.` on its own line (or end of input)
fn read_block(input: &mut dyn BufRead) -> anyhow::Result<String> {
    println!("(end input with a single '.' on its own line)");
    let mut block = String::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim_end() == "." {
            break;
        }
        block.push_str(&line);
    }
    Ok(block)
}

fn print_help() {
    println!(
        r#"Commands:
    new                 Create a new untitled document
    open [PATH]         Open a file (prompts for a path if omitted)
    list                List open documents (* marks the focused one)
    focus N             Focus document N from the list
    show                Print the focused document
    edit                Replace the focused document's content
    append              Append lines to the focused document
    select FROM TO      Select a 1-based line range
    unselect            Clear the selection
    cut | copy | paste  Clipboard operations on the selection
    save                Save the focused document
    saveas [PATH]       Save under a new name (prompts if omitted)
    close               Close the focused document
    quit                Close all documents and exit
    help                Show this message"#
    );
}
