//! Multipad - a minimal multi-document plain-text editor
//!
//! Entry point for the application. Handles CLI argument parsing,
//! logging initialization, and application bootstrap.

mod clipboard;
mod config;
mod error;
mod file_handler;
mod frontend;
mod session;
mod terminal;
mod utils;

use session::SessionManager;
use terminal::TerminalFrontend;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    init_logging();

    log::info!("Starting {}", config::APP_NAME);

    let flags = parse_args();

    let mut manager = SessionManager::new();
    let mut frontend = TerminalFrontend::new();

    // Open every file given on the command line; failures are surfaced
    // and skipped, not retried
    let no_files_given = flags.files.is_empty();
    for path in flags.files {
        manager.open_document(utils::path::expand_tilde(&path), &mut frontend);
    }
    if no_files_given {
        manager.new_document();
    }

    terminal::run(&mut manager, &mut frontend)
}

/// Startup arguments
#[derive(Debug, Default)]
struct Flags {
    /// Files to open at startup
    files: Vec<PathBuf>,
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            _ => {
                // Treat as a file path; missing files surface an open
                // error at startup rather than being filtered here
                flags.files.push(PathBuf::from(arg));
            }
        }
    }

    flags
}

/// Print help message
fn print_help() {
    println!(
        r#"Multipad - a minimal multi-document plain-text editor

USAGE:
    multipad [OPTIONS] [FILES...]

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information

EXAMPLES:
    multipad                    Start with one empty document
    multipad notes.txt          Open a specific file
    multipad a.txt b.txt        Open multiple files

Type 'help' at the prompt for the in-editor command list.
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", config::APP_NAME, env!("CARGO_PKG_VERSION"));
}
