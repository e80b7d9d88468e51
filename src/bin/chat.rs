//! Local chat room demo with persistent history.
//!
//! Picks a display name, joins the default room, and exchanges messages in
//! named rooms. Everything is local to this machine: state is mirrored
//! into a data directory and restored on the next run.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chat
//! cargo run --bin chat -- --name alice_1 --data-dir /tmp/chat
//! ```

use std::path::PathBuf;

use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use idobata::app::ChatApp;
use idobata::common::logger::setup_logger;
use idobata::common::time::SystemClock;
use idobata::storage::FileStore;
use idobata::view::TerminalView;

#[derive(Parser, Debug)]
#[command(name = "chat")]
#[command(about = "Local chat room demo with rooms, search and persistent history", long_about = None)]
struct Args {
    /// Display name (3-20 characters, alphanumeric or underscore); prompted if omitted
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Directory where chat history is persisted
    #[arg(short = 'd', long, default_value = ".idobata")]
    data_dir: PathBuf,
}

fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("Chat error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&args.data_dir)?;
    let mut app = ChatApp::new(store, TerminalView::new(), SystemClock);
    let mut rl = DefaultEditor::new()?;

    // Login phase: either the --name argument or an interactive prompt,
    // repeated until a name passes validation.
    match args.name {
        Some(name) => {
            if !app.login(&name) {
                std::process::exit(1);
            }
        }
        None => loop {
            match rl.readline("name> ") {
                Ok(line) => {
                    if app.login(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(Box::new(e)),
            }
        },
    }

    println!("\nType a message and press Enter to send. /help lists commands.");

    loop {
        let prompt = format!(
            "{}@{}> ",
            app.state()
                .current_user()
                .map(|u| u.as_str())
                .unwrap_or(""),
            app.state().current_room()
        );

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if let Some(command) = line.trim().strip_prefix('/') {
                    if !handle_command(&mut app, command) {
                        break;
                    }
                } else {
                    // Message text is passed through untrimmed; the state
                    // store ignores whitespace-only input itself.
                    app.send_message(&line);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                tracing::info!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                tracing::info!("EOF");
                break;
            }
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Dispatch a `/command`. Returns `false` when the session should end.
fn handle_command<S, V, C>(app: &mut ChatApp<S, V, C>, command: &str) -> bool
where
    S: idobata::storage::KeyValueStore,
    V: idobata::view::View,
    C: idobata::common::time::Clock,
{
    let (name, rest) = match command.split_once(' ') {
        Some((name, rest)) => (name, rest),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return false,
        "help" => print_help(),
        "rooms" => app.show_rooms(),
        "users" => app.show_users(),
        "join" => app.switch_room(rest),
        "create" => app.create_room(rest),
        "search" => app.search(rest),
        _ => println!("Unknown command '/{}'. /help lists commands.", name),
    }

    true
}

fn print_help() {
    println!("Commands:");
    println!("  /rooms            list rooms");
    println!("  /join <room>      switch to an existing room");
    println!("  /create <room>    create a room and switch to it");
    println!("  /users            list active users");
    println!("  /search <term>    filter the current room's messages");
    println!("  /quit             exit");
    println!("Markup: *bold*, _italic_, and bare http(s) URLs become links.");
}
