//! View contract consumed by the application controller.
//!
//! The core never touches the screen directly: it hands the view ordered
//! message lists, user lists and room lists, and receives raw input strings
//! from whatever front end drives it. [`TerminalView`] is the shipped
//! implementation; controller tests substitute a recording test double.

use crate::domain::Message;
use crate::formatter;

/// Rendering surface for the chat core.
pub trait View {
    /// Render the given messages as the current room's content.
    ///
    /// Render-time markup (bold/italic/autolink) is applied here, on every
    /// render, and never stored.
    fn render(&mut self, room: &str, messages: &[&Message], current_user: Option<&str>);

    /// Render the active-user list.
    fn render_user_list(&mut self, users: &[String], current_user: Option<&str>);

    /// Render the room list with the current room marked.
    fn render_room_list(&mut self, rooms: &[&str], current_room: &str);

    /// Surface a user-facing validation message (the alert analog).
    fn show_validation_error(&mut self, message: &str);
}

/// Plain stdout implementation of [`View`].
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    pub fn new() -> Self {
        Self
    }
}

impl View for TerminalView {
    fn render(&mut self, room: &str, messages: &[&Message], current_user: Option<&str>) {
        println!("\n# {}", room);
        if messages.is_empty() {
            println!("  (no messages)");
            return;
        }
        for message in messages {
            let you = if current_user == Some(message.user.as_str()) {
                " (you)"
            } else {
                ""
            };
            println!(
                "  [{}] {}{}: {}",
                message.time,
                message.user,
                you,
                formatter::apply_markup(&message.text)
            );
        }
    }

    fn render_user_list(&mut self, users: &[String], current_user: Option<&str>) {
        println!("\nActive users:");
        for user in users {
            let you = if current_user == Some(user.as_str()) {
                " (you)"
            } else {
                ""
            };
            println!("  {}{}", user, you);
        }
    }

    fn render_room_list(&mut self, rooms: &[&str], current_room: &str) {
        println!("\nRooms:");
        for room in rooms {
            let marker = if *room == current_room { "*" } else { " " };
            println!("  {} # {}", marker, room);
        }
    }

    fn show_validation_error(&mut self, message: &str) {
        println!("! {}", message);
    }
}
