//! In-memory state store for the chat core.
//!
//! [`ChatState`] owns the canonical session state: current user, current
//! room, the ordered room directory, and the active-user list. It is the
//! explicit replacement for ambient globals; every mutation goes through a
//! method here, and the controller in [`crate::app`] decides what to
//! persist and render afterwards.
//!
//! Invariants upheld by this module:
//!
//! - every room in the directory has an associated (possibly empty)
//!   message list
//! - the active-user list contains no duplicate names
//! - `current_room` always names a room present in the directory

use crate::domain::{DEFAULT_ROOM, DomainError, Message, Room, SEED_ROOMS, Username};
use crate::formatter;

/// Result of a [`ChatState::create_room`] call.
///
/// Only `Created` changes state; the other outcomes are silent no-ops and
/// deliberately not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateRoomOutcome {
    /// A new empty room was created and switched to
    Created,
    /// A room with that name already exists; nothing changed
    AlreadyExists,
    /// The name was empty (prompt cancelled); nothing changed
    EmptyName,
}

/// Canonical in-memory session state.
#[derive(Debug, Clone)]
pub struct ChatState {
    /// Display name picked at login; `None` until login completes
    current_user: Option<Username>,
    /// Name of the room new messages go to; always present in `rooms`
    current_room: String,
    /// Room directory in creation order
    rooms: Vec<Room>,
    /// Names that logged in during this session or were restored from
    /// storage, in insertion order, duplicate-free
    active_users: Vec<String>,
}

impl ChatState {
    /// Create the cold-start state: seeded rooms, no user, default room.
    pub fn new() -> Self {
        Self {
            current_user: None,
            current_room: DEFAULT_ROOM.to_string(),
            rooms: SEED_ROOMS.iter().map(|name| Room::new(*name)).collect(),
            active_users: Vec::new(),
        }
    }

    /// Log in with a raw display name.
    ///
    /// The name is trimmed and validated (3-20 characters of
    /// `[A-Za-z0-9_]`). On success the current user is set and the name is
    /// appended to the active-user list unless already present, so
    /// repeating the same login is idempotent. A later login with a
    /// different valid name replaces the current user (there is no real
    /// authentication); the shipped front end drives login exactly once
    /// per session, which is what keeps the name fixed for a session.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw login input
    ///
    /// # Returns
    ///
    /// The logged-in username, or `DomainError::InvalidUsername` with no
    /// state change
    pub fn login(&mut self, raw: &str) -> Result<&Username, DomainError> {
        let name = Username::new(raw)?;
        if !self.active_users.iter().any(|u| u == name.as_str()) {
            self.active_users.push(name.as_str().to_string());
        }
        Ok(&*self.current_user.insert(name))
    }

    /// Append a message to the current room.
    ///
    /// Empty or whitespace-only input is a silent no-op (`Ok(None)`)
    /// regardless of login state. Otherwise the text is escaped (see
    /// [`crate::formatter::escape_text`]) and stored with the current user
    /// and the given wall-clock time.
    ///
    /// # Arguments
    ///
    /// * `raw_text` - Raw message input, stored untrimmed after escaping
    /// * `time` - Wall-clock `HH:MM` string captured at send time
    ///
    /// # Returns
    ///
    /// The appended message, `Ok(None)` for empty input, or
    /// `DomainError::NotLoggedIn` if no login completed yet
    pub fn send_message(
        &mut self,
        raw_text: &str,
        time: String,
    ) -> Result<Option<&Message>, DomainError> {
        if raw_text.trim().is_empty() {
            return Ok(None);
        }

        let user = self
            .current_user
            .as_ref()
            .ok_or(DomainError::NotLoggedIn)?
            .as_str()
            .to_string();

        let message = Message {
            user,
            text: formatter::escape_text(raw_text),
            time,
        };

        let current_room = &self.current_room;
        let room = self
            .rooms
            .iter_mut()
            .find(|r| &r.name == current_room)
            .ok_or_else(|| DomainError::RoomNotFound(current_room.clone()))?;
        room.messages.push(message);
        Ok(room.messages.last())
    }

    /// Switch the current room.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of an existing room
    ///
    /// # Returns
    ///
    /// `DomainError::RoomNotFound` (with state unchanged) if no room with
    /// that name exists
    pub fn switch_room(&mut self, name: &str) -> Result<(), DomainError> {
        if self.rooms.iter().any(|r| r.name == name) {
            self.current_room = name.to_string();
            Ok(())
        } else {
            Err(DomainError::RoomNotFound(name.to_string()))
        }
    }

    /// Create a room and switch to it.
    ///
    /// Room names are free-form and not trimmed. An empty name (cancelled
    /// prompt) and an already-existing name are both silent no-ops; in the
    /// duplicate case the current room does not change either.
    ///
    /// # Arguments
    ///
    /// * `name` - Proposed room name
    pub fn create_room(&mut self, name: &str) -> CreateRoomOutcome {
        if name.is_empty() {
            return CreateRoomOutcome::EmptyName;
        }
        if self.rooms.iter().any(|r| r.name == name) {
            return CreateRoomOutcome::AlreadyExists;
        }
        self.rooms.push(Room::new(name));
        self.current_room = name.to_string();
        CreateRoomOutcome::Created
    }

    /// Filter the current room's messages by a search term.
    ///
    /// Pure query: returns the order-preserving subsequence of messages
    /// whose escaped text or author name contains `term`
    /// case-insensitively. The exact empty string returns everything.
    ///
    /// # Arguments
    ///
    /// * `term` - Search term; not trimmed
    pub fn filter_messages(&self, term: &str) -> Vec<&Message> {
        let messages = self
            .rooms
            .iter()
            .find(|r| r.name == self.current_room)
            .map(|r| r.messages.as_slice())
            .unwrap_or(&[]);

        if term.is_empty() {
            return messages.iter().collect();
        }

        let needle = term.to_lowercase();
        messages
            .iter()
            .filter(|m| {
                m.text.to_lowercase().contains(&needle) || m.user.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Replace the room directory wholesale (used by the startup load).
    ///
    /// If the incoming set does not contain the current room, an empty room
    /// with that name is appended to keep the current-room invariant.
    pub fn replace_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        if !self.rooms.iter().any(|r| r.name == self.current_room) {
            self.rooms.push(Room::new(self.current_room.clone()));
        }
    }

    /// Replace the active-user list wholesale (used by the startup load).
    ///
    /// Duplicates in the incoming list are dropped, keeping the first
    /// occurrence, to restore the no-duplicates invariant.
    pub fn replace_active_users(&mut self, users: Vec<String>) {
        let mut seen = std::collections::HashSet::new();
        self.active_users = users.into_iter().filter(|u| seen.insert(u.clone())).collect();
    }

    pub fn current_user(&self) -> Option<&Username> {
        self.current_user.as_ref()
    }

    pub fn current_room(&self) -> &str {
        &self.current_room
    }

    /// Room directory in creation order
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Room names in creation order
    pub fn room_names(&self) -> Vec<&str> {
        self.rooms.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn active_users(&self) -> &[String] {
        &self.active_users
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
