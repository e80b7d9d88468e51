//! Domain model for the chat core.
//!
//! Value objects validate themselves at construction time, so the rest of
//! the crate can rely on their invariants without re-checking.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The room every session starts in.
pub const DEFAULT_ROOM: &str = "General";

/// Rooms that always exist at cold start.
pub const SEED_ROOMS: [&str; 3] = ["General", "Project Updates", "Design Feedback"];

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap());

/// Domain-level errors (all validation-level, none fatal)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Login name failed the length/character constraints
    #[error("invalid username '{0}': must be 3-20 characters, alphanumeric or underscore only")]
    InvalidUsername(String),

    /// Room switch targeted a room that was never created
    #[error("room '{0}' does not exist")]
    RoomNotFound(String),

    /// A message was sent before any login completed
    #[error("no user is logged in")]
    NotLoggedIn,
}

/// Validated display name.
///
/// A `Username` can only be constructed from a string that, after trimming,
/// is 3-20 characters of `[A-Za-z0-9_]`. The name doubles as the user's
/// identity; there is no separate identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate and construct a username from raw input.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw input string; surrounding whitespace is trimmed first
    ///
    /// # Returns
    ///
    /// The validated username, or `DomainError::InvalidUsername` carrying
    /// the rejected input
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if USERNAME_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::InvalidUsername(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chat message as stored and persisted.
///
/// `text` holds the escaped input (see [`crate::formatter::escape_text`]),
/// never the rendered markup. `time` is a wall-clock `HH:MM` string
/// captured at send time; it is display data, not a sortable timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub user: String,
    pub text: String,
    pub time: String,
}

/// A named, independent ordered channel of messages.
///
/// A room exists from the moment its name is first used; there is no
/// deletion. Message order is append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Room {
    /// Create an empty room with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }
}
