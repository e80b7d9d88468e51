//! Local chat room application library.
//!
//! This library provides the core of a single-user, local-only chat demo:
//! an in-memory state store for rooms, messages and active users, a
//! file-backed persistence adapter, and a best-effort message formatter.
//! A terminal front end lives in `src/bin/chat.rs`.

// layers
pub mod app;
pub mod domain;
pub mod formatter;
pub mod state;
pub mod storage;
pub mod view;

// shared library
pub mod common;
