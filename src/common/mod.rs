//! Shared utilities used across the library and the binary.

pub mod logger;
pub mod time;
