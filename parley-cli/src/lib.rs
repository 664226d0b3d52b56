//! parley-cli - Score setup over the parley query protocol
//!
//! An [`Engine`] asks, a [`Terminal`] answers from a line-based input.
//! The `parley` binary wires both to stdin/stdout.

pub mod engine;
pub mod terminal;

pub use engine::{Engine, DEFAULT_MAX_ROUNDS, ENGINE_NAME};
pub use terminal::Terminal;

/// Participant name the terminal front-end answers to
pub const TERMINAL_NAME: &str = "cli";
