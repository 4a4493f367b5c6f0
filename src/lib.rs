//! Spectron - chat with your documents from the terminal.
//!
//! Client library for a retrieval-augmented chat backend: document upload
//! and status tracking, plus a question/answer conversation grounded in
//! those documents.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
