//! Trill CLI Library
//!
//! Terminal front end for the single-track player: configuration loading,
//! the stdin command language and the terminal output adapter.
//!
//! This library exposes the pieces the binary wires together, for testing.

pub mod commands;
pub mod config;
pub mod error;
pub mod terminal;

pub use commands::{execute, parse, resolve, Command, Flow};
pub use config::{Overrides, Settings};
pub use error::{CliError, Result};
pub use terminal::TerminalOutput;
