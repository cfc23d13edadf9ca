//! CLI command handlers
//!
//! Argument parsing structures and the routing of each subcommand to the
//! library.

pub mod args;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;
