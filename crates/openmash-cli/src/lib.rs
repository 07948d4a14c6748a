//! The `openmash` command-line tool.
//!
//! Loads consumer credentials, builds a client for one user, and either
//! reports the resulting configuration or makes a request as that user.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::Cli;
pub use error::{CliError, CliResult};
