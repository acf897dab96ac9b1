//! CLI, configuration, console prompter, commands
//!
//! This crate provides the `mathdrill` command-line interface.

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
