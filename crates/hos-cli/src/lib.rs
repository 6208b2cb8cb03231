//! Hours-of-Service checker CLI library.
//!
//! This crate provides the CLI interface around `hos-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
