//! CLI subcommand implementations.

pub mod check;
pub mod classify;
pub mod evaluate;
pub mod events;
pub mod util;
