//! Operator console for the blood bank stores.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::run;
