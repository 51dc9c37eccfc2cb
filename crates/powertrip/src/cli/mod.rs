//! Command-line interface.

mod check;
mod commands;

pub use check::check_config;
pub use commands::{Cli, Commands};
