//! Command-line interface module.

mod args;
pub mod serve;
pub mod stage;

pub use args::{Cli, Commands};
