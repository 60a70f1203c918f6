//! Command-line interface module.

mod args;
pub mod check;
pub mod publish;

pub use args::{Cli, Commands, PublishArgs};
