//! Utility modules shared by the publish workflow.

pub mod exec;
pub mod git;
pub mod path;
mod plural;

pub use plural::plural_count;
