//! Git access for the publish workflow.
//!
//! - [`repo`]: read-only inspection via `gix` (discovery, HEAD, refs)
//! - [`command`]: checkout, pull, commit, push via the `git` binary

mod command;
mod repo;

#[cfg(test)]
pub mod fixture;

pub use command::Git;
pub use repo::{BranchPresence, branch_presence, current_branch, find_repo_root, open_repo};
