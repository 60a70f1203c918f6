//! Read-only repository inspection through `gix`.
//!
//! Mutating operations go through the `git` binary (see `command.rs`);
//! this side only answers questions about refs and locations.

use anyhow::{Context, Result, anyhow};
use gix::Repository;
use std::path::{Path, PathBuf};

/// Discover the repository containing `start` (searching upward).
pub fn open_repo(start: &Path) -> Result<Repository> {
    gix::discover(start)
        .with_context(|| format!("`{}` is not inside a git repository", start.display()))
}

/// Get repository root path
pub fn get_repo_root(repo: &Repository) -> Result<&Path> {
    if repo.is_bare() {
        return Err(anyhow!("bare repositories have no working tree"));
    }
    repo.path()
        .parent()
        .ok_or_else(|| anyhow!("Invalid repository path"))
}

/// Discover the work-tree root of the repository containing `start`.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    let repo = open_repo(start)?;
    Ok(get_repo_root(&repo)?.to_path_buf())
}

/// Short name of the checked out branch, `None` when HEAD is detached.
pub fn current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head_name().context("Failed to read HEAD")?;
    Ok(head.map(|name| name.shorten().to_string()))
}

/// Where a branch can be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPresence {
    /// `refs/heads/<branch>` exists.
    pub local: bool,
    /// `refs/remotes/<remote>/<branch>` exists.
    pub remote: bool,
}

impl BranchPresence {
    /// The branch can be checked out without fetching first.
    pub const fn available(&self) -> bool {
        self.local || self.remote
    }
}

/// Look up a branch locally and as a remote-tracking ref.
pub fn branch_presence(repo: &Repository, remote: &str, branch: &str) -> BranchPresence {
    let exists = |name: String| repo.find_reference(name.as_str()).is_ok();
    BranchPresence {
        local: exists(format!("refs/heads/{branch}")),
        remote: exists(format!("refs/remotes/{remote}/{branch}")),
    }
}
