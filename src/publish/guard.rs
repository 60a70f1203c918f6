//! Scoped ownership of "the work tree is away from the source branch".

use crate::{log, utils::git::Git};
use anyhow::Result;

/// Checks the source branch out again when the run ends, however it ends.
///
/// [`release`](Self::release) performs the checkout and reports its error;
/// dropping an unreleased guard does the same on failure paths and only
/// logs. While the publishing tree holds uncommitted swap results
/// ([`mark_dirty`](Self::mark_dirty)), they are discarded first so the
/// checkout is not refused.
pub struct BranchGuard<'a> {
    git: &'a Git,
    branch: String,
    tree_dirty: bool,
    armed: bool,
}

impl<'a> BranchGuard<'a> {
    pub fn new(git: &'a Git, branch: impl Into<String>) -> Self {
        Self {
            git,
            branch: branch.into(),
            tree_dirty: false,
            armed: true,
        }
    }

    /// The publishing tree is being rewritten and not yet committed.
    pub fn mark_dirty(&mut self) {
        self.tree_dirty = true;
    }

    /// The publishing tree matches its HEAD again.
    pub fn mark_clean(&mut self) {
        self.tree_dirty = false;
    }

    /// Check the source branch out and disarm.
    pub fn release(mut self) -> Result<()> {
        self.armed = false;
        self.restore()
    }

    fn restore(&self) -> Result<()> {
        if self.tree_dirty {
            log!("publish"; "discarding partial changes on the publishing branch");
            self.git.reset_hard()?;
        }
        self.git.checkout(&self.branch)
    }
}

impl Drop for BranchGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.restore() {
            Ok(()) => log!("publish"; "back on {}", self.branch),
            Err(e) => log!("error"; "could not check out {}: {:#}", self.branch, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::git::fixture::Fixture;
    use std::fs;

    #[test]
    fn test_drop_restores_branch() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);
        {
            let _guard = BranchGuard::new(&git, "main");
            git.checkout("gh-pages").unwrap();
            assert_eq!(fixture.current_branch(), "gh-pages");
        }
        assert_eq!(fixture.current_branch(), "main");
    }

    #[test]
    fn test_drop_discards_dirty_tree_first() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);
        {
            let mut guard = BranchGuard::new(&git, "main");
            git.checkout("gh-pages").unwrap();
            guard.mark_dirty();
            fs::write(fixture.work.join("index.html"), "half written").unwrap();
            fs::remove_file(fixture.work.join("stale.html")).unwrap();
        }
        assert_eq!(fixture.current_branch(), "main");
        // gh-pages itself is untouched
        assert_eq!(
            fixture.git(&["show", "gh-pages:index.html"]),
            "<h1>v0</h1>"
        );
        assert_eq!(fixture.files_on("gh-pages"), vec!["index.html", "stale.html"]);
    }

    #[test]
    fn test_release_reports_checkout_error() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);
        let guard = BranchGuard::new(&git, "missing-branch");
        assert!(guard.release().is_err());
        assert_eq!(fixture.current_branch(), "main");
    }
}
