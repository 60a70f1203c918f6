//! Mutating git operations through the `git` binary.

use crate::{
    debug,
    utils::exec::{Cmd, FilterRule, SILENT_FILTER},
};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Noise git prints on stderr for successful operations.
///
/// Ref updates such as `b7749fa..8e384e3  gh-pages -> gh-pages` are
/// dropped by their arrow.
static GIT_FILTER: FilterRule = FilterRule::new(&[
    "Switched to branch",
    "Already on",
    "Your branch is",
    "(use \"git",
    "From ",
    "* branch",
    "hint:",
    "To ",
])
.skip_containing(&[" -> "]);

/// A `git` client bound to one working tree.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Working-tree root every command runs in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cmd(&self) -> Cmd {
        Cmd::new("git").cwd(&self.root).filter(&GIT_FILTER)
    }

    /// Run git and return trimmed stdout, without logging stderr.
    fn query<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = Cmd::new("git")
            .cwd(&self.root)
            .args(args)
            .filter(&SILENT_FILTER)
            .run()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        debug!("git"; "checkout {branch}");
        self.cmd().args(["checkout", branch]).run()?;
        Ok(())
    }

    /// Fast-forward the checked out branch from `remote/branch`.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        debug!("git"; "pull {remote} {branch}");
        self.cmd()
            .args(["pull", "--ff-only", remote, branch])
            .run()?;
        Ok(())
    }

    /// Stage every change in the working tree, deletions included.
    pub fn add_all(&self) -> Result<()> {
        self.cmd().args(["add", "--all"]).run()?;
        Ok(())
    }

    /// Porcelain status lines of the working tree.
    pub fn status(&self, include_untracked: bool) -> Result<Vec<String>> {
        let untracked = if include_untracked {
            "--untracked-files=all"
        } else {
            "--untracked-files=no"
        };
        let stdout = self.query(["status", "--porcelain", untracked])?;
        Ok(stdout.lines().map(str::to_string).collect())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.cmd().args(["commit", "--quiet", "-m", message]).run()?;
        Ok(())
    }

    /// Abbreviated id of the commit HEAD points at.
    pub fn head_short_id(&self) -> Result<String> {
        self.query(["rev-parse", "--short", "HEAD"])
    }

    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        debug!("git"; "push {remote} {branch}");
        self.cmd().args(["push", remote, branch]).run()?;
        Ok(())
    }

    /// Discard changes to tracked files of the checked out branch.
    pub fn reset_hard(&self) -> Result<()> {
        self.cmd().args(["reset", "--quiet", "--hard", "HEAD"]).run()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::git::fixture::Fixture;
    use std::fs;

    #[test]
    fn test_git_filter_drops_success_chatter() {
        let stderr = "\
Switched to branch 'gh-pages'
Your branch is ahead of 'origin/gh-pages' by 1 commit.
  (use \"git push\" to publish your local commits)
From /tmp/remote
 * branch            main       -> FETCH_HEAD
To /tmp/remote.git
   b7749fa..8e384e3  gh-pages -> gh-pages
warning: refname 'main' is ambiguous.";
        assert_eq!(
            GIT_FILTER.keep(stderr),
            vec!["warning: refname 'main' is ambiguous.".to_string()]
        );
    }

    #[test]
    fn test_status_reports_tracked_changes() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);

        assert!(git.status(false).unwrap().is_empty());

        fs::write(fixture.work.join("docs/index.src"), "changed").unwrap();
        fs::write(fixture.work.join("scratch.txt"), "untracked").unwrap();

        let tracked = git.status(false).unwrap();
        assert_eq!(tracked.len(), 1);
        assert!(tracked[0].ends_with("docs/index.src"));

        let all = git.status(true).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_checkout_missing_branch_fails() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);
        let err = git.checkout("no-such-branch").unwrap_err();
        assert!(format!("{err:#}").contains("no-such-branch"));
    }

    #[test]
    fn test_commit_and_reset() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);
        let before = git.head_short_id().unwrap();

        fs::write(fixture.work.join("notes.md"), "notes").unwrap();
        git.add_all().unwrap();
        git.commit("add notes").unwrap();
        let after = git.head_short_id().unwrap();
        assert_ne!(before, after);

        fs::remove_file(fixture.work.join("notes.md")).unwrap();
        git.reset_hard().unwrap();
        assert!(fixture.work.join("notes.md").exists());
    }

    #[test]
    fn test_pull_and_push_round_trip() {
        let fixture = Fixture::new();
        let git = Git::new(&fixture.work);

        git.pull("origin", "main").unwrap();
        fs::write(fixture.work.join("notes.md"), "notes").unwrap();
        git.add_all().unwrap();
        git.commit("add notes").unwrap();
        git.push("origin", "main").unwrap();

        assert_eq!(fixture.local_id("main"), fixture.remote_id("main"));
    }
}
