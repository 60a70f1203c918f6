//! Scratch repositories for tests: a bare `origin` plus a clone with
//! `main` (doc sources) and `gh-pages` (previously published output).

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tempfile::TempDir;

pub struct Fixture {
    _dir: TempDir,
    pub remote: PathBuf,
    pub work: PathBuf,
}

/// Run git in `dir`, panicking with stderr on failure.
pub fn git_in(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git must be installed to run tests");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("remote.git");
        let work = dir.path().join("work");
        fs::create_dir_all(&remote).unwrap();
        fs::create_dir_all(&work).unwrap();

        git_in(&remote, &["init", "--quiet", "--bare"]);

        git_in(&work, &["init", "--quiet"]);
        git_in(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git_in(&work, &["config", "user.name", "Docs Bot"]);
        git_in(&work, &["config", "user.email", "docs@example.com"]);
        git_in(&work, &["config", "commit.gpgsign", "false"]);

        fs::create_dir_all(work.join("docs")).unwrap();
        fs::write(work.join(".gitignore"), "docs/build/\n").unwrap();
        fs::write(work.join("README.md"), "# project\n").unwrap();
        fs::write(work.join("docs/index.src"), "<h1>v1</h1>\n").unwrap();
        git_in(&work, &["add", "--all"]);
        git_in(&work, &["commit", "--quiet", "-m", "init"]);

        let remote_url = remote.to_string_lossy().to_string();
        git_in(&work, &["remote", "add", "origin", &remote_url]);
        git_in(&work, &["push", "--quiet", "origin", "main"]);

        // Publishing branch with an earlier build on it
        git_in(&work, &["checkout", "--quiet", "--orphan", "gh-pages"]);
        git_in(&work, &["rm", "-r", "-f", "--quiet", "."]);
        fs::write(work.join("index.html"), "<h1>v0</h1>\n").unwrap();
        fs::write(work.join("stale.html"), "old page\n").unwrap();
        git_in(&work, &["add", "--all"]);
        git_in(&work, &["commit", "--quiet", "-m", "first publish"]);
        git_in(&work, &["push", "--quiet", "origin", "gh-pages"]);
        git_in(&work, &["checkout", "--quiet", "main"]);

        Self {
            _dir: dir,
            remote,
            work,
        }
    }

    /// Run git in the working clone.
    pub fn git(&self, args: &[&str]) -> String {
        git_in(&self.work, args)
    }

    /// Full commit id of `branch` on the remote.
    pub fn remote_id(&self, branch: &str) -> String {
        git_in(&self.remote, &["rev-parse", branch])
    }

    /// Full commit id of the local `branch`.
    pub fn local_id(&self, branch: &str) -> String {
        self.git(&["rev-parse", branch])
    }

    /// Number of commits reachable from the local `branch`.
    pub fn commit_count(&self, branch: &str) -> usize {
        self.git(&["rev-list", "--count", branch]).parse().unwrap()
    }

    /// Files tracked on the local `branch`, sorted.
    pub fn files_on(&self, branch: &str) -> Vec<String> {
        let listing = self.git(&["ls-tree", "-r", "--name-only", branch]);
        let mut files: Vec<_> = listing.lines().map(str::to_string).collect();
        files.sort();
        files
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Change a doc source on `main` and commit it.
    pub fn edit_docs(&self, content: &str) {
        fs::write(self.work.join("docs/index.src"), content).unwrap();
        self.git(&["commit", "--quiet", "--all", "-m", "update docs"]);
    }

    /// Add a commit to `branch` on the remote from a second clone, so the
    /// local branch no longer fast-forwards once it has its own commit.
    pub fn advance_remote(&self, branch: &str) {
        let other = self._dir.path().join("other");
        if !other.exists() {
            let remote_url = self.remote.to_string_lossy().to_string();
            git_in(self._dir.path(), &["clone", "--quiet", &remote_url, "other"]);
            git_in(&other, &["config", "user.name", "Other Dev"]);
            git_in(&other, &["config", "user.email", "other@example.com"]);
            git_in(&other, &["config", "commit.gpgsign", "false"]);
        }
        git_in(&other, &["checkout", "--quiet", branch]);
        git_in(&other, &["pull", "--quiet", "--ff-only", "origin", branch]);
        git_in(&other, &["commit", "--quiet", "--allow-empty", "-m", "upstream change"]);
        git_in(&other, &["push", "--quiet", "origin", branch]);
    }

    /// Make every commit in the working clone fail.
    #[cfg(unix)]
    pub fn reject_commits(&self) {
        install_hook(&self.work.join(".git/hooks/pre-commit"));
    }

    /// Make the remote refuse every push.
    #[cfg(unix)]
    pub fn reject_pushes(&self) {
        install_hook(&self.remote.join("hooks/pre-receive"));
    }
}

/// Write a git hook that always fails.
#[cfg(unix)]
fn install_hook(hook: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::create_dir_all(hook.parent().unwrap()).unwrap();
    fs::write(hook, "#!/bin/sh\necho 'frozen' >&2\nexit 1\n").unwrap();
    fs::set_permissions(hook, fs::Permissions::from_mode(0o755)).unwrap();
}
