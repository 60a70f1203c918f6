//! Publish workflow: build the docs on the source branch and commit the
//! result to the publishing branch.
//!
//! # Steps
//!
//! ```text
//! preflight         tools present, tracked files clean
//! checkout gh-pages ┐ bring both branches
//! pull origin/...   │ up to date
//! checkout main     │
//! pull origin/...   ┘
//! build             clean + build in docs dir
//! checkout gh-pages ← guard: return to main on any failure
//! swap              wipe tree, marker, move output to root
//! stage / commit    skipped when nothing changed
//! push              unless disabled
//! restore main
//! ```
//!
//! Every step after preflight runs under a [`BranchGuard`], so the work
//! tree ends on the source branch whether the run succeeds, fails or is
//! interrupted between steps.

mod docs;
mod error;
mod guard;
mod tree;

pub use docs::locate_program;
pub use error::PublishError;

use docs::build_docs;
use guard::BranchGuard;
use tree::Swap;

use crate::{
    config::PublishConfig,
    core::{Step, is_shutdown},
    debug, log,
    utils::{
        exec::Cmd,
        git::{Git, branch_presence, current_branch, find_repo_root, open_repo},
        path::normalize_path,
    },
};
use anyhow::{Context, Result, anyhow, bail};
use std::path::{Component, Path, PathBuf};

/// What a successful run did to the publishing branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new commit was created.
    Published {
        /// Abbreviated id of the new commit.
        commit: String,
        /// Number of changed paths in the commit.
        changes: usize,
    },
    /// The generated site matched the branch; nothing was committed.
    Unchanged,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub outcome: Outcome,
    /// Whether the publishing branch was pushed.
    pub pushed: bool,
}

/// One configured publish run.
pub struct Workflow<'a> {
    config: &'a PublishConfig,
    git: Git,
}

impl<'a> Workflow<'a> {
    /// Git commands and the swap act on the work-tree root, which may sit
    /// above the config file's directory.
    pub fn new(config: &'a PublishConfig) -> Self {
        let root = config.get_root();
        let work_tree =
            find_repo_root(root).map_or_else(|_| root.to_path_buf(), |path| normalize_path(&path));
        Self {
            config,
            git: Git::new(work_tree),
        }
    }

    /// Top-level work-tree entry holding the docs directory.
    ///
    /// With `docs.dir = "docs"` and the config in `pkg/`, this is `pkg`.
    fn preserved_entry(&self) -> Result<PathBuf> {
        let docs_dir = self.config.docs_dir();
        let work_tree = self.git.root();
        let relative = docs_dir.strip_prefix(work_tree).with_context(|| {
            format!(
                "docs directory `{}` is outside the work tree `{}`",
                docs_dir.display(),
                work_tree.display()
            )
        })?;
        let entry = relative
            .components()
            .find_map(|c| match c {
                Component::Normal(name) => Some(PathBuf::from(name)),
                _ => None,
            })
            .ok_or_else(|| anyhow!("`docs.dir` names no directory below the work tree"))?;
        if entry == Path::new(".git") {
            bail!("`docs.dir` must not live inside `.git`");
        }
        Ok(entry)
    }

    /// Steps a run would perform, each with the command it stands for.
    pub fn plan(&self) -> Vec<(Step, String)> {
        let repo = &self.config.repo;
        let docs = &self.config.docs;
        let publish = &self.config.publish;
        let mut plan = Vec::new();

        let preflight = if publish.force {
            "check tools".to_string()
        } else {
            "check tools, git status --porcelain --untracked-files=no".to_string()
        };
        plan.push((Step::Preflight, preflight));

        for branch in [&repo.publish, &repo.source] {
            plan.push((Step::Checkout(branch.clone()), format!("git checkout {branch}")));
            plan.push((
                Step::Pull {
                    remote: repo.remote.clone(),
                    branch: branch.clone(),
                },
                format!("git pull --ff-only {} {branch}", repo.remote),
            ));
        }

        let mut build = Vec::new();
        if !docs.clean.is_empty() {
            build.push(Cmd::from_slice(&docs.clean).display());
        }
        build.push(Cmd::from_slice(&docs.build).display());
        plan.push((
            Step::Build,
            format!("{} (in {})", build.join(" && "), docs.dir.display()),
        ));

        plan.push((
            Step::Checkout(repo.publish.clone()),
            format!("git checkout {}", repo.publish),
        ));

        let mut kept = vec![".git".to_string()];
        if let Ok(entry) = self.preserved_entry() {
            kept.push(entry.display().to_string());
        }
        kept.extend(publish.keep.iter().cloned());
        plan.push((
            Step::Swap,
            format!(
                "remove all but {}, touch {}, move {} to root",
                kept.join(", "),
                publish.marker,
                docs.dir.join(&docs.output).display()
            ),
        ));

        plan.push((Step::Stage, "git add --all".to_string()));
        plan.push((Step::Commit, format!("git commit -m {:?}", publish.message)));
        if publish.push {
            plan.push((
                Step::Push {
                    remote: repo.remote.clone(),
                    branch: repo.publish.clone(),
                },
                format!("git push {} {}", repo.remote, repo.publish),
            ));
        }
        plan.push((
            Step::Restore(repo.source.clone()),
            format!("git checkout {}", repo.source),
        ));

        plan
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self) -> Result<Report, PublishError> {
        let repo = &self.config.repo;
        let publish = &self.config.publish;

        self.preflight()?;

        let mut guard = BranchGuard::new(&self.git, repo.source.as_str());

        for branch in [&repo.publish, &repo.source] {
            self.step(Step::Checkout(branch.clone()), || self.git.checkout(branch))?;
            self.step(
                Step::Pull {
                    remote: repo.remote.clone(),
                    branch: branch.clone(),
                },
                || self.git.pull(&repo.remote, branch),
            )?;
        }

        let output = self.step(Step::Build, || build_docs(self.config))?;

        self.step(Step::Checkout(repo.publish.clone()), || {
            self.git.checkout(&repo.publish)
        })?;

        guard.mark_dirty();
        let swap = self.step(Step::Swap, || {
            let preserved = self.preserved_entry()?;
            Swap {
                root: self.git.root(),
                preserved: &preserved,
                output: &output,
                marker: &publish.marker,
                keep: &publish.keep,
            }
            .run()
        })?;
        debug!("swap"; "removed {} entries, moved {}", swap.removed, swap.moved);

        let changes = self.step(Step::Stage, || {
            self.git.add_all()?;
            self.git.status(true)
        })?;

        let outcome = if changes.is_empty() {
            log!("publish"; "site unchanged, nothing to commit");
            Outcome::Unchanged
        } else {
            let commit = self.step(Step::Commit, || {
                self.git.commit(&publish.message)?;
                self.git.head_short_id()
            })?;
            Outcome::Published {
                commit,
                changes: changes.len(),
            }
        };
        guard.mark_clean();

        if publish.push {
            self.step(
                Step::Push {
                    remote: repo.remote.clone(),
                    branch: repo.publish.clone(),
                },
                || self.git.push(&repo.remote, &repo.publish),
            )?;
        }

        self.step(Step::Restore(repo.source.clone()), || guard.release())?;

        Ok(Report {
            outcome,
            pushed: publish.push,
        })
    }

    /// Check tools, the publishing branch and the tracked files.
    fn preflight(&self) -> Result<(), PublishError> {
        let dirty = self.step(Step::Preflight, || {
            let repo = open_repo(self.git.root())?;
            which::which("git").context("`git` not found on PATH")?;

            let program = self
                .config
                .docs
                .build
                .first()
                .context("`docs.build` is empty")?;
            locate_program(program, &self.config.docs_dir())?;
            let preserved = self.preserved_entry()?;
            debug!("publish"; "work tree {}, keeping {}", self.git.root().display(), preserved.display());

            let names = &self.config.repo;
            if !branch_presence(&repo, &names.remote, &names.publish).available() {
                bail!(
                    "branch `{}` exists neither locally nor on `{}`",
                    names.publish,
                    names.remote
                );
            }

            match current_branch(&repo)? {
                Some(branch) => debug!("publish"; "starting on {branch}"),
                None => debug!("publish"; "starting on a detached HEAD"),
            }

            if self.config.publish.force {
                Ok(Vec::new())
            } else {
                self.git.status(false)
            }
        })?;

        if dirty.is_empty() {
            Ok(())
        } else {
            Err(PublishError::Dirty(dirty))
        }
    }

    /// Run one step, unless Ctrl+C came in first.
    fn step<T>(&self, step: Step, f: impl FnOnce() -> Result<T>) -> Result<T, PublishError> {
        if is_shutdown() {
            return Err(PublishError::Interrupted(step));
        }
        log!("publish"; "{step}");
        f().map_err(|source| PublishError::Step { step, source })
    }
}
