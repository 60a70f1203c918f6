//! `docpub check`: report whether a publish run could start.
//!
//! Read-only: inspects the configuration, the repository refs and the
//! tools, and fails when something would stop the preflight step.

use crate::{
    config::PublishConfig,
    logger::{is_verbose, status_success},
    publish::locate_program,
    utils::{
        git::{BranchPresence, Git, branch_presence, current_branch, open_repo},
        plural_count,
    },
};
use anyhow::{Result, bail};
use owo_colors::OwoColorize;

/// Outcome of one check line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
}

/// Collected check lines.
#[derive(Debug, Default)]
struct Checklist {
    lines: Vec<(Status, String, String)>,
}

impl Checklist {
    fn push(&mut self, status: Status, label: &str, detail: impl Into<String>) {
        self.lines.push((status, label.to_string(), detail.into()));
    }

    fn ok(&mut self, label: &str, detail: impl Into<String>) {
        self.push(Status::Ok, label, detail);
    }

    fn warn(&mut self, label: &str, detail: impl Into<String>) {
        self.push(Status::Warn, label, detail);
    }

    fn fail(&mut self, label: &str, detail: impl Into<String>) {
        self.push(Status::Fail, label, detail);
    }

    fn failures(&self) -> usize {
        self.lines
            .iter()
            .filter(|(status, ..)| *status == Status::Fail)
            .count()
    }

    fn print(&self) {
        for (status, label, detail) in &self.lines {
            let symbol = match status {
                Status::Ok => "✓".green().to_string(),
                Status::Warn => "!".yellow().to_string(),
                Status::Fail => "✗".red().to_string(),
            };
            println!("{symbol} {:<16} {}", label.bold(), detail);
        }
    }
}

/// Run every check and print the list.
pub fn check_setup(config: &PublishConfig) -> Result<()> {
    if is_verbose() {
        println!("{}", toml::to_string_pretty(config)?);
    }

    let list = collect(config);
    list.print();

    let failures = list.failures();
    if failures > 0 {
        bail!("{} found", plural_count(failures, "problem"));
    }
    status_success("ready to publish");
    Ok(())
}

fn collect(config: &PublishConfig) -> Checklist {
    let mut list = Checklist::default();

    match &config.config_path {
        Some(path) => list.ok("config", path.display().to_string()),
        None => list.ok("config", "defaults (no docpub.toml)"),
    }

    tool_checks(config, &mut list);
    repo_checks(config, &mut list);

    let docs_dir = config.docs_dir();
    if docs_dir.is_dir() {
        list.ok("docs.dir", docs_dir.display().to_string());
    } else {
        list.fail("docs.dir", format!("`{}` not found", docs_dir.display()));
    }

    list
}

fn tool_checks(config: &PublishConfig, list: &mut Checklist) {
    match which::which("git") {
        Ok(path) => list.ok("git", path.display().to_string()),
        Err(_) => list.fail("git", "not found on PATH"),
    }

    let docs_dir = config.docs_dir();
    for (label, command) in [("docs.clean", &config.docs.clean), ("docs.build", &config.docs.build)] {
        let Some(program) = command.first() else {
            list.ok(label, "skipped");
            continue;
        };
        match locate_program(program, &docs_dir) {
            Ok(_) => list.ok(label, command.join(" ")),
            Err(e) => list.fail(label, e.to_string()),
        }
    }
}

fn repo_checks(config: &PublishConfig, list: &mut Checklist) {
    let repo = match open_repo(config.get_root()) {
        Ok(repo) => repo,
        Err(e) => {
            list.fail("repository", e.to_string());
            return;
        }
    };
    list.ok("repository", config.get_root().display().to_string());

    let names = &config.repo;
    for branch in [&names.source, &names.publish] {
        let presence = branch_presence(&repo, &names.remote, branch);
        let detail = describe_presence(branch, &names.remote, presence);
        if presence.available() {
            list.ok("branch", detail);
        } else {
            list.fail("branch", detail);
        }
    }

    match current_branch(&repo) {
        Ok(Some(branch)) if branch == names.source => list.ok("HEAD", branch),
        Ok(Some(branch)) => list.warn(
            "HEAD",
            format!("on {branch}; the run ends on {}", names.source),
        ),
        Ok(None) => list.warn("HEAD", format!("detached; the run ends on {}", names.source)),
        Err(e) => list.fail("HEAD", e.to_string()),
    }

    match Git::new(config.get_root()).status(false) {
        Ok(changes) if changes.is_empty() => list.ok("work tree", "clean"),
        Ok(changes) if config.publish.force => list.warn(
            "work tree",
            format!("{} (ignored with force)", plural_count(changes.len(), "changed file")),
        ),
        Ok(changes) => list.fail(
            "work tree",
            format!("{} (commit, stash or use --force)", plural_count(changes.len(), "changed file")),
        ),
        Err(e) => list.fail("work tree", e.to_string()),
    }
}

/// `gh-pages (local, origin)` or `gh-pages missing locally and on origin`.
fn describe_presence(branch: &str, remote: &str, presence: BranchPresence) -> String {
    match (presence.local, presence.remote) {
        (true, true) => format!("{branch} (local, {remote})"),
        (true, false) => format!("{branch} (local only)"),
        (false, true) => format!("{branch} ({remote} only)"),
        (false, false) => format!("{branch} missing locally and on {remote}"),
    }
}
