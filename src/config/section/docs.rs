//! `[docs]` section configuration.
//!
//! Describes how the documentation is built and where the output lands.
//! Commands run with `dir` as working directory and support `$DOCPUB_*`
//! variable substitution.
//!
//! # Example
//!
//! ```toml
//! [docs]
//! dir = "docs"                  # Doc sources, relative to project root
//! output = "build/html"         # Generated site, relative to `dir`
//! clean = ["make", "clean"]     # Run before building ([] to skip)
//! build = ["make", "html"]      # Build command
//! pty = false                   # Run commands in a pseudo-terminal
//! quiet = true                  # Hide build tool stdout
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::is_plain_relative;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Documentation build settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Documentation source directory, relative to the project root.
    pub dir: PathBuf,

    /// Generated site directory, relative to `dir`.
    pub output: PathBuf,

    /// Clean command (empty to skip).
    pub clean: Vec<String>,

    /// Build command and arguments.
    pub build: Vec<String>,

    /// Attach commands to a pseudo-terminal (colors, progress bars).
    pub pty: bool,

    /// Suppress build tool stdout (default: true).
    pub quiet: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            output: PathBuf::from("build/html"),
            clean: vec!["make".to_string(), "clean".to_string()],
            build: vec!["make".to_string(), "html".to_string()],
            pty: false,
            quiet: true,
        }
    }
}

impl DocsConfig {
    pub const DIR: FieldPath = FieldPath::new("docs.dir");
    pub const OUTPUT: FieldPath = FieldPath::new("docs.output");
    pub const CLEAN: FieldPath = FieldPath::new("docs.clean");
    pub const BUILD: FieldPath = FieldPath::new("docs.build");

    /// Top-level entry of the project that holds the doc sources.
    ///
    /// This entry survives the working-tree wipe on the publishing branch
    /// (the build output lives inside it) and is removed at the end.
    pub fn preserved_entry(&self) -> Option<&Path> {
        self.dir.components().find_map(|c| match c {
            Component::Normal(name) => Some(Path::new(name)),
            _ => None,
        })
    }

    /// Validate docs configuration.
    ///
    /// # Checks
    /// - `dir` and `output` are relative and stay inside their base.
    /// - `dir` is not inside `.git`.
    /// - `build` names a program; `clean`, when set, names a program.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !is_plain_relative(&self.dir) {
            diag.error_with_hint(
                Self::DIR,
                format!("{} must be a relative path inside the project: `{}`", Self::DIR, self.dir.display()),
                "the directory is preserved while the publishing branch is rebuilt, so it must live in the work tree",
            );
        } else if self.preserved_entry() == Some(Path::new(".git")) {
            diag.error(
                Self::DIR,
                format!("{} must not live inside `.git`: `{}`", Self::DIR, self.dir.display()),
            );
        }

        if !is_plain_relative(&self.output) {
            diag.error(
                Self::OUTPUT,
                format!("{} must be a relative path inside {}: `{}`", Self::OUTPUT, Self::DIR, self.output.display()),
            );
        }

        if self.build.first().is_none_or(|program| program.trim().is_empty()) {
            diag.error_with_hint(
                Self::BUILD,
                format!("{} must name a program", Self::BUILD),
                "for Sphinx projects: build = [\"make\", \"html\"]",
            );
        }

        if self.clean.first().is_some_and(|program| program.trim().is_empty()) {
            diag.error(Self::CLEAN, format!("{} must name a program or be empty", Self::CLEAN));
        }
    }
}
