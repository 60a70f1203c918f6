//! `[publish]` section configuration.
//!
//! Controls what the publishing branch ends up containing and how the
//! result is committed.
//!
//! # Example
//!
//! ```toml
//! [publish]
//! marker = ".nojekyll"                   # Zero-byte file disabling Jekyll on GitHub Pages
//! message = "publishing updated docs..."  # Commit message
//! keep = ["CNAME"]                       # Extra top-level entries to keep
//! push = true                            # Push after committing
//! force = false                          # Allow uncommitted changes to tracked files
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::is_plain_name;
use serde::{Deserialize, Serialize};

/// Publishing branch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSectionConfig {
    /// Marker file created at the root of the publishing branch.
    pub marker: String,

    /// Commit message for the publishing commit.
    pub message: String,

    /// Top-level entries of the publishing branch that survive the wipe.
    pub keep: Vec<String>,

    /// Push the publishing branch after committing.
    pub push: bool,

    /// Run even when tracked files have uncommitted changes.
    pub force: bool,
}

impl Default for PublishSectionConfig {
    fn default() -> Self {
        Self {
            marker: ".nojekyll".to_string(),
            message: "publishing updated docs...".to_string(),
            keep: Vec::new(),
            push: true,
            force: false,
        }
    }
}

impl PublishSectionConfig {
    pub const MARKER: FieldPath = FieldPath::new("publish.marker");
    pub const MESSAGE: FieldPath = FieldPath::new("publish.message");
    pub const KEEP: FieldPath = FieldPath::new("publish.keep");

    /// Validate publish configuration.
    ///
    /// `preserved` is the top-level docs entry, which is always removed at
    /// the end of the swap and therefore pointless in `keep`.
    pub fn validate(&self, preserved: Option<&str>, diag: &mut ConfigDiagnostics) {
        if !is_plain_name(&self.marker) || self.marker == ".git" {
            diag.error(
                Self::MARKER,
                format!("{} must be a plain file name: `{}`", Self::MARKER, self.marker),
            );
        }

        if self.message.trim().is_empty() {
            diag.error(Self::MESSAGE, format!("{} must not be empty", Self::MESSAGE));
        }

        for entry in &self.keep {
            if !is_plain_name(entry) || entry == ".git" {
                diag.error_with_hint(
                    Self::KEEP,
                    format!("invalid entry in {}: `{entry}`", Self::KEEP),
                    "entries are top-level names such as `CNAME`; `.git` is always kept",
                );
            } else if Some(entry.as_str()) == preserved {
                diag.warn(Self::KEEP, format!("`{entry}` holds the doc sources and is removed after the build output is moved"));
            }
        }
    }
}
