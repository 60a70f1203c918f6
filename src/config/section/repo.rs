//! `[repo]` section configuration.
//!
//! Names the remote and the two branches the workflow moves between.
//!
//! # Example
//!
//! ```toml
//! [repo]
//! remote = "origin"       # Remote to pull from and push to
//! source = "main"         # Branch holding project and doc sources
//! publish = "gh-pages"    # Branch serving the generated site
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Remote and branch names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Remote name (e.g., "origin").
    pub remote: String,

    /// Source branch (e.g., "main", "master").
    pub source: String,

    /// Publishing branch (e.g., "gh-pages").
    pub publish: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            source: "main".to_string(),
            publish: "gh-pages".to_string(),
        }
    }
}

impl RepoConfig {
    pub const REMOTE: FieldPath = FieldPath::new("repo.remote");
    pub const SOURCE: FieldPath = FieldPath::new("repo.source");
    pub const PUBLISH: FieldPath = FieldPath::new("repo.publish");

    /// Validate repo configuration.
    ///
    /// # Checks
    /// - All names are non-empty and contain no whitespace.
    /// - Source and publishing branches differ.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value) in [
            (Self::REMOTE, &self.remote),
            (Self::SOURCE, &self.source),
            (Self::PUBLISH, &self.publish),
        ] {
            if value.trim().is_empty() {
                diag.error(field, format!("{field} must not be empty"));
            } else if value.chars().any(char::is_whitespace) {
                diag.error(field, format!("{field} must not contain whitespace: `{value}`"));
            }
        }

        if !self.source.is_empty() && self.source == self.publish {
            diag.error_with_hint(
                Self::PUBLISH,
                format!("publishing branch is the same as the source branch (`{}`)", self.source),
                "the publishing branch is wiped on every run, use a dedicated branch such as `gh-pages`",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_repo_config() {
        let config = test_parse_config(
            "[repo]\nremote = \"upstream\"\nsource = \"master\"\npublish = \"pages\"",
        );
        assert_eq!(config.repo.remote, "upstream");
        assert_eq!(config.repo.source, "master");
        assert_eq!(config.repo.publish, "pages");
    }

    #[test]
    fn test_repo_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.repo.remote, "origin");
        assert_eq!(config.repo.source, "main");
        assert_eq!(config.repo.publish, "gh-pages");
    }

    #[test]
    fn test_repo_validate_same_branch() {
        let repo = RepoConfig {
            publish: "main".to_string(),
            ..RepoConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        repo.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, RepoConfig::PUBLISH);
    }

    #[test]
    fn test_repo_validate_empty_and_whitespace() {
        let repo = RepoConfig {
            remote: String::new(),
            source: "my branch".to_string(),
            ..RepoConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        repo.validate(&mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![RepoConfig::REMOTE, RepoConfig::SOURCE]);
    }

    #[test]
    fn test_repo_validate_defaults_ok() {
        let mut diag = ConfigDiagnostics::new();
        RepoConfig::default().validate(&mut diag);
        assert!(!diag.has_errors());
    }
}
