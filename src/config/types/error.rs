//! Errors raised while loading `docpub.toml`.
//!
//! Parse and I/O failures abort at once. Validation instead collects every
//! [`Problem`] in a [`ConfigDiagnostics`] so one run shows all of them.

use super::FieldPath;
use crate::utils::plural_count;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file is not valid TOML")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),

    // Rendered in full by Display; a source would print the list twice.
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One invalid or suspicious config value.
#[derive(Debug, Clone)]
pub struct Problem {
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", "✗".red(), self.field.as_str().bold(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n    {}", format!("hint: {hint}").dimmed())?;
        }
        Ok(())
    }
}

/// Validation results for the whole config.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<Problem>,
    warnings: Vec<Problem>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.errors.push(Problem {
            field,
            message: message.into(),
            hint: None,
        });
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.errors.push(Problem {
            field,
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    /// Record a value that works but probably is not what the user meant.
    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.warnings.push(Problem {
            field,
            message: message.into(),
            hint: None,
        });
    }

    /// One `[config]` line per warning.
    pub fn print_warnings(&self) {
        for warning in &self.warnings {
            crate::log!("config"; "{}: {}", warning.field.as_str().yellow(), warning.message);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Problem] {
        &self.errors
    }

    #[cfg(test)]
    pub fn warnings(&self) -> &[Problem] {
        &self.warnings
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

/// ```text
/// invalid configuration (2 problems)
///   ✗ docs.dir: must be a relative path inside the project: `/abs`
///     hint: ...
///   ✗ docs.build: must name a program
/// ```
impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid configuration ({})",
            plural_count(self.errors.len(), "problem")
        )?;
        for problem in &self.errors {
            write!(f, "\n  {problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}
