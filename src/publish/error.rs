//! Publish workflow errors.

use crate::{core::Step, utils::exec::failed_exit_code};
use thiserror::Error;

/// Why a publish run stopped.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A step failed; `source` carries the command or I/O error.
    #[error("{step} failed")]
    Step {
        step: Step,
        #[source]
        source: anyhow::Error,
    },

    /// Ctrl+C was received before `step` could start.
    #[error("interrupted before {0}")]
    Interrupted(Step),

    /// Tracked files have uncommitted changes and `force` is off.
    #[error("tracked files have uncommitted changes (use --force to publish anyway):\n{}", .0.join("\n"))]
    Dirty(Vec<String>),
}

impl PublishError {
    /// The step the run stopped at.
    pub fn step(&self) -> Step {
        match self {
            Self::Step { step, .. } | Self::Interrupted(step) => step.clone(),
            Self::Dirty(_) => Step::Preflight,
        }
    }

    /// Process exit code for this failure.
    ///
    /// The exit code of the failing external command when there is one,
    /// 130 for an interrupt, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Step { source, .. } => failed_exit_code(source)
                .filter(|code| *code != 0)
                .unwrap_or(1),
            Self::Interrupted(_) => 130,
            Self::Dirty(_) => 1,
        }
    }
}
