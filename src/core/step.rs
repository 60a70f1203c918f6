//! Named steps of the publish workflow.

use std::fmt;

/// One step of the publish workflow, in execution order.
///
/// Steps carry the branch or remote they act on so diagnostics read as
/// `pull origin/main failed` rather than a bare step number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Uncommitted-change and tool checks before anything moves.
    Preflight,
    Checkout(String),
    Pull { remote: String, branch: String },
    /// Clean and build commands of the documentation tool.
    Build,
    /// Wipe the publishing tree, write the marker, move output into place.
    Swap,
    Stage,
    Commit,
    Push { remote: String, branch: String },
    /// Final checkout of the source branch.
    Restore(String),
}

impl Step {
    /// Short lowercase label used as log prefix.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Checkout(_) => "checkout",
            Self::Pull { .. } => "pull",
            Self::Build => "build",
            Self::Swap => "swap",
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::Push { .. } => "push",
            Self::Restore(_) => "restore",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout(branch) => write!(f, "checkout {branch}"),
            Self::Pull { remote, branch } => write!(f, "pull {remote}/{branch}"),
            Self::Push { remote, branch } => write!(f, "push {remote}/{branch}"),
            Self::Restore(branch) => write!(f, "restore {branch}"),
            other => f.write_str(other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Build.to_string(), "build");
        assert_eq!(Step::Checkout("gh-pages".into()).to_string(), "checkout gh-pages");
        assert_eq!(
            Step::Pull {
                remote: "origin".into(),
                branch: "main".into()
            }
            .to_string(),
            "pull origin/main"
        );
        assert_eq!(Step::Restore("main".into()).to_string(), "restore main");
    }

    #[test]
    fn test_step_label() {
        let push = Step::Push {
            remote: "origin".into(),
            branch: "gh-pages".into(),
        };
        assert_eq!(push.label(), "push");
        assert_eq!(Step::Swap.label(), "swap");
    }
}
