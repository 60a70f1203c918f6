//! `docpub publish`: run the workflow or print its plan.

use crate::{
    config::PublishConfig,
    logger::status_success,
    publish::{Outcome, PublishError, Report, Workflow},
    utils::plural_count,
};
use owo_colors::OwoColorize;

/// Run the publish workflow for `config`.
pub fn publish_docs(config: &PublishConfig, dry_run: bool) -> Result<(), PublishError> {
    let workflow = Workflow::new(config);

    if dry_run {
        print_plan(&workflow);
        return Ok(());
    }

    let report = workflow.run()?;
    status_success(&summary(&report, config));
    Ok(())
}

/// Print the numbered steps of a run without executing them.
fn print_plan(workflow: &Workflow<'_>) {
    for (i, (step, command)) in workflow.plan().iter().enumerate() {
        println!(
            "{:>2}. {:<24} {}",
            i + 1,
            step.to_string().bold(),
            command.dimmed()
        );
    }
}

/// One-line description of what a successful run did.
fn summary(report: &Report, config: &PublishConfig) -> String {
    let branch = &config.repo.publish;
    let pushed = if report.pushed {
        format!(", pushed to {}", config.repo.remote)
    } else {
        String::new()
    };

    match &report.outcome {
        Outcome::Published { commit, changes } => format!(
            "published {commit} to {branch} ({}){pushed}",
            plural_count(*changes, "changed path")
        ),
        Outcome::Unchanged => format!("{branch} already up to date{pushed}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_published() {
        let config = PublishConfig::default();
        let report = Report {
            outcome: Outcome::Published {
                commit: "abc1234".into(),
                changes: 3,
            },
            pushed: true,
        };
        assert_eq!(
            summary(&report, &config),
            "published abc1234 to gh-pages (3 changed paths), pushed to origin"
        );
    }

    #[test]
    fn test_summary_unchanged_without_push() {
        let config = PublishConfig::default();
        let report = Report {
            outcome: Outcome::Unchanged,
            pushed: false,
        };
        assert_eq!(summary(&report, &config), "gh-pages already up to date");
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let fixture = crate::utils::git::fixture::Fixture::new();
        let mut config = PublishConfig::default();
        config.set_root(&fixture.work);
        let before = fixture.local_id("gh-pages");

        publish_docs(&config, true).unwrap();

        assert_eq!(fixture.local_id("gh-pages"), before);
        assert_eq!(fixture.current_branch(), "main");
    }
}
