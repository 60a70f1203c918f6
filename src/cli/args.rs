//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Build project docs and republish them to a static hosting branch
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: docpub.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "docpub.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands (default: publish)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the docs and publish them to the hosting branch
    #[command(visible_alias = "p")]
    Publish {
        #[command(flatten)]
        args: PublishArgs,
    },

    /// Validate configuration and repository state without changing anything
    #[command(visible_alias = "c")]
    Check,
}

/// Publish command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PublishArgs {
    /// Publish even if tracked files have uncommitted changes
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub force: Option<bool>,

    /// Commit on the hosting branch but do not push it
    #[arg(long)]
    pub no_push: bool,

    /// Print the steps that would run and exit
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Remote to pull from and push to
    #[arg(short, long)]
    pub remote: Option<String>,

    /// Branch holding the project and doc sources
    #[arg(short, long)]
    pub source: Option<String>,

    /// Branch serving the generated site
    #[arg(short, long)]
    pub branch: Option<String>,
}

impl Cli {
    /// The command to run; no subcommand means `publish` with defaults.
    pub fn subcommand(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Publish {
            args: PublishArgs::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_publish() {
        let cli = Cli::try_parse_from(["docpub"]).unwrap();
        assert!(cli.command.is_none());
        match cli.subcommand() {
            Commands::Publish { args } => {
                assert_eq!(args.force, None);
                assert!(!args.dry_run);
                assert!(!args.no_push);
            }
            Commands::Check => panic!("expected publish"),
        }
        assert_eq!(cli.config, PathBuf::from("docpub.toml"));
    }

    #[test]
    fn test_publish_overrides() {
        let cli = Cli::try_parse_from([
            "docpub", "p", "-f", "--no-push", "-r", "upstream", "-s", "develop", "-b", "pages",
        ])
        .unwrap();
        let Commands::Publish { args } = cli.subcommand() else {
            panic!("expected publish");
        };
        assert_eq!(args.force, Some(true));
        assert!(args.no_push);
        assert_eq!(args.remote.as_deref(), Some("upstream"));
        assert_eq!(args.source.as_deref(), Some("develop"));
        assert_eq!(args.branch.as_deref(), Some("pages"));
    }

    #[test]
    fn test_force_explicit_false() {
        let cli = Cli::try_parse_from(["docpub", "publish", "--force", "false"]).unwrap();
        let Commands::Publish { args } = cli.subcommand() else {
            panic!("expected publish");
        };
        assert_eq!(args.force, Some(false));
    }

    #[test]
    fn test_check_with_global_flags() {
        let cli = Cli::try_parse_from(["docpub", "check", "-C", "site/docpub.toml", "-v"]).unwrap();
        assert!(matches!(cli.subcommand(), Commands::Check));
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site/docpub.toml"));
    }
}
