//! docpub - build project documentation and publish it to a hosting branch.

mod cli;
mod config;
mod core;
mod logger;
mod publish;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{ConfigError, PublishConfig};
use logger::status_error;
use publish::PublishError;
use std::process::ExitCode;
use utils::exec::failed_exit_code;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(u8::try_from(exit_code(&err)).unwrap_or(1))
        }
    }
}

fn run() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PublishConfig::load(&cli)?;

    match cli.subcommand() {
        Commands::Publish { args } => cli::publish::publish_docs(&config, args.dry_run)?,
        Commands::Check => cli::check::check_setup(&config)?,
    }
    Ok(())
}

/// Print the error summary with its cause chain as detail.
fn report(err: &anyhow::Error) {
    let detail = err
        .chain()
        .skip(1)
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    status_error(&err.to_string(), &detail);
}

/// Process exit status for a failed run.
///
/// Configuration problems exit with 2, interrupts with 130, and a failed
/// external command passes its own exit code through.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(publish) = err.downcast_ref::<PublishError>() {
        return publish.exit_code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    failed_exit_code(err).filter(|code| *code != 0).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Step;

    #[test]
    fn test_exit_code_for_config_error() {
        let err = anyhow::Error::from(ConfigError::Validation("bad".into()));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_for_publish_error() {
        let err = anyhow::Error::from(PublishError::Interrupted(Step::Push {
            remote: "origin".into(),
            branch: "gh-pages".into(),
        }));
        assert_eq!(exit_code(&err), 130);
    }

    #[test]
    fn test_exit_code_defaults_to_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("2 problems found")), 1);
    }
}
