//! Documentation build step.
//!
//! Runs the configured clean and build commands inside the docs directory,
//! with `$DOCPUB_*` variables exported and substituted into arguments.

use crate::{
    config::PublishConfig,
    debug, log,
    utils::exec::{Cmd, SILENT_FILTER},
};
use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$DOCPUB_*` environment variables for the build commands.
pub fn build_vars(config: &PublishConfig) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    vars.insert("DOCPUB_ROOT".into(), config.get_root().display().to_string());
    vars.insert(
        "DOCPUB_DOCS_DIR".into(),
        config.docs_dir().display().to_string(),
    );
    vars.insert(
        "DOCPUB_OUTPUT_DIR".into(),
        config.output_dir().display().to_string(),
    );
    vars.insert("DOCPUB_SOURCE_BRANCH".into(), config.repo.source.clone());
    vars.insert("DOCPUB_PUBLISH_BRANCH".into(), config.repo.publish.clone());

    vars
}

/// Resolve `$DOCPUB_*` variables in command arguments.
///
/// Longer names are substituted first, so `$DOCPUB_DOCS_DIR` is never
/// clobbered by a shorter name sharing its prefix.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${key}");
                result = result.replace(&pattern, &vars[*key]);
            }
            result
        })
        .collect()
}

// ============================================================================
// Program Lookup
// ============================================================================

/// Resolve a command's program to an executable path.
///
/// Names with a path separator are taken relative to `base`; bare names
/// are looked up on `PATH`.
pub fn locate_program(program: &str, base: &Path) -> Result<PathBuf> {
    if program.contains('/') || program.contains('\\') {
        let path = base.join(program);
        if path.is_file() {
            return Ok(path);
        }
        bail!("`{}` not found", path.display());
    }
    which::which(program).with_context(|| format!("`{program}` not found on PATH"))
}

// ============================================================================
// Build
// ============================================================================

/// Clean, then build the documentation.
///
/// Fails when a command fails or when the build leaves the output
/// directory missing or empty. Returns the output directory.
pub fn build_docs(config: &PublishConfig) -> Result<PathBuf> {
    let docs_dir = config.docs_dir();
    if !docs_dir.is_dir() {
        bail!("docs directory `{}` not found", docs_dir.display());
    }

    let vars = build_vars(config);

    if !config.docs.clean.is_empty() {
        run_in_docs(&config.docs.clean, config, &vars).context("clean command failed")?;
    }
    run_in_docs(&config.docs.build, config, &vars)?;

    let output = config.output_dir();
    if !has_entries(&output) {
        bail!(
            "build finished but `{}` is missing or empty; check `docs.output`",
            output.display()
        );
    }
    debug!("build"; "output at {}", output.display());
    Ok(output)
}

/// Run one configured command with the docs directory as cwd.
fn run_in_docs(
    command: &[String],
    config: &PublishConfig,
    vars: &FxHashMap<String, String>,
) -> Result<()> {
    let docs_dir = config.docs_dir();
    let mut resolved = resolve_args(command, vars);
    let Some(program) = resolved.first_mut() else {
        bail!("empty command");
    };
    *program = locate_program(program, &docs_dir)?
        .to_string_lossy()
        .into_owned();

    let cmd = Cmd::from_slice(&resolved)
        .cwd(&docs_dir)
        .envs(vars)
        .pty(config.docs.pty);
    log!("build"; "`{}`", command.join(" "));

    let cmd = if config.docs.quiet {
        cmd.filter(&SILENT_FILTER)
    } else {
        cmd
    };
    let output = cmd.run()?;

    if !config.docs.quiet {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            println!("{stdout}");
        }
    }
    Ok(())
}

/// Whether `dir` is a directory with at least one entry.
fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}
