//! External command execution utilities.
//!
//! Provides a Builder-based API for running external commands with proper
//! output handling and optional PTY support. A non-zero exit becomes a
//! [`CommandFailed`] error that keeps the exit code, so callers can
//! propagate it as the process exit status.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Simple command
//! Cmd::new("git").args(["status", "--porcelain"]).cwd(root).run()?;
//!
//! // Build tool attached to a pseudo-terminal
//! Cmd::from_slice(&["make", "html"]).cwd(docs_dir).pty(true).run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::OnceLock,
};
use thiserror::Error;

// ============================================================================
// Error
// ============================================================================

/// An external command ran but exited unsuccessfully.
#[derive(Debug, Error)]
#[error("Command `{program}` failed with {status}{}", detail_suffix(.detail))]
pub struct CommandFailed {
    /// Program name as invoked.
    pub program: String,
    /// Human-readable exit status.
    pub status: String,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Filtered stderr (and stdout, when useful).
    pub detail: String,
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!("\n{detail}")
    }
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
///
/// Provides a fluent API for configuring and running external commands.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    use_pty: bool,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["make", "html"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Enable PTY (pseudo-terminal) mode.
    ///
    /// PTY allows commands to behave as if running in a real terminal,
    /// enabling colored output, progress bars, etc.
    pub fn pty(mut self, enable: bool) -> Self {
        self.use_pty = enable;
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Render the command line for logs and dry-run plans.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute the command and return output.
    ///
    /// Fails with [`CommandFailed`] when the process exits unsuccessfully.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        if self.use_pty {
            self.run_with_pty(filter)
        } else {
            self.run_simple(filter)
        }
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Simple execution without PTY.
    fn run_simple(self, filter: &'static FilterRule) -> Result<Output> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(self.envs.iter().cloned());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        log_output(&name, &output, filter)?;
        Ok(output)
    }

    /// Execution with PTY support.
    fn run_with_pty(self, filter: &'static FilterRule) -> Result<Output> {
        let name = self.program_name();

        let mut cmd_builder = CommandBuilder::new(&self.program);
        cmd_builder.args(&self.args);

        for (k, v) in &self.envs {
            cmd_builder.env(k, v);
        }

        if let Some(dir) = &self.cwd {
            cmd_builder.cwd(dir);
        }

        let pty_system = NativePtySystem::default();
        let pair = pty_system.openpty(PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        })?;

        let mut child = pair
            .slave
            .spawn_command(cmd_builder)
            .with_context(|| format!("Failed to spawn `{name}`"))?;
        drop(pair.slave);

        // Read output in separate thread (PTY blocks until EOF)
        let mut reader = pair.master.try_clone_reader()?;
        let output_handle = std::thread::spawn(move || {
            let mut output = String::new();
            let _ = reader.read_to_string(&mut output);
            output
        });

        let status = child.wait()?;
        drop(pair.master);

        let output_str = output_handle
            .join()
            .map_err(|_| anyhow::anyhow!("Failed to join output reader thread"))?;

        #[allow(clippy::cast_possible_wrap)]
        let code = status.exit_code() as i32;

        if !status.success() {
            return Err(CommandFailed {
                program: name,
                status: format!("exit code: {code}"),
                code: Some(code),
                detail: strip_ansi(output_str.trim()).into_owned(),
            }
            .into());
        }

        filter.log(&name, &output_str);

        // Convert to std::process::Output
        #[cfg(unix)]
        let std_status = {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(code << 8)
        };
        #[cfg(windows)]
        let std_status = {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(status.exit_code())
        };

        Ok(Output {
            status: std_status,
            stdout: output_str.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
///
/// Lines are matched after ANSI stripping and trimming, so prefixes must
/// not carry leading whitespace.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
    /// Substrings that skip a line wherever they appear.
    pub skip_contains: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self {
            skip_prefixes,
            skip_contains: &[],
        }
    }

    /// Also skip lines containing any of `patterns`.
    pub const fn skip_containing(self, patterns: &'static [&'static str]) -> Self {
        Self {
            skip_contains: patterns,
            ..self
        }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty()
            || self.skip_prefixes.iter().any(|p| line.starts_with(p))
            || self.skip_contains.iter().any(|p| line.contains(p))
    }

    /// Keep the lines that pass the filter.
    pub(crate) fn keep(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect()
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines = self.keep(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Silent filter (skip all output).
pub const SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());
    re.replace_all(s, "")
}

/// Log command output, returning error on failure.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        return Err(command_failed(name, output).into());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

/// Build the error for a failed command.
///
/// The filter is not applied here: on failure every stderr line may matter.
fn command_failed(name: &str, output: &Output) -> CommandFailed {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut detail = strip_ansi(stderr.trim()).into_owned();

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() && !stdout_trimmed.starts_with("<!DOCTYPE") {
        if !detail.is_empty() {
            detail.push('\n');
        }
        detail.push_str("Stdout:\n");
        detail.push_str(&strip_ansi(stdout_trimmed));
    }

    CommandFailed {
        program: name.to_string(),
        status: output.status.to_string(),
        code: output.status.code(),
        detail,
    }
}

/// Find the exit code of the first failed external command in an error chain.
pub fn failed_exit_code(err: &anyhow::Error) -> Option<i32> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandFailed>())
        .and_then(|failed| failed.code)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("echo")
            .arg("hello")
            .args(["world", "!"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("echo"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["make", "html"]);
        assert_eq!(cmd.program, OsString::from("make"));
        assert_eq!(cmd.display(), "make html");
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["Switched to", "Already on"]);
        assert!(filter.should_skip("Switched to branch 'main'"));
        assert!(filter.should_skip("Already on 'main'"));
        assert!(!filter.should_skip("error: pathspec 'nope' did not match"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_filter_skip_containing() {
        let filter = FilterRule::new(&["To "]).skip_containing(&[" -> "]);
        let kept = filter.keep(
            "To /tmp/remote.git\n   b7749fa..8e384e3  gh-pages -> gh-pages\nremote: kept\n",
        );
        assert_eq!(kept, vec!["remote: kept".to_string()]);
    }

    #[test]
    fn test_filter_keep_strips_ansi() {
        let filter = FilterRule::new(&["hint:"]);
        let kept = filter.keep("\x1b[33mhint:\x1b[0m skip me\n\x1b[31mreal\x1b[0m\n\n");
        assert_eq!(kept, vec!["real".to_string()]);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[2KPlain"), "Plain");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_env_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let output = Cmd::from_slice(&["sh", "-c", "echo $DOCPUB_TEST && pwd"])
            .envs([("DOCPUB_TEST", "value")])
            .cwd(dir.path())
            .run()
            .unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("value"));
    }

    #[test]
    fn test_failed_command_keeps_exit_code() {
        let err = Cmd::from_slice(&["sh", "-c", "echo broken >&2; exit 7"])
            .run()
            .unwrap_err();
        assert_eq!(failed_exit_code(&err), Some(7));

        let failed = err.downcast_ref::<CommandFailed>().unwrap();
        assert_eq!(failed.program, "sh");
        assert!(failed.detail.contains("broken"));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_exit_code_found_through_context() {
        let err = Cmd::from_slice(&["sh", "-c", "exit 4"])
            .run()
            .context("build")
            .unwrap_err();
        assert_eq!(failed_exit_code(&err), Some(4));
    }

    #[test]
    fn test_missing_program_has_no_exit_code() {
        let err = Cmd::new("docpub-definitely-missing-program").run().unwrap_err();
        assert_eq!(failed_exit_code(&err), None);
    }
}
