//! Working-tree swap on the publishing branch.
//!
//! Replaces everything at the work-tree root with the generated site:
//!
//! ```text
//! root/                          root/
//! ├── .git/                      ├── .git/
//! ├── CNAME        (keep)        ├── CNAME
//! ├── old.html                   ├── .nojekyll
//! └── docs/                 →    ├── index.html
//!     ├── conf.py                └── _static/
//!     └── build/html/
//!         ├── index.html
//!         └── _static/
//! ```

use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Temporary home of the output while the preserved entry is removed.
const STAGING_DIR: &str = ".docpub-staging";

/// Inputs of one swap.
#[derive(Debug, Clone)]
pub struct Swap<'a> {
    /// Work-tree root (publishing branch checked out).
    pub root: &'a Path,
    /// Top-level entry holding the doc sources and the build output.
    pub preserved: &'a Path,
    /// Absolute build output directory, inside `preserved`.
    pub output: &'a Path,
    /// Marker file name created at the root.
    pub marker: &'a str,
    /// Extra top-level names that survive the wipe.
    pub keep: &'a [String],
}

/// What a swap changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapReport {
    /// Top-level entries removed before the move.
    pub removed: usize,
    /// Top-level entries moved out of the build output.
    pub moved: usize,
}

impl Swap<'_> {
    /// Run the swap.
    ///
    /// Fails without touching anything when the preserved entry or the
    /// output directory is missing.
    pub fn run(&self) -> Result<SwapReport> {
        let preserved = self.root.join(self.preserved);
        if !preserved.exists() {
            bail!(
                "`{}` is missing on the publishing branch; it must carry the build output over from the source branch",
                self.preserved.display()
            );
        }
        if !self.output.is_dir() {
            bail!("build output `{}` not found", self.output.display());
        }

        let removed = self.clear_root()?;

        // Lift the output out before its parent goes away
        let staging = self.root.join(STAGING_DIR);
        move_entry(self.output, &staging)?;
        remove_entry(&preserved)?;

        write_marker(self.root, self.marker)?;
        let moved = move_children(&staging, self.root)?;
        remove_entry(&staging)?;

        Ok(SwapReport { removed, moved })
    }

    /// Whether a top-level name survives the wipe.
    fn is_kept(&self, name: &str) -> bool {
        name == ".git"
            || Path::new(name) == self.preserved
            || self.keep.iter().any(|k| k == name)
    }

    /// Remove every top-level entry except the kept ones.
    fn clear_root(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in read_entries(self.root)? {
            let name = entry
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.is_kept(&name) {
                continue;
            }
            remove_entry(&entry)?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// List the direct children of `dir`.
fn read_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read `{}`", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read `{}`", dir.display()))?;
    Ok(entries)
}

/// Create the zero-byte marker file (truncating an existing one).
fn write_marker(root: &Path, marker: &str) -> Result<()> {
    let path = root.join(marker);
    fs::write(&path, b"").with_context(|| format!("Failed to create `{}`", path.display()))
}

/// Move every child of `from` into `to`, replacing same-named entries.
fn move_children(from: &Path, to: &Path) -> Result<usize> {
    let entries = read_entries(from)?;
    for entry in &entries {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let target = to.join(name);
        if target.symlink_metadata().is_ok() {
            remove_entry(&target)?;
        }
        move_entry(entry, &target)?;
    }
    Ok(entries.len())
}

/// Move a file or directory, copying when a rename is not possible.
fn move_entry(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    copy_entry(from, to)
        .with_context(|| format!("Failed to move `{}` to `{}`", from.display(), to.display()))?;
    remove_entry(from)
}

fn copy_entry(from: &Path, to: &Path) -> std::io::Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_entry(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

/// Remove a file, symlink or directory tree.
fn remove_entry(path: &Path) -> Result<()> {
    let meta = path
        .symlink_metadata()
        .with_context(|| format!("Failed to inspect `{}`", path.display()))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.with_context(|| format!("Failed to remove `{}`", path.display()))
}
