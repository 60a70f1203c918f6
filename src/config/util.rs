//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// An absolute `config_name` is only checked for existence.
///
/// # Example
/// ```text
/// /home/user/project/docs/source/  ← start
/// /home/user/project/docpub.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs/source");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("docpub.toml"), "").unwrap();

        let found = find_config_file(Path::new("docpub.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("docpub.toml"));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("docpub.toml"), "").unwrap();
        fs::write(nested.join("docpub.toml"), "").unwrap();

        let found = find_config_file(Path::new("docpub.toml"), &nested).unwrap();
        assert_eq!(found, nested.join("docpub.toml"));
    }

    #[test]
    fn test_find_config_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(find_config_file(&path, dir.path()).is_none());

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }

    #[test]
    fn test_directory_is_not_a_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docpub.toml")).unwrap();
        let name = Path::new("docpub.toml");
        // Parents of the temp dir are unlikely to hold a docpub.toml
        assert_ne!(
            find_config_file(name, dir.path()),
            Some(dir.path().join("docpub.toml"))
        );
    }
}
