//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization and validation (`normalize_path`, `is_plain_relative`)

pub mod fs;

pub use fs::{is_plain_name, is_plain_relative, normalize_path};
