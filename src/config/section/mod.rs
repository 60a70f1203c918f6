//! Configuration section definitions.
//!
//! Each module corresponds to a section in `docpub.toml`:
//!
//! | Module    | TOML Section  | Purpose                                |
//! |-----------|---------------|----------------------------------------|
//! | `repo`    | `[repo]`      | Remote, source and publishing branch   |
//! | `docs`    | `[docs]`      | Doc sources, build commands, output    |
//! | `publish` | `[publish]`   | Marker file, commit, push              |

mod docs;
mod publish;
mod repo;

pub use docs::DocsConfig;
pub use publish::PublishSectionConfig;
pub use repo::RepoConfig;
