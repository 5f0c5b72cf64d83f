//! Runtime configuration for shoebox.
//!
//! Settings are layered, later sources winning: built-in defaults, then an
//! optional TOML file, then `SHOEBOX_*` environment variables. Command-line
//! flags sit on top of all of this, but that merge belongs to the binary;
//! this crate never looks at argv.
//!
//! When no file is named explicitly, the platform config directory is tried
//! (e.g. `~/.config/shoebox/config.toml` on Linux) and silently skipped if
//! absent. An *explicitly* named file that cannot be read is an error — if
//! you asked for it, you meant it.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunable settings for a sorting run.
///
/// Every field has a "not configured" state so the binary can tell an
/// explicit choice apart from silence when merging in command-line flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Files analyzed per batch; `None` means the pipeline default.
    pub batch_size: Option<usize>,
    /// Concurrent metadata readers; `None` means derive from hardware parallelism.
    pub workers: Option<usize>,
    /// Rename files to their capture timestamp while organizing.
    pub rename: bool,
}

impl Settings {
    /// Loads settings from `path` (or the platform default location) merged
    /// with `SHOEBOX_*` environment variables.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Unreadable`] when an explicitly given `path`
    /// does not exist, and [`ErrorKind::Invalid`] when any layer fails to
    /// deserialize into [`Settings`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        match path {
            Some(explicit) => {
                if !explicit.is_file() {
                    exn::bail!(ErrorKind::Unreadable(explicit.to_path_buf()));
                }
                figment = figment.merge(Toml::file_exact(explicit));
            },
            None => {
                if let Some(default) = Self::default_path() {
                    figment = figment.merge(Toml::file(default));
                }
            },
        }
        let settings: Settings = figment.merge(Env::prefixed("SHOEBOX_")).extract().or_raise(|| ErrorKind::Invalid)?;
        tracing::debug!(?settings, "configuration resolved");
        Ok(settings)
    }

    /// The platform-conventional location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "shoebox").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
