//! Process environment access.
//!
//! Values come from the process environment, optionally seeded from a
//! dotenv-style `KEY=VALUE` file. Variables already present are never
//! overridden.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CoreError, Result};

/// Default dotenv file name, resolved against the current directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Load variables from a dotenv file into the process environment.
///
/// Defaults to `.env` in the current directory. Returns `true` when the file
/// was found, `false` when it is absent or cannot be opened. Malformed lines
/// are skipped with a warning; the lines around them still load.
pub fn load(path: Option<&Path>) -> bool {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_env_path(),
    };

    let entries = match dotenvy::from_path_iter(&path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "no environment file");
            return false;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open environment file");
            return false;
        }
    };

    for entry in entries {
        match entry {
            Ok((key, value)) => {
                if std::env::var_os(&key).is_none() {
                    std::env::set_var(key, value);
                }
            }
            Err(e @ dotenvy::Error::LineParse(..)) => {
                warn!(path = %path.display(), error = %e, "skipping malformed line");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "stopped reading environment file");
                break;
            }
        }
    }

    debug!(path = %path.display(), "loaded environment file");
    true
}

fn default_env_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_default()
        .join(DEFAULT_ENV_FILE)
}

/// Look up an environment variable.
#[must_use]
pub fn get(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Look up an environment variable, falling back to `default`.
#[must_use]
pub fn get_or(key: &str, default: impl Into<String>) -> String {
    get(key).unwrap_or_else(|| default.into())
}

/// Look up an environment variable that must be set.
pub fn require(key: &str) -> Result<String> {
    get(key).ok_or_else(|| CoreError::missing(key))
}
