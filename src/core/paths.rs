//! Default file locations for configuration and the activity log.

use std::env;
use std::path::{Path, PathBuf};

/// Application directory name used under the XDG base directories.
const APP_DIR: &str = "llv";

/// Resolve the user's home directory, falling back to the system temp dir.
fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(env::temp_dir, PathBuf::from)
}

/// Pick `$<xdg_var>` when it is set to an absolute path, else `$HOME/<fallback>`.
fn xdg_base(xdg_var: &str, fallback: &[&str]) -> PathBuf {
    env::var_os(xdg_var)
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| {
            let mut path = home_dir();
            path.extend(fallback);
            path
        })
}

/// `$XDG_CONFIG_HOME/llv/config.toml` or `~/.config/llv/config.toml`.
#[must_use]
pub fn default_config_file() -> PathBuf {
    xdg_base("XDG_CONFIG_HOME", &[".config"])
        .join(APP_DIR)
        .join("config.toml")
}

/// `$XDG_STATE_HOME/llv/activity.jsonl` or `~/.local/state/llv/activity.jsonl`.
#[must_use]
pub fn default_activity_log() -> PathBuf {
    xdg_base("XDG_STATE_HOME", &[".local", "state"])
        .join(APP_DIR)
        .join("activity.jsonl")
}

/// Fallback activity log location in the system temp directory.
#[must_use]
pub fn fallback_activity_log() -> PathBuf {
    env::temp_dir().join(format!("{APP_DIR}-activity.jsonl"))
}

/// Path of the `n`-th rotated sibling of `base` (`activity.jsonl.1`, …).
#[must_use]
pub fn rotated_name(base: &Path, n: u32) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}
