//! Canonical file names and locations.
//!
//! Import these instead of hardcoding paths.
//!
//! | Location | Purpose |
//! |----------|---------|
//! | `.wordlens/config.yaml` | Project or user config, discovered upward from the cwd |
//! | `<home>/session.json` | Settings, article, bookmark and history |

use std::path::PathBuf;

use anyhow::Result;

/// Directory holding the config file, and the default home under `~`
pub const CONFIG_DIR: &str = ".wordlens";

pub const CONFIG_FILE: &str = "config.yaml";

pub const SESSION_FILE: &str = "session.json";

/// Get the wordlens home directory (~/.wordlens)
pub fn wordlens_home() -> Result<PathBuf> {
    crate::config::wordlens_home()
}

/// Get the session store path (~/.wordlens/session.json)
pub fn session_file() -> Result<PathBuf> {
    Ok(crate::config::config()?.session_path())
}
