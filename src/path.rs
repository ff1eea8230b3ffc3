// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or patched in some way.

use std::path::{Path, PathBuf};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Determine absolute path to user's configuration directory.
///
/// Maps to `%APPDATA%` on Windows and `$XDG_CONFIG_HOME` on Linux. Does not
/// check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if configuration directory cannot be
///   determined.
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir().ok_or(PathError::NoWayHome)
}

/// Perform shell expansion on user supplied path.
///
/// Expands leading tilde and environment variables, e.g., `~/VSCodium` or
/// `$APPS/VSCodium`.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if a referenced variable is unset.
pub fn expand(path: impl AsRef<str>) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(path.as_ref())?.into_owned()))
}

/// Strip installation root from path.
///
/// Returns `None` when the path does not live strictly inside the root. The
/// root itself does not count as inside.
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    path.strip_prefix(root)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Render path for status messages.
///
/// Paths inside the installation root are shown relative to it, everything
/// else is shown as is.
pub fn display_relative(path: &Path, root: &Path) -> String {
    match relative_to(path, root) {
        Some(relative) => relative.display().to_string(),
        None => path.display().to_string(),
    }
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home or configuration directory.
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Failed to perform shell expansion on path.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
