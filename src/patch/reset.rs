// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Profile reset.
//!
//! Removes the per-user data left behind by earlier runs: installed
//! extensions under `~/.vscode-oss`, and settings, caches, and state under
//! the configuration directory. The removal targets Windows alone. On other
//! hosts it only ends up in the replay script, which names the directories
//! through `%USERPROFILE%` and `%APPDATA%` so it wipes the profile of
//! whoever runs it.

use crate::{
    patch::Patch,
    path::{config_dir, home_dir, PathError},
    patcher::{PatchScope, Result},
    platform::Platform,
};

use std::path::PathBuf;

const SUPPORTED: &[&str] = &["VSCodium"];
const MINIMUM: &str = "1.102.35058";

/// Wipe per-user profile data.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reset;

impl Reset {
    /// Profile directories removed by this patch.
    ///
    /// Each entry pairs the directory on this host with the path the replay
    /// script removes instead.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::NoWayHome`] if user directories are unknown.
    pub fn profile_dirs() -> std::result::Result<Vec<(PathBuf, &'static str)>, PathError> {
        Ok(vec![
            (home_dir()?.join(".vscode-oss"), r"%USERPROFILE%\.vscode-oss"),
            (config_dir()?.join("VSCodium"), r"%APPDATA%\VSCodium"),
        ])
    }
}

impl Patch for Reset {
    fn name(&self) -> &str {
        "reset"
    }

    fn description(&self) -> &str {
        "Remove per-user extensions, settings, and caches."
    }

    fn check(&self, scope: &mut PatchScope<'_>) -> Result<()> {
        scope.check_product_name(SUPPORTED)?;
        scope.check_version(MINIMUM)
    }

    fn apply(&self, scope: &mut PatchScope<'_>) -> Result<()> {
        for (dir, scripted) in Self::profile_dirs()? {
            scope.remove_dir_as(dir, scripted, Some(Platform::Windows))?;
        }

        Ok(())
    }
}
