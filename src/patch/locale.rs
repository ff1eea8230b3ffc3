// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Locale pruning.
//!
//! Electron ships one `.pak` file per UI locale under `locales/`. Most users
//! only ever need one or two of them. This patch lists every locale, asks
//! which ones to keep, and removes the rest.

use crate::{
    patch::Patch,
    patcher::{PatchScope, Result},
    select::Candidates,
    term::Severity,
};

use glob::{glob, Pattern};
use std::path::PathBuf;
use tracing::debug;

const SUPPORTED: &[&str] = &["VSCodium"];
const MINIMUM: &str = "1.102.35058";

/// Remove unused UI locales.
#[derive(Debug, Default, Clone, Copy)]
pub struct Locale;

impl Patch for Locale {
    fn name(&self) -> &str {
        "locale"
    }

    fn description(&self) -> &str {
        "Remove every UI locale except the selected ones."
    }

    fn check(&self, scope: &mut PatchScope<'_>) -> Result<()> {
        scope.check_product_name(SUPPORTED)?;
        scope.check_version(MINIMUM)
    }

    fn apply(&self, scope: &mut PatchScope<'_>) -> Result<()> {
        let root = scope.installation().root().to_string_lossy().into_owned();
        let pattern = format!("{}/locales/*.pak", Pattern::escape(&root));
        debug!("search locales with {pattern:?}");

        let paks = glob(&pattern)?.collect::<std::result::Result<Vec<PathBuf>, _>>()?;
        if paks.is_empty() {
            scope.report(Severity::Warning, "No locales found. Nothing to do.");
            return Ok(());
        }

        let candidates = paks
            .iter()
            .filter_map(|pak| {
                pak.file_stem()
                    .map(|stem| (stem.to_string_lossy().to_lowercase(), pak.clone()))
            })
            .collect::<Candidates<_>>();
        let preserved = scope.select_from(&candidates, "Locales to preserve")?;

        for pak in paks.iter().filter(|pak| !preserved.contains(pak)) {
            scope.remove_file_on(pak, None)?;
        }

        Ok(())
    }
}
