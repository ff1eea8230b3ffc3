// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Patching run orchestration.
//!
//! A run goes through the following steps:
//!
//! 1. Load installation metadata, and pick the replay script backend. Both
//!    fail fast, before any patch is looked at.
//! 2. Resolve requested patch names through the [`Registry`]. Unknown names
//!    are reported and dropped. Repeated names only count once.
//! 3. Check every resolved patch in request order, queueing the ones the
//!    user did not skip.
//! 4. Apply the queue in the same order, then write the replay script.
//!
//! Nothing is written when the queue ends up empty.

use crate::{
    config::{Installation, MetadataError},
    patch::{Patch, Registry},
    patcher::{PatchError, Patcher, Verdict},
    script::{Script, ScriptError},
    term::{format_line, Severity, Terminal},
};

use std::{collections::HashSet, path::PathBuf};
use tracing::{debug, info, instrument};

/// Settings of a patching run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Installation root directory.
    pub install: PathBuf,

    /// Names of patches to apply, in order.
    pub patches: Vec<String>,

    /// Replay script destination.
    pub output: Option<PathBuf>,

    /// Suppress disk changes.
    pub dry_run: bool,
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Patches applied, in order.
    pub applied: Vec<String>,

    /// Patches the user chose to skip.
    pub skipped: Vec<String>,

    /// Requested names with no matching patch.
    pub missing: Vec<String>,

    /// Whether a replay script was written.
    pub script_written: bool,
}

/// Execute a patching run.
///
/// # Errors
///
/// - Return [`DriverError::Metadata`] if installation cannot be loaded.
/// - Return [`DriverError::Script`] if output path is unsupported, or the
///   script cannot be written.
/// - Return [`DriverError::Patch`] if a patch fails, or the user cancels a
///   prompt.
#[instrument(skip(registry, terminal), level = "debug")]
pub fn run(
    options: &Options,
    registry: &Registry,
    mut terminal: impl Terminal + 'static,
) -> Result<Summary> {
    if options.dry_run {
        let message = "This is a dry run. No changes will be made to the existing installation.";
        terminal.print(
            Severity::Warning,
            &format_line(None, Severity::Warning, message),
        );
    }

    let installation = Installation::load(&options.install)?;
    let script = Script::from_output(options.output.as_deref(), installation.root())?;
    let mut patcher = Patcher::new(installation, script, terminal).with_dry_run(options.dry_run);
    let mut summary = Summary::default();

    let mut seen = HashSet::new();
    let mut queue: Vec<&dyn Patch> = Vec::new();
    for name in &options.patches {
        if !seen.insert(name.as_str()) {
            patcher.report(
                Severity::Warning,
                &format!("Patch '{name}' was requested more than once. Ignoring the repeat."),
            );
            continue;
        }

        let Some(patch) = registry.get(name) else {
            patcher.report(
                Severity::Warning,
                &format!("Patch '{name}' not found. Skipping..."),
            );
            summary.missing.push(name.clone());
            continue;
        };

        let verdict = patcher.check(patch).map_err(|err| DriverError::Patch {
            source: err,
            name: name.clone(),
        })?;

        match verdict {
            Verdict::Apply => queue.push(patch),
            Verdict::Skip => summary.skipped.push(name.clone()),
        }
    }

    if queue.is_empty() {
        patcher.report(Severity::Plain, "No patches to apply.");
        return Ok(summary);
    }

    let names = queue.iter().map(|patch| patch.name()).collect::<Vec<_>>();
    debug!("apply queue {names:?}");
    patcher.preamble(&names);

    for &patch in &queue {
        patcher.apply(patch).map_err(|err| DriverError::Patch {
            source: err,
            name: patch.name().to_string(),
        })?;
        summary.applied.push(patch.name().to_string());
    }

    summary.script_written = patcher.finish()?;
    if let Some(output) = options.output.as_ref().filter(|_| summary.script_written) {
        info!("wrote script to {:?}", output.display());
        patcher.report(
            Severity::Info,
            &format!("Wrote script to {}.", output.display()),
        );
    }

    Ok(summary)
}

/// Print every registered patch with its description.
pub fn list(registry: &Registry, terminal: &mut dyn Terminal) {
    let width = registry
        .iter()
        .map(|patch| patch.name().len())
        .max()
        .unwrap_or(0);

    for patch in registry.iter() {
        let line = format!("{:<width$}  {}", patch.name(), patch.description());
        terminal.print(Severity::Plain, &line);
    }
}

/// Patching run error types.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Installation metadata cannot be loaded.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Replay script cannot be set up or written.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Patch failed during check or apply.
    #[error("patch {name:?} failed")]
    Patch {
        #[source]
        source: PatchError,
        name: String,
    },
}

impl DriverError {
    /// Check if run ended because the user cancelled a prompt.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Patch {
                source: PatchError::Cancelled,
                ..
            }
        )
    }
}

/// Friendly result alias :3
pub type Result<T, E = DriverError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::ReplayTerminal;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_aligns_descriptions() {
        let mut terminal = ReplayTerminal::default();
        list(&Registry::builtin(), &mut terminal);
        assert_eq!(
            terminal.lines(),
            vec![
                "locale  Remove every UI locale except the selected ones.",
                "reset   Remove per-user extensions, settings, and caches.",
            ]
        );
    }

    #[test]
    fn cancellation_is_detected() {
        let cancelled = DriverError::Patch {
            source: PatchError::Cancelled,
            name: "locale".into(),
        };
        assert!(cancelled.is_cancelled());

        let invalid = DriverError::Metadata(MetadataError::InvalidInstallation {
            root: PathBuf::from("/nowhere"),
        });
        assert!(!invalid.is_cancelled());
    }
}
