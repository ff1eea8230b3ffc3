// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Patch orchestration core.
//!
//! The [`Patcher`] owns everything a run shares between patches: the
//! installation identity, the dry-run switch, the replay script, and the
//! terminal. Patches never see the patcher directly. Each check and apply
//! step receives a [`PatchScope`], an explicit context value that carries
//! the patch name along with a borrow of the patcher. Every report, prompt,
//! and removal made through the scope is attributed to that patch.
//!
//! # Patch Lifecycle
//!
//! 1. [`Patcher::check`] runs the patch's compatibility check in a fresh
//!    scope. A failed check asks the user whether to skip the patch, and the
//!    answer decides the [`Verdict`].
//! 2. [`Patcher::apply`] announces the patch on the console and in the
//!    script, then runs its apply step in another fresh scope.
//!
//! # Dual Targets
//!
//! Removals go to two independent targets: the host filesystem (unless this
//! is a dry run) and the replay script (when one is active). A removal can be
//! restricted to one [`Platform`], in which case each target only receives it
//! if its own platform matches. Patches never need to know which targets are
//! live.

use crate::{
    config::Installation,
    path::{display_relative, PathError},
    patch::Patch,
    platform::Platform,
    script::{Script, ScriptError},
    select::{select, Candidates},
    term::{format_line, Severity, TermError, Terminal},
    version::{Version, VersionError},
};

use std::{
    fs::{remove_dir_all, remove_file},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Outcome of a patch's compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Patch is queued for application.
    Apply,

    /// User chose to skip the patch.
    Skip,
}

/// Kind of filesystem entry a removal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    File,
    Dir,
    Detect,
}

/// Shared state of one patching run.
pub struct Patcher {
    installation: Installation,
    dry_run: bool,
    host: Platform,
    script: Script,
    terminal: Box<dyn Terminal>,
}

impl Patcher {
    /// Construct new patcher.
    ///
    /// Starts out as a real run on the current host platform.
    pub fn new(
        installation: Installation,
        script: Script,
        terminal: impl Terminal + 'static,
    ) -> Self {
        Self {
            installation,
            dry_run: false,
            host: Platform::host(),
            script,
            terminal: Box::new(terminal),
        }
    }

    /// Toggle dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Override host platform.
    pub fn with_host(mut self, host: Platform) -> Self {
        self.host = host;
        self
    }

    /// Installation being patched.
    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    /// Check if disk changes are suppressed.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Platform the patcher runs on.
    pub fn host(&self) -> Platform {
        self.host
    }

    /// Replay script of this run.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Report message outside of any patch.
    pub fn report(&mut self, severity: Severity, message: &str) {
        self.terminal
            .print(severity, &format_line(None, severity, message));
    }

    /// Run compatibility check of patch.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Cancelled`] if user interrupts a skip prompt.
    /// - Return any error raised by the check itself.
    #[instrument(skip(self, patch), fields(patch = patch.name()), level = "debug")]
    pub fn check(&mut self, patch: &dyn Patch) -> Result<Verdict> {
        let mut scope = PatchScope::new(self, patch.name());
        patch.check(&mut scope)?;

        let verdict = if scope.is_skipped() {
            Verdict::Skip
        } else {
            Verdict::Apply
        };
        debug!("verdict {verdict:?}");

        Ok(verdict)
    }

    /// Announce patch, and open the scope its apply step runs in.
    ///
    /// Prints a start line and records a section header into the script.
    pub fn begin<'a>(&'a mut self, name: &'a str) -> PatchScope<'a> {
        self.report(Severity::Plain, &format!("Starting '{name}'..."));
        self.script.section(name);
        PatchScope::new(self, name)
    }

    /// Apply patch.
    ///
    /// # Errors
    ///
    /// - Return any error raised by the apply step.
    #[instrument(skip(self, patch), fields(patch = patch.name()), level = "debug")]
    pub fn apply(&mut self, patch: &dyn Patch) -> Result<()> {
        let mut scope = self.begin(patch.name());
        patch.apply(&mut scope)
    }

    /// Record script header for the patches about to be applied.
    pub fn preamble(&mut self, applied: &[&str]) {
        self.script
            .preamble(&self.installation, self.host, applied);
    }

    /// Write replay script.
    ///
    /// Returns whether a script file was written.
    ///
    /// # Errors
    ///
    /// - Return [`ScriptError::Write`] if the script cannot be written.
    pub fn finish(&self) -> std::result::Result<bool, ScriptError> {
        self.script.write()
    }
}

/// Context of a single patch step.
///
/// Borrows the patcher for the duration of one check or apply step, and
/// attributes everything done through it to the named patch.
pub struct PatchScope<'a> {
    patcher: &'a mut Patcher,
    name: &'a str,
    skip: bool,
}

impl<'a> PatchScope<'a> {
    fn new(patcher: &'a mut Patcher, name: &'a str) -> Self {
        Self {
            patcher,
            name,
            skip: false,
        }
    }

    /// Name of patch owning this scope.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Installation being patched.
    pub fn installation(&self) -> &Installation {
        &self.patcher.installation
    }

    /// Check if disk changes are suppressed.
    pub fn is_dry_run(&self) -> bool {
        self.patcher.dry_run
    }

    /// Platform the patcher runs on.
    pub fn host(&self) -> Platform {
        self.patcher.host
    }

    /// Check if user chose to skip this patch.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Report message attributed to this patch.
    ///
    /// Plain and info messages go to stdout, the rest to stderr.
    pub fn report(&mut self, severity: Severity, message: &str) {
        let line = format_line(Some(self.name), severity, message);
        self.patcher.terminal.print(severity, &line);
    }

    /// Warn about incompatibility, and ask user whether to skip patch.
    ///
    /// Any answer other than "n" skips. Once skipped, later requests in the
    /// same scope are ignored.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Cancelled`] if user interrupts the prompt.
    pub fn request_skip(&mut self, message: &str) -> Result<()> {
        if self.skip {
            debug!("{} already skipped, ignore: {message}", self.name);
            return Ok(());
        }

        self.report(Severity::Warning, message);
        let prompt = format!("[{}] Skip the patch? [Y/n]: ", self.name);
        let answer = self.patcher.terminal.ask(&prompt)?;
        self.skip = !answer.eq_ignore_ascii_case("n");

        Ok(())
    }

    /// Require installed product to be one of the supported products.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Cancelled`] if user interrupts the skip prompt.
    pub fn check_product_name(&mut self, supported: &[&str]) -> Result<()> {
        let product = self.installation().product().to_string();
        if supported.contains(&product.as_str()) {
            return Ok(());
        }

        self.request_skip(&format!("'{product}' is not supported by the patch."))
    }

    /// Require installed version to meet a minimum version.
    ///
    /// Only the components spelled out in `minimum` are compared, see
    /// [`Version::satisfies`].
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Version`] if `minimum` is not a valid version.
    /// - Return [`PatchError::Cancelled`] if user interrupts the skip prompt.
    pub fn check_version(&mut self, minimum: &str) -> Result<()> {
        let required: Version = minimum.parse()?;
        let installed = self.installation().version();
        if installed.satisfies(&required) {
            return Ok(());
        }

        let message = format!(
            "{} v{installed} is not supported by the patch (minimal: v{minimum}).",
            self.installation().product()
        );
        self.request_skip(&message)
    }

    /// Remove path from every target.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Remove`] if path exists but cannot be removed.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.remove_entry(path.as_ref(), None, None, Entry::Detect)
    }

    /// Remove path from targets of one platform only.
    ///
    /// `None` targets every platform, same as [`PatchScope::remove`].
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Remove`] if path exists but cannot be removed.
    pub fn remove_on(&mut self, path: impl AsRef<Path>, platform: Option<Platform>) -> Result<()> {
        self.remove_entry(path.as_ref(), None, platform, Entry::Detect)
    }

    /// Remove file from targets of one platform only.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Remove`] if file exists but cannot be removed.
    pub fn remove_file_on(
        &mut self,
        path: impl AsRef<Path>,
        platform: Option<Platform>,
    ) -> Result<()> {
        self.remove_entry(path.as_ref(), None, platform, Entry::File)
    }

    /// Remove directory tree from targets of one platform only.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Remove`] if directory exists but cannot be
    ///   removed.
    pub fn remove_dir_on(
        &mut self,
        path: impl AsRef<Path>,
        platform: Option<Platform>,
    ) -> Result<()> {
        self.remove_entry(path.as_ref(), None, platform, Entry::Dir)
    }

    /// Remove directory tree, recording it into the script under another
    /// path.
    ///
    /// The host removes `path`, while the script removes `scripted` verbatim,
    /// e.g., `%APPDATA%\VSCodium` standing for a per-user directory of
    /// whoever runs the script.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Remove`] if directory exists but cannot be
    ///   removed.
    pub fn remove_dir_as(
        &mut self,
        path: impl AsRef<Path>,
        scripted: impl AsRef<Path>,
        platform: Option<Platform>,
    ) -> Result<()> {
        self.remove_entry(path.as_ref(), Some(scripted.as_ref()), platform, Entry::Dir)
    }

    /// Let user select values from candidates.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::Cancelled`] if user interrupts the prompt.
    pub fn select_from<V>(&mut self, candidates: &Candidates<V>, prompt: &str) -> Result<Vec<V>>
    where
        V: Clone,
    {
        Ok(select(
            self.patcher.terminal.as_mut(),
            Some(self.name),
            candidates,
            prompt,
        )?)
    }

    fn remove_entry(
        &mut self,
        path: &Path,
        scripted: Option<&Path>,
        platform: Option<Platform>,
        entry: Entry,
    ) -> Result<()> {
        let host = self.patcher.host;
        let target = self.patcher.script.platform();
        let shown = display_relative(path, self.installation().root());

        let on_host = !self.patcher.dry_run && platform.is_none_or(|wanted| wanted == host);
        let on_script =
            target.is_some_and(|target| platform.is_none_or(|wanted| wanted == target));
        let is_dir = match entry {
            Entry::File => false,
            Entry::Dir => true,
            Entry::Detect => path.is_dir(),
        };

        if on_host {
            delete(path, is_dir)?;
            self.report(Severity::Info, &format!("Removed {shown}."));
        }

        if on_script {
            let scripted = scripted.unwrap_or(path);
            if is_dir {
                self.patcher.script.remove_dir(scripted);
            } else {
                self.patcher.script.remove_file(scripted);
            }

            if !on_host {
                self.report(Severity::Info, &format!("The script will remove {shown}."));
            }
        } else if !on_host {
            let message = format!(
                "Ignored {shown}. (expected: {}, host: {host}, target: {})",
                platform.map_or("<any>".to_string(), |wanted| wanted.to_string()),
                target.map_or("<none>".to_string(), |target| target.to_string()),
            );
            self.report(Severity::Debug, &message);
        }

        Ok(())
    }
}

fn delete(path: &Path, is_dir: bool) -> Result<()> {
    let result = if is_dir {
        remove_dir_all(path)
    } else {
        remove_file(path)
    };

    match result {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(PatchError::Remove {
            source: err,
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Patch execution error types.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// User interrupted a prompt.
    #[error("operation cancelled by user")]
    Cancelled,

    /// Path exists, but cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Patch declared an invalid minimum version.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Patch used an invalid glob pattern.
    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),

    /// Glob match could not be read.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    /// User directory cannot be determined.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Terminal failed for other reasons than cancellation.
    #[error(transparent)]
    Term(TermError),
}

impl From<TermError> for PatchError {
    fn from(err: TermError) -> Self {
        match err {
            TermError::Cancelled => Self::Cancelled,
            other => Self::Term(other),
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = PatchError> = std::result::Result<T, E>;
