// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Replay script generation.
//!
//! Besides touching the installation directly, the patcher can record every
//! filesystem change into a shell script that repeats them later, or on
//! another machine. Patches never talk to a script dialect directly. They go
//! through the patcher, which forwards to a [`Script`].
//!
//! # Backends
//!
//! A [`Script`] owns exactly one [`ScriptBackend`], picked once from the
//! requested output path:
//!
//! - No output path gives [`NullScript`], which ignores everything and never
//!   writes a file.
//! - A `.bat` or `.cmd` output path gives [`BatchScript`], which records
//!   Windows batch commands.
//!
//! Any other extension is rejected up front, before a single patch runs.
//!
//! # Portability
//!
//! Paths inside the installation root are written relative to the
//! `INSTALL_ROOT` variable, so the generated script works against any copy
//! of the installation by editing one line. Any other path is written
//! unchanged.

use crate::{config::Installation, path::relative_to, platform::Platform};

use std::{
    ffi::OsStr,
    fs::write,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Variable holding the installation root in generated scripts.
pub const ROOT_VARIABLE: &str = "INSTALL_ROOT";

/// Separator line used between patch sections.
pub const SEPARATOR: &str =
    "----------------------------------------------------------------------";

/// Dialect specific script recorder.
pub trait ScriptBackend {
    /// Platform that the script runs on, `None` when nothing is recorded.
    fn platform(&self) -> Option<Platform>;

    /// Append one comment line per entry.
    fn comment(&mut self, lines: &[&str]);

    /// Append variable assignment.
    fn set_variable(&mut self, name: &str, value: &str);

    /// Append file deletion.
    fn remove_file(&mut self, path: &Path);

    /// Append recursive directory deletion.
    fn remove_dir(&mut self, path: &Path);

    /// Append header that must precede everything else.
    fn prologue(&mut self);

    /// Recorded lines so far.
    fn lines(&self) -> &[String];

    /// Destination of the script.
    fn output(&self) -> Option<&Path>;
}

/// Backend for runs without script output.
#[derive(Debug, Default)]
pub struct NullScript;

impl ScriptBackend for NullScript {
    fn platform(&self) -> Option<Platform> {
        None
    }

    fn comment(&mut self, _: &[&str]) {}

    fn set_variable(&mut self, _: &str, _: &str) {}

    fn remove_file(&mut self, _: &Path) {}

    fn remove_dir(&mut self, _: &Path) {}

    fn prologue(&mut self) {}

    fn lines(&self) -> &[String] {
        &[]
    }

    fn output(&self) -> Option<&Path> {
        None
    }
}

/// Windows batch script backend.
#[derive(Debug)]
pub struct BatchScript {
    output: PathBuf,
    root: PathBuf,
    lines: Vec<String>,
}

impl BatchScript {
    /// Construct new batch script recorder.
    pub fn new(output: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            root: root.into(),
            lines: Vec::new(),
        }
    }

    /// Render path for batch commands.
    ///
    /// Paths strictly inside the installation root become
    /// `%INSTALL_ROOT%\...`, other paths are left as is.
    pub fn render_path(&self, path: &Path) -> String {
        match relative_to(path, &self.root) {
            Some(relative) => {
                let mut rendered = format!("%{ROOT_VARIABLE}%");
                for component in relative.components() {
                    rendered.push('\\');
                    rendered.push_str(&component.as_os_str().to_string_lossy());
                }
                rendered
            }
            None => path.display().to_string(),
        }
    }

    fn delete(&mut self, command: &str, path: &Path) {
        let rendered = self.render_path(path);
        self.lines.push(format!("echo :: Deleting {rendered}..."));
        self.lines.push(format!("{command} \"{rendered}\""));
    }
}

impl ScriptBackend for BatchScript {
    fn platform(&self) -> Option<Platform> {
        Some(Platform::Windows)
    }

    fn comment(&mut self, lines: &[&str]) {
        self.lines.extend(lines.iter().map(|line| format!("rem {line}")));
    }

    fn set_variable(&mut self, name: &str, value: &str) {
        self.lines.push(format!("set \"{name}={value}\""));
    }

    fn remove_file(&mut self, path: &Path) {
        self.delete("del /F /Q", path);
    }

    fn remove_dir(&mut self, path: &Path) {
        self.delete("rmdir /S /Q", path);
    }

    fn prologue(&mut self) {
        self.lines.push("@echo off".into());
    }

    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn output(&self) -> Option<&Path> {
        Some(self.output.as_path())
    }
}

/// Replay script being recorded for this run.
pub struct Script {
    backend: Box<dyn ScriptBackend>,
}

impl Script {
    /// Construct script that records nothing.
    pub fn none() -> Self {
        Self::with_backend(NullScript)
    }

    /// Construct script around explicit backend.
    pub fn with_backend(backend: impl ScriptBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Select script backend from output path.
    ///
    /// # Errors
    ///
    /// - Return [`ScriptError::UnsupportedExtension`] if output path does not
    ///   name a known script dialect.
    pub fn from_output(output: Option<&Path>, root: &Path) -> Result<Self> {
        let Some(output) = output else {
            return Ok(Self::none());
        };

        let extension = output
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "bat" | "cmd" => Ok(Self::with_backend(BatchScript::new(output, root))),
            _ => Err(ScriptError::UnsupportedExtension {
                output: output.to_path_buf(),
            }),
        }
    }

    /// Platform of the script, `None` when nothing is recorded.
    pub fn platform(&self) -> Option<Platform> {
        self.backend.platform()
    }

    /// Check if operations are recorded at all.
    pub fn is_active(&self) -> bool {
        self.backend.platform().is_some()
    }

    /// Record script header.
    ///
    /// Describes who generated the script, for which installation, and what
    /// patches it replays. Defines the installation root variable last.
    pub fn preamble(&mut self, installation: &Installation, host: Platform, applied: &[&str]) {
        self.backend.prologue();
        self.backend.comment(&[
            format!(
                "This script was created AUTOMATICALLY using instapatch v{}",
                env!("CARGO_PKG_VERSION")
            )
            .as_str(),
            format!(
                "for {} v{} on {host}.",
                installation.product(),
                installation.version()
            )
            .as_str(),
            "",
            "Applied patches:",
            format!("  {}", applied.join(",")).as_str(),
        ]);
        self.backend
            .set_variable(ROOT_VARIABLE, &installation.root().display().to_string());
    }

    /// Record section header for a patch.
    pub fn section(&mut self, name: &str) {
        self.backend.comment(&[SEPARATOR, name, SEPARATOR]);
    }

    /// Record comment lines.
    pub fn comment(&mut self, lines: &[&str]) {
        self.backend.comment(lines);
    }

    /// Record variable assignment.
    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.backend.set_variable(name, value);
    }

    /// Record file deletion.
    pub fn remove_file(&mut self, path: &Path) {
        self.backend.remove_file(path);
    }

    /// Record recursive directory deletion.
    pub fn remove_dir(&mut self, path: &Path) {
        self.backend.remove_dir(path);
    }

    /// Recorded lines so far.
    pub fn lines(&self) -> &[String] {
        self.backend.lines()
    }

    /// Write recorded lines to output path.
    ///
    /// Nothing is written when no line was recorded. Existing files are
    /// overwritten. Returns whether a file was written.
    ///
    /// # Errors
    ///
    /// - Return [`ScriptError::Write`] if the output file cannot be written.
    #[instrument(skip(self), level = "debug")]
    pub fn write(&self) -> Result<bool> {
        let lines = self.backend.lines();
        let Some(output) = self.backend.output() else {
            return Ok(false);
        };

        if lines.is_empty() {
            debug!("nothing recorded, skip writing {:?}", output.display());
            return Ok(false);
        }

        write(output, lines.join("\n")).map_err(|err| ScriptError::Write {
            source: err,
            output: output.to_path_buf(),
        })?;

        Ok(true)
    }
}

/// Script generation error types.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Output path names no supported script dialect.
    #[error("unsupported output file extension for {:?}, expected .bat or .cmd", output.display())]
    UnsupportedExtension { output: PathBuf },

    /// Script cannot be written to output path.
    #[error("failed to write script to {:?}", output.display())]
    Write {
        #[source]
        source: std::io::Error,
        output: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ScriptError> = std::result::Result<T, E>;
