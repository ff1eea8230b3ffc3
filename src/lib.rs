// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Patch local application installations.
//!
//! A __patch__ is a small, named modification of an installed application,
//! e.g., deleting UI locales nobody reads. Patches never touch the disk
//! themselves. They go through a [`PatchScope`], which routes each side
//! effect to one or both of two targets:
//!
//! - __host__: the installation on this machine, unless it is a dry run.
//! - __script__: a generated batch script that replays the same changes
//!   later, or on another machine.
//!
//! Every patch supports both targets without knowing which are active.
//!
//! # Modules
//!
//! - [`config`]: installation metadata.
//! - [`version`]: dotted release versions.
//! - [`platform`]: host platform detection.
//! - [`path`]: path expansion and user directories.
//! - [`term`]: console output and prompts.
//! - [`select`]: interactive multi-selection.
//! - [`script`]: replay script emission.
//! - [`patcher`]: installation state shared by patches.
//! - [`patch`]: patch trait, registry, and shipped patches.
//! - [`driver`]: run orchestration.

pub mod config;
pub mod driver;
pub mod patch;
pub mod patcher;
pub mod path;
pub mod platform;
pub mod script;
pub mod select;
pub mod term;
pub mod version;

pub use config::Installation;
pub use driver::{list, run, DriverError, Options, Summary};
pub use patch::{Patch, Registry};
pub use patcher::{PatchError, PatchScope, Patcher, Verdict};
pub use platform::Platform;
pub use script::Script;
pub use term::{Severity, StdTerminal, Terminal};
pub use version::Version;
