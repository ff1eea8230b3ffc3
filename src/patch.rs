// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Patch units.
//!
//! A __patch__ is a named, self-contained modification of an installation.
//! Each patch has two steps:
//!
//! - __check__: decide if the installation is compatible. A failed check
//!   does not error out, it asks the user whether to skip the patch.
//! - __apply__: perform the actual modification through the
//!   [`PatchScope`], which routes it to disk, to the replay script, or both.
//!
//! Patches are compiled in and looked up by name through the [`Registry`].
//!
//! # Shipped Patches
//!
//! 1. [`locale`]: drop every UI locale except the ones the user keeps.
//! 2. [`reset`]: wipe per-user profile data.

pub mod locale;
pub mod reset;

use crate::patcher::{PatchScope, Result};

/// Named modification of an installation.
pub trait Patch {
    /// Unique name used to request the patch.
    fn name(&self) -> &str;

    /// One line summary of what the patch does.
    fn description(&self) -> &str;

    /// Check installation compatibility.
    ///
    /// Failed checks ask for a skip through the scope instead of returning an
    /// error.
    fn check(&self, scope: &mut PatchScope<'_>) -> Result<()>;

    /// Apply modification.
    fn apply(&self, scope: &mut PatchScope<'_>) -> Result<()>;
}

/// Table of known patches keyed by name.
#[derive(Default)]
pub struct Registry {
    patches: Vec<Box<dyn Patch>>,
}

impl Registry {
    /// Construct empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct registry holding every shipped patch.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(locale::Locale);
        registry.register(reset::Reset);
        registry
    }

    /// Register patch.
    ///
    /// Replaces any patch registered under the same name.
    pub fn register(&mut self, patch: impl Patch + 'static) {
        let patch: Box<dyn Patch> = Box::new(patch);
        match self
            .patches
            .iter_mut()
            .find(|existing| existing.name() == patch.name())
        {
            Some(slot) => *slot = patch,
            None => self.patches.push(patch),
        }
    }

    /// Look up patch by name.
    pub fn get(&self, name: &str) -> Option<&dyn Patch> {
        self.patches
            .iter()
            .find(|patch| patch.name() == name)
            .map(AsRef::as_ref)
    }

    /// Iterate over registered patches in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Patch> {
        self.patches.iter().map(AsRef::as_ref)
    }
}
