// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installation version handling.
//!
//! Versions are short dotted triples like `1.102.35058`. Patches declare a
//! __minimum__ version they work with, and the installed version must meet
//! that minimum before a patch is allowed to run without asking the user.
//!
//! # Minimum Semantics
//!
//! A minimum only constrains the components it spells out. A minimum of
//! `1.2` says nothing about the third component, so `1.2.0` and `1.2.9` both
//! pass. Each spelled out component is checked on its own, i.e., the check is
//! component-wise and not lexicographic: `2.0` does not satisfy `1.2`.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Dotted version of one to three numeric components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Maximum number of components a version may carry.
    pub const MAX_COMPONENTS: usize = 3;

    /// Components as written.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Check that this version meets a minimum version.
    ///
    /// Only components present in `minimum` are compared. Components missing
    /// from this version count as zero.
    pub fn satisfies(&self, minimum: &Version) -> bool {
        minimum
            .components
            .iter()
            .enumerate()
            .all(|(idx, min)| self.components.get(idx).copied().unwrap_or(0) >= *min)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(data: &str) -> Result<Self> {
        if data.is_empty() {
            return Err(VersionError::Empty);
        }

        let components = data
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| VersionError::InvalidComponent {
                        version: data.into(),
                        component: part.into(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if components.len() > Self::MAX_COMPONENTS {
            return Err(VersionError::TooManyComponents {
                version: data.into(),
            });
        }

        Ok(Self { components })
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let parts = self
            .components
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        fmt.write_str(parts.join(".").as_str())
    }
}

/// Version parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Version string is empty.
    #[error("version string is empty")]
    Empty,

    /// Version has more than three components.
    #[error("version {version:?} has more than three components")]
    TooManyComponents { version: String },

    /// Component is not a non-negative integer.
    #[error("version {version:?} has invalid component {component:?}")]
    InvalidComponent { version: String, component: String },
}

/// Friendly result alias :3
type Result<T, E = VersionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("1.2.9", "1.2", true; "ignores unspecified patch component")]
    #[test_case("1.1.9", "1.2", false; "rejects lower minor component")]
    #[test_case("1.2", "1.2", true; "accepts exact two component match")]
    #[test_case("1.102.35058", "1.102.35058", true; "accepts exact triple match")]
    #[test_case("1.101.0", "1.102.35058", false; "rejects older release")]
    #[test_case("2.0.0", "1.2", false; "compares component-wise")]
    #[test_case("1.0.0", "1", true; "major only minimum")]
    #[test_case("1", "1.0.1", false; "missing installed components count as zero")]
    #[test]
    fn version_satisfies_minimum(installed: &str, minimum: &str, expect: bool) {
        let installed: Version = installed.parse().unwrap();
        let minimum: Version = minimum.parse().unwrap();
        assert_eq!(installed.satisfies(&minimum), expect);
    }

    #[test]
    fn version_parse_rejects_garbage() {
        assert_eq!("".parse::<Version>(), Err(VersionError::Empty));
        assert_eq!(
            "1.2.3.4".parse::<Version>(),
            Err(VersionError::TooManyComponents {
                version: "1.2.3.4".into()
            })
        );
        assert_eq!(
            "1.x".parse::<Version>(),
            Err(VersionError::InvalidComponent {
                version: "1.x".into(),
                component: "x".into()
            })
        );
        assert_eq!(
            "1..2".parse::<Version>(),
            Err(VersionError::InvalidComponent {
                version: "1..2".into(),
                component: "".into()
            })
        );
    }

    #[test]
    fn version_display_round_trips_text() {
        let version: Version = "1.102.35058".parse().unwrap();
        assert_eq!(version.to_string(), "1.102.35058");
        assert_eq!(version.components(), &[1, 102, 35058]);
    }
}
