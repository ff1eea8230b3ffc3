// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Platform identification.
//!
//! Some removals only make sense on one platform, e.g., per-user profile
//! directories that live at different places on each system. Both the host
//! running the patcher and the generated script have a platform, and a
//! platform-restricted removal only reaches the targets that match it.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Platform the current process runs on.
    pub fn host() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an [`std::env::consts::OS`] style name to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            _ => Self::Other,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::MacOs => "macOS",
            Self::Other => "<unknown>",
        };
        fmt.write_str(name)
    }
}
