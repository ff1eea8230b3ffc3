// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installation metadata layout.
//!
//! Every supported installation ships two JSON documents under
//! `resources/app`:
//!
//! - `product.json`, whose `nameShort` field names the product, e.g.,
//!   "VSCodium".
//! - `package.json`, whose `version` field holds the dotted release version.
//!
//! Both files must exist for a directory to count as an installation. Only
//! the fields above are read, everything else in the documents is ignored.

use crate::version::{Version, VersionError};

use serde::Deserialize;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Location of product metadata relative to installation root.
pub const PRODUCT_JSON: &str = "resources/app/product.json";

/// Location of package metadata relative to installation root.
pub const PACKAGE_JSON: &str = "resources/app/package.json";

/// Product metadata layout.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct ProductInfo {
    /// Short product name.
    #[serde(rename = "nameShort")]
    pub name_short: String,
}

impl FromStr for ProductInfo {
    type Err = serde_json::Error;

    fn from_str(data: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(data)
    }
}

/// Package metadata layout.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct PackageInfo {
    /// Release version string.
    pub version: String,
}

impl FromStr for PackageInfo {
    type Err = serde_json::Error;

    fn from_str(data: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(data)
    }
}

/// Identity of the installation being patched.
///
/// Loaded once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    root: PathBuf,
    product: String,
    version: Version,
}

impl Installation {
    /// Construct installation identity directly.
    pub fn new(root: impl Into<PathBuf>, product: impl Into<String>, version: Version) -> Self {
        Self {
            root: root.into(),
            product: product.into(),
            version,
        }
    }

    /// Load installation identity from its metadata files.
    ///
    /// Relative roots are resolved against the current directory.
    ///
    /// # Errors
    ///
    /// - Return [`MetadataError::InvalidInstallation`] if either metadata
    ///   file is missing.
    /// - Return [`MetadataError::Read`] if a metadata file cannot be read.
    /// - Return [`MetadataError::Parse`] if a metadata file is malformed.
    /// - Return [`MetadataError::Version`] if the version is unparsable.
    #[instrument(skip(root), level = "debug")]
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref()).map_err(|err| MetadataError::Read {
            source: err,
            path: root.as_ref().to_path_buf(),
        })?;
        let product_path = root.join(PRODUCT_JSON);
        let package_path = root.join(PACKAGE_JSON);

        if !product_path.is_file() || !package_path.is_file() {
            return Err(MetadataError::InvalidInstallation { root });
        }

        let product: ProductInfo = read_document(&product_path)?;
        let package: PackageInfo = read_document(&package_path)?;
        debug!(
            "loaded {} v{} from {:?}",
            product.name_short,
            package.version,
            root.display()
        );

        let version = package
            .version
            .parse()
            .map_err(|err| MetadataError::Version {
                source: err,
                path: package_path.clone(),
            })?;

        Ok(Self {
            root,
            product: product.name_short,
            version,
        })
    }

    /// Installation root directory.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Short product name.
    pub fn product(&self) -> &str {
        self.product.as_str()
    }

    /// Installed release version.
    pub fn version(&self) -> &Version {
        &self.version
    }
}

fn read_document<T>(path: &Path) -> Result<T>
where
    T: FromStr<Err = serde_json::Error>,
{
    let content = read_to_string(path).map_err(|err| MetadataError::Read {
        source: err,
        path: path.to_path_buf(),
    })?;

    content.parse().map_err(|err| MetadataError::Parse {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Installation metadata error types.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Directory does not contain installation metadata.
    #[error("{:?} is not a valid installation path", root.display())]
    InvalidInstallation { root: PathBuf },

    /// Metadata file cannot be read.
    #[error("failed to read metadata at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Metadata file is not valid JSON or lacks required fields.
    #[error("failed to parse metadata at {:?}", path.display())]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// Installed version cannot be parsed.
    #[error("invalid installed version in {:?}", path.display())]
    Version {
        #[source]
        source: VersionError,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = MetadataError> = std::result::Result<T, E>;
