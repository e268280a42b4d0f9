//! # Storage Layout
//!
//! Every path the registry reads or writes is resolved here, from the storage
//! root plus a package identifier or an attachment name:
//!
//! ```text
//! <root>/<name>.json                 unscoped manifest
//! <root>/<scope>/<name>.json         scoped manifest
//! <root>/<attachment-name>           tarball, e.g. <root>/@scope/pkg-1.0.0.tgz
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::validation::{
    validate_package_segment, validate_safe_path, ValidationError, ValidationResult,
    MAX_PACKAGE_NAME_LENGTH,
};

const MANIFEST_SUFFIX: &str = ".json";

/// A package identifier, optionally scoped (`@scope/name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    scope: Option<String>,
    name: String,
}

impl PackageId {
    /// Builds an identifier from separate parts. An empty scope means no scope.
    pub fn new(scope: Option<&str>, name: &str) -> ValidationResult<Self> {
        let scope = match scope.filter(|s| !s.is_empty()) {
            Some(scope) => Some(validate_package_segment(scope)?.to_string()),
            None => None,
        };

        let id = Self {
            scope,
            name: validate_package_segment(name)?.to_string(),
        };

        let length = id.to_string().len();
        if length > MAX_PACKAGE_NAME_LENGTH {
            return Err(ValidationError::TooLong {
                actual: length,
                max: MAX_PACKAGE_NAME_LENGTH,
            });
        }
        Ok(id)
    }

    /// Parses a combined identifier, splitting on the first `/`.
    ///
    /// ```rust
    /// use npm_lite_server::layout::PackageId;
    ///
    /// let id = PackageId::parse("@scope/pkg").unwrap();
    /// assert_eq!(id.scope(), Some("@scope"));
    /// assert_eq!(id.name(), "pkg");
    /// assert_eq!(PackageId::parse("left-pad").unwrap().scope(), None);
    /// ```
    pub fn parse(identifier: &str) -> ValidationResult<Self> {
        match identifier.split_once('/') {
            Some((scope, name)) => Self::new(Some(scope), name),
            None => Self::new(None, identifier),
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}/{}", scope, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Resolves on-disk locations under a single storage root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the manifest document for a package.
    pub fn manifest_path(&self, package: &PackageId) -> PathBuf {
        let dir = match package.scope() {
            Some(scope) => self.root.join(scope),
            None => self.root.clone(),
        };
        dir.join(format!("{}{}", package.name(), MANIFEST_SUFFIX))
    }

    /// Location of a tarball, given its name relative to the root.
    pub fn artifact_path(&self, relative: &str) -> ValidationResult<PathBuf> {
        let relative = validate_safe_path(relative)?;
        Ok(self.root.join(relative))
    }

    /// Recovers the package identifier from a manifest path found under the
    /// root. Anything that is not exactly `<...>.json` below the root yields
    /// `None`.
    pub fn identifier_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;

        let identifier = segments.join("/");
        let stem = identifier.strip_suffix(MANIFEST_SUFFIX)?;
        if stem.is_empty() || stem.ends_with('/') {
            return None;
        }
        Some(stem.to_string())
    }
}
