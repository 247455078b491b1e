//! Module identifiers and module records.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

/// Identifier of the top-level module of a repository.
pub const ROOT_MODULE_ID: &str = ":";

const SEPARATOR: char = ':';

/// Hierarchical, colon-delimited module identifier.
///
/// `:` denotes the repository root and `:a:b` the module nested at `a/b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    /// The root module id.
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_MODULE_ID.to_string())
    }

    /// Derive a module id from a path relative to the repository root.
    ///
    /// An empty path (or `.`) maps to the root module.
    ///
    /// # Errors
    ///
    /// Returns an error if a path component is not valid UTF-8 or contains `:`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut id = String::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        Error::invalid_module_id(
                            path.display().to_string(),
                            "path is not valid UTF-8",
                        )
                    })?;
                    if part.contains(SEPARATOR) {
                        return Err(Error::invalid_module_id(
                            path.display().to_string(),
                            format!("path component '{part}' contains '{SEPARATOR}'"),
                        ));
                    }
                    id.push(SEPARATOR);
                    id.push_str(part);
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::invalid_module_id(
                        path.display().to_string(),
                        "module paths must be relative to the repository root",
                    ));
                }
            }
        }

        if id.is_empty() {
            return Ok(Self::root());
        }
        id.parse()
    }

    /// Whether this is the root module id.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_MODULE_ID
    }

    /// The path segments of this id; empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// The final path segment, or `None` for the root.
    #[must_use]
    pub fn last_segment(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The enclosing module id, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ModuleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == ROOT_MODULE_ID {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix(SEPARATOR) else {
            return Err(Error::invalid_module_id(s, "must start with ':'"));
        };
        for segment in rest.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(Error::invalid_module_id(s, "contains an empty path segment"));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(Error::invalid_module_id(s, "contains whitespace"));
            }
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ModuleId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A versionable unit within a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Unique id within the repository.
    pub id: ModuleId,
    /// Current version string, `MAJOR.MINOR.PATCH[-PRERELEASE]`.
    pub current_version: String,
    /// Ids of modules this module declares a dependency on.
    #[serde(default)]
    pub dependencies: BTreeSet<ModuleId>,
    /// Whether the owning build system uses a snapshot pre-release convention.
    #[serde(default)]
    pub supports_snapshots: bool,
}

impl Module {
    /// Create a module without dependencies.
    #[must_use]
    pub fn new(id: ModuleId, current_version: impl Into<String>) -> Self {
        Self {
            id,
            current_version: current_version.into(),
            dependencies: BTreeSet::new(),
            supports_snapshots: false,
        }
    }

    /// Add a declared dependency.
    #[must_use]
    pub fn with_dependency(mut self, dependency: ModuleId) -> Self {
        self.dependencies.insert(dependency);
        self
    }

    /// Add several declared dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = ModuleId>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// Set the snapshot capability flag.
    #[must_use]
    pub const fn with_snapshots(mut self, supports_snapshots: bool) -> Self {
        self.supports_snapshots = supports_snapshots;
        self
    }
}
