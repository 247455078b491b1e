//! Error types for version resolution.

use miette::Diagnostic;
use monobump_graph::ModuleId;
use thiserror::Error;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving module versions.
///
/// Every variant is fatal for a resolution run: `resolve` returns either a
/// complete result set or one of these.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Structural problem in the module graph (cycle, missing root, unknown id).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] monobump_graph::Error),

    /// A version string did not parse as `MAJOR.MINOR.PATCH[-qualifier]`.
    #[error("Invalid version '{version}'{}: {reason}", for_module(.module.as_ref()))]
    #[diagnostic(
        code(monobump::release::invalid_version),
        help("Version must follow semantic versioning (e.g., 1.0.0, 2.1.0-beta.1)")
    )]
    InvalidVersion {
        /// The invalid version string.
        version: String,
        /// What was wrong with it.
        reason: String,
        /// The module carrying the version, when known.
        module: Option<ModuleId>,
    },

    /// Applying a bump would overflow a version component.
    #[error("Version '{version}' cannot be bumped at {level} level without overflowing")]
    #[diagnostic(code(monobump::release::version_overflow))]
    VersionOverflow {
        /// The version being bumped.
        version: String,
        /// The requested bump level.
        level: String,
    },

    /// A string did not name a bump level.
    #[error("Invalid bump level: {value}")]
    #[diagnostic(
        code(monobump::release::invalid_bump_level),
        help("Expected one of: major, minor, patch, none (or ignore)")
    )]
    InvalidBumpLevel {
        /// The rejected input.
        value: String,
    },
}

impl Error {
    /// Create a new invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
            reason: reason.into(),
            module: None,
        }
    }

    /// Create a new invalid bump level error.
    #[must_use]
    pub fn invalid_bump_level(value: impl Into<String>) -> Self {
        Self::InvalidBumpLevel {
            value: value.into(),
        }
    }

    /// Attach the offending module to a version error.
    #[must_use]
    pub fn for_module(self, id: &ModuleId) -> Self {
        match self {
            Self::InvalidVersion {
                version, reason, ..
            } => Self::InvalidVersion {
                version,
                reason,
                module: Some(id.clone()),
            },
            other => other,
        }
    }
}

fn for_module(module: Option<&ModuleId>) -> String {
    module.map_or_else(String::new, |id| format!(" for module '{id}'"))
}
