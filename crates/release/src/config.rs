//! Version policy configuration.
//!
//! [`VersionRules`] is plain data supplied by whoever loads the project
//! configuration. The engine never hard-codes bump semantics and never
//! re-validates the policy; an operator override is applied exactly as given.

use crate::bump::BumpLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Policy mapping commit semantics and dependency bumps to bump levels.
///
/// Serialized keys are camelCase so the rules can be embedded in any
/// configuration document:
///
/// ```toml
/// defaultBump = "none"
///
/// [commitTypeBumps]
/// feat = "minor"
/// fix = "patch"
/// chore = "ignore"
///
/// [dependencyBumps]
/// major = "minor"
/// minor = "patch"
/// patch = "patch"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionRules {
    /// Level for a commit whose type is not listed in `commit_type_bumps`.
    pub default_bump: BumpLevel,
    /// Level per conventional-commit type.
    pub commit_type_bumps: BTreeMap<String, BumpLevel>,
    /// Level forced on each dependent, keyed by the dependency's effective level.
    ///
    /// A missing key means no propagation at that level.
    pub dependency_bumps: BTreeMap<BumpLevel, BumpLevel>,
}

impl Default for VersionRules {
    /// Conventional-commits policy: `feat` is minor, `fix` and `perf` are
    /// patch, anything else is ignored, and any dependency bump forces a
    /// patch on dependents.
    fn default() -> Self {
        Self::new(BumpLevel::None)
            .with_commit_type("feat", BumpLevel::Minor)
            .with_commit_type("fix", BumpLevel::Patch)
            .with_commit_type("perf", BumpLevel::Patch)
            .with_dependency_bump(BumpLevel::Patch, BumpLevel::Patch)
            .with_dependency_bump(BumpLevel::Minor, BumpLevel::Patch)
            .with_dependency_bump(BumpLevel::Major, BumpLevel::Patch)
    }
}

impl VersionRules {
    /// Create an empty policy with the given default level.
    #[must_use]
    pub fn new(default_bump: BumpLevel) -> Self {
        Self {
            default_bump,
            commit_type_bumps: BTreeMap::new(),
            dependency_bumps: BTreeMap::new(),
        }
    }

    /// Set the level for commits of `commit_type`.
    #[must_use]
    pub fn with_commit_type(mut self, commit_type: impl Into<String>, level: BumpLevel) -> Self {
        self.commit_type_bumps.insert(commit_type.into(), level);
        self
    }

    /// Set the level forced on dependents of a module bumped at `dependency`.
    #[must_use]
    pub fn with_dependency_bump(mut self, dependency: BumpLevel, dependent: BumpLevel) -> Self {
        self.dependency_bumps.insert(dependency, dependent);
        self
    }

    /// Set the level for unrecognized commit types.
    #[must_use]
    pub const fn with_default_bump(mut self, level: BumpLevel) -> Self {
        self.default_bump = level;
        self
    }

    /// Level configured for a commit type, falling back to `default_bump`.
    ///
    /// An empty type is always unrecognized.
    #[must_use]
    pub fn bump_for_type(&self, commit_type: &str) -> BumpLevel {
        if commit_type.is_empty() {
            return self.default_bump;
        }
        self.commit_type_bumps
            .get(commit_type)
            .copied()
            .unwrap_or(self.default_bump)
    }

    /// Level forced on a dependent when a dependency's effective level is `level`.
    #[must_use]
    pub fn bump_for_dependency(&self, level: BumpLevel) -> BumpLevel {
        self.dependency_bumps
            .get(&level)
            .copied()
            .unwrap_or(BumpLevel::None)
    }
}
