//! Bump levels and the merge lattice.
//!
//! Levels are totally ordered `None < Patch < Minor < Major`. Folding several
//! bump sources into one is always `max`, which is associative and
//! commutative with `None` as identity.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Magnitude of a semantic version increment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BumpLevel {
    /// No version change.
    #[default]
    None,
    /// Patch version bump (0.0.X).
    Patch,
    /// Minor version bump (0.X.0).
    Minor,
    /// Major version bump (X.0.0).
    Major,
}

impl BumpLevel {
    /// Every level, ascending.
    pub const ALL: [Self; 4] = [Self::None, Self::Patch, Self::Minor, Self::Major];

    /// Get the higher of two bump levels.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }

    /// Merge any number of levels; `None` for an empty input.
    #[must_use]
    pub fn merge_all(levels: impl IntoIterator<Item = Self>) -> Self {
        levels.into_iter().fold(Self::None, Self::merge)
    }

    /// Whether this level leaves a version unchanged.
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl FromStr for BumpLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "none" | "ignore" => Ok(Self::None),
            _ => Err(Error::invalid_bump_level(s)),
        }
    }
}

impl TryFrom<String> for BumpLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}
