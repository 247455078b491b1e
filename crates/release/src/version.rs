//! Semantic version arithmetic and the snapshot suffix.
//!
//! This module provides:
//! - Version parsing and formatting (`MAJOR.MINOR.PATCH[-qualifier][+build]`)
//! - Applying a [`BumpLevel`] to a version string
//! - The idempotent `-SNAPSHOT` pre-release convention

use crate::bump::BumpLevel;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Pre-release marker for unreleased development builds.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A parsed semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release qualifier (e.g., "alpha", "SNAPSHOT").
    pub prerelease: Option<String>,
    /// Build metadata (e.g., "20230101", "commit.abc123").
    pub build: Option<String>,
}

impl Version {
    /// Create a new release version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Create a version with a pre-release qualifier.
    #[must_use]
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Apply a bump level to this version.
    ///
    /// Any non-`None` bump yields a release-shaped version: the qualifier and
    /// build metadata are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the incremented component would overflow.
    pub fn bump(&self, level: BumpLevel) -> Result<Self> {
        let overflow = || Error::VersionOverflow {
            version: self.to_string(),
            level: level.to_string(),
        };
        Ok(match level {
            BumpLevel::Major => Self::new(self.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            BumpLevel::Minor => Self::new(
                self.major,
                self.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            BumpLevel::Patch => Self::new(
                self.major,
                self.minor,
                self.patch.checked_add(1).ok_or_else(overflow)?,
            ),
            BumpLevel::None => self.clone(),
        })
    }

    /// Check if this is a pre-release version.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

fn parse_component(input: &str, name: &str, value: &str) -> Result<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_version(
            input,
            format!("invalid {name} component '{value}'"),
        ));
    }
    if value.len() > 1 && value.starts_with('0') {
        return Err(Error::invalid_version(
            input,
            format!("{name} component '{value}' has a leading zero"),
        ));
    }
    value
        .parse()
        .map_err(|_| Error::invalid_version(input, format!("{name} component is too large")))
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s;
        let s = s.trim();

        // Split off build metadata
        let (version_pre, build) = match s.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (s, None),
        };

        // Split off prerelease
        let (version, prerelease) = match version_pre.split_once('-') {
            Some((v, p)) => (v, Some(p.to_string())),
            None => (version_pre, None),
        };

        if prerelease.as_deref() == Some("") {
            return Err(Error::invalid_version(input, "empty pre-release qualifier"));
        }
        if build.as_deref() == Some("") {
            return Err(Error::invalid_version(input, "empty build metadata"));
        }

        let parts: Vec<&str> = version.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(Error::invalid_version(
                input,
                "expected MAJOR.MINOR.PATCH[-qualifier]",
            ));
        };

        Ok(Self {
            major: parse_component(input, "major", major)?,
            minor: parse_component(input, "minor", minor)?,
            patch: parse_component(input, "patch", patch)?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

/// Compute the version that follows `current` after a bump.
///
/// A `None` bump returns `current` unchanged, verbatim.
///
/// # Errors
///
/// Returns an error if `current` does not parse as a version or the bump
/// would overflow a component.
pub fn next_version(current: &str, level: BumpLevel) -> Result<String> {
    let parsed: Version = current.parse()?;
    if level.is_none() {
        return Ok(current.to_string());
    }
    Ok(parsed.bump(level)?.to_string())
}

/// Append the snapshot marker unless the version already ends with it.
#[must_use]
pub fn apply_snapshot_suffix(version: &str) -> String {
    if is_snapshot(version) {
        version.to_string()
    } else {
        format!("{version}{SNAPSHOT_SUFFIX}")
    }
}

/// Remove one trailing snapshot marker, if present.
#[must_use]
pub fn strip_snapshot_suffix(version: &str) -> &str {
    version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version)
}

/// Whether the version carries the snapshot marker.
#[must_use]
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_version_parse() {
        let v: Version = "1.2.3".parse().unwrap();
        assert_eq!(v, Version::new(1, 2, 3));

        let v: Version = "1.2.3-beta.1".parse().unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.prerelease, Some("beta.1".to_string()));

        let v: Version = "1.2.3+build.123".parse().unwrap();
        assert_eq!(v.build, Some("build.123".to_string()));

        let v: Version = "1.2.3-rc.1+build.456".parse().unwrap();
        assert_eq!(v.prerelease, Some("rc.1".to_string()));
        assert_eq!(v.build, Some("build.456".to_string()));

        let v: Version = "2.0.0-SNAPSHOT".parse().unwrap();
        assert!(v.is_prerelease());
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!("1.2".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("a.b.c".parse::<Version>().is_err());
        assert!("v1.2.3".parse::<Version>().is_err());
        assert!("+1.2.3".parse::<Version>().is_err());
        assert!("1.2.3-".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
        assert!("99999999999999999999.0.0".parse::<Version>().is_err());
    }

    #[test]
    fn test_invalid_version_keeps_input() {
        let err = "1.x.0".parse::<Version>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'1.x.0'"));
        assert!(msg.contains("minor"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
        assert_eq!(
            Version::new(1, 2, 3).with_prerelease("alpha").to_string(),
            "1.2.3-alpha"
        );
    }

    #[test]
    fn test_version_bump() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BumpLevel::Patch).unwrap(), Version::new(1, 2, 4));
        assert_eq!(v.bump(BumpLevel::Minor).unwrap(), Version::new(1, 3, 0));
        assert_eq!(v.bump(BumpLevel::Major).unwrap(), Version::new(2, 0, 0));
        assert_eq!(v.bump(BumpLevel::None).unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_bump_drops_qualifier() {
        let v: Version = "1.0.0-SNAPSHOT+42".parse().unwrap();
        assert_eq!(v.bump(BumpLevel::Patch).unwrap().to_string(), "1.0.1");
    }

    #[test]
    fn test_bump_overflow() {
        let v = Version::new(u64::MAX, 0, 0);
        assert!(matches!(
            v.bump(BumpLevel::Major),
            Err(Error::VersionOverflow { .. })
        ));
        assert!(v.bump(BumpLevel::Minor).is_ok());
    }

    #[test]
    fn test_next_version() {
        assert_eq!(next_version("1.0.0", BumpLevel::Minor).unwrap(), "1.1.0");
        assert_eq!(next_version("1.2.3", BumpLevel::Major).unwrap(), "2.0.0");
        assert_eq!(next_version("2.3.1", BumpLevel::Patch).unwrap(), "2.3.2");
        assert_eq!(
            next_version("1.0.0-SNAPSHOT", BumpLevel::None).unwrap(),
            "1.0.0-SNAPSHOT"
        );
    }

    #[test]
    fn test_next_version_validates_even_without_bump() {
        assert!(matches!(
            next_version("latest", BumpLevel::None),
            Err(Error::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_apply_snapshot_suffix() {
        assert_eq!(apply_snapshot_suffix("1.2.0"), "1.2.0-SNAPSHOT");
        assert_eq!(apply_snapshot_suffix("1.2.0-SNAPSHOT"), "1.2.0-SNAPSHOT");
        assert_eq!(apply_snapshot_suffix("1.2.0-rc.1"), "1.2.0-rc.1-SNAPSHOT");
    }

    #[test]
    fn test_parse_rejects_leading_zeros() {
        for input in ["01.2.3", "1.02.3", "1.2.03"] {
            let err = input.parse::<Version>().unwrap_err();
            assert!(err.to_string().contains("leading zero"), "{input}: {err}");
        }
        assert_eq!("0.10.0".parse::<Version>().unwrap(), Version::new(0, 10, 0));
    }

    #[test]
    fn test_strip_snapshot_suffix() {
        assert_eq!(strip_snapshot_suffix("1.2.0-SNAPSHOT"), "1.2.0");
        assert_eq!(strip_snapshot_suffix("1.2.0"), "1.2.0");
        assert!(is_snapshot("0.1.0-SNAPSHOT"));
        assert!(!is_snapshot("0.1.0-snapshot"));
    }

    proptest! {
        #[test]
        fn snapshot_suffix_is_idempotent(version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}(-[A-Za-z0-9.]{1,10})?") {
            let once = apply_snapshot_suffix(&version);
            prop_assert_eq!(apply_snapshot_suffix(&once), once.clone());
            prop_assert!(is_snapshot(&once));
        }

        #[test]
        fn snapshot_strip_inverts_apply(version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}") {
            let applied = apply_snapshot_suffix(&version);
            prop_assert_eq!(strip_snapshot_suffix(&applied), version.as_str());
        }

        #[test]
        fn bump_never_decreases(
            major in 0_u64..1000,
            minor in 0_u64..1000,
            patch in 0_u64..1000,
        ) {
            let v = Version::new(major, minor, patch);
            for level in BumpLevel::ALL {
                let next = v.bump(level).unwrap();
                prop_assert!(
                    (next.major, next.minor, next.patch) >= (v.major, v.minor, v.patch)
                );
            }
        }
    }
}
