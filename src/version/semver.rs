//! Semantic versions as published on the registry
//!
//! Registry versions are not always strict semver: authors publish `1.2`,
//! `0.43.2b1` or `v1.0.0`. [`SemVer::clean`] normalizes those into a
//! [`semver::Version`] so ordering follows semver precedence.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

/// A pre-release written without a dash must start with a letter, so a
/// numeric component is never split into number and pre-release.
static LOOSE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*[vV]?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z][0-9A-Za-z.-]*)|([A-Za-z][0-9A-Za-z.-]*))?\s*$",
    )
    .expect("valid loose version pattern")
});

/// Error returned when a string cannot be read as a version
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bad version number: '{0}'")]
pub struct InvalidVersion(pub String);

/// A version value with total ordering and pre-release precedence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVer(Version);

impl SemVer {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Parse a loosely formatted version string.
    ///
    /// Examples:
    /// - "1" -> 1.0.0
    /// - "1.2" -> 1.2.0
    /// - "0.43.2b1" -> 0.43.2-b1
    /// - "1.2.0-beta1" -> 1.2.0-beta1
    pub fn clean(version: &str) -> Result<Self, InvalidVersion> {
        let invalid = || InvalidVersion(version.to_string());

        let caps = LOOSE_VERSION.captures(version).ok_or_else(invalid)?;
        let number = |i: usize| -> Result<u64, InvalidVersion> {
            caps.get(i)
                .map_or(Ok(0), |m| m.as_str().parse::<u64>().map_err(|_| invalid()))
        };

        let pre = match caps.get(4).or_else(|| caps.get(5)) {
            Some(m) => Prerelease::new(m.as_str()).map_err(|_| invalid())?,
            None => Prerelease::EMPTY,
        };

        Ok(Self(Version {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre,
            build: BuildMetadata::EMPTY,
        }))
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    pub fn as_version(&self) -> &Version {
        &self.0
    }
}

impl FromStr for SemVer {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::clean(s)
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
