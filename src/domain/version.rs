use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VersionBumperError};

/// Semantic version of a component (major.minor.patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version as found inside project and assembly-info files.
    ///
    /// The text is normalized first: wildcards become zeroes, pre-release
    /// suffixes are dropped, a fourth (revision) number is discarded and
    /// missing parts are padded, so `"1.2.*"`, `"1.2.3.4"` and
    /// `"1.2.3-beta"` all parse.
    pub fn parse_lenient(text: &str) -> Result<Self> {
        let normalized = normalize(text);
        let parsed = semver::Version::parse(&normalized).map_err(|e| {
            VersionBumperError::version(format!("Invalid version '{}': {}", text.trim(), e))
        })?;
        Ok(parsed.into())
    }

    /// Bump version according to the part requested.
    ///
    /// `VersionPart::None` returns the same version unchanged. Fails when
    /// the bumped number does not fit.
    pub fn bump(&self, part: VersionPart) -> Result<Self> {
        let bumped = match part {
            VersionPart::Major => self.major.checked_add(1).map(|m| Version::new(m, 0, 0)),
            VersionPart::Minor => self
                .minor
                .checked_add(1)
                .map(|m| Version::new(self.major, m, 0)),
            VersionPart::Patch => self
                .patch
                .checked_add(1)
                .map(|p| Version::new(self.major, self.minor, p)),
            VersionPart::None => Some(*self),
        };
        bumped.ok_or_else(|| {
            VersionBumperError::version(format!(
                "Version {} cannot be bumped by {}: number overflow",
                self, part
            ))
        })
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::new(1, 0, 0)
    }
}

impl From<semver::Version> for Version {
    fn from(v: semver::Version) -> Self {
        Version::new(v.major, v.minor, v.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn normalize(text: &str) -> String {
    let without_wildcards = text.replace('*', "0");
    let core = without_wildcards
        .split('-')
        .next()
        .unwrap_or_default()
        .trim();
    let mut parts: Vec<&str> = core.split('.').collect();
    parts.truncate(3);
    while parts.len() < 3 {
        parts.push("0");
    }
    parts
        .iter()
        .map(|p| if p.is_empty() { "0" } else { p })
        .collect::<Vec<_>>()
        .join(".")
}

/// Which part of a version a bump increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPart {
    /// Re-normalize only
    #[default]
    None,
    Major,
    Minor,
    Patch,
}

impl VersionPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionPart::None => "none",
            VersionPart::Major => "major",
            VersionPart::Minor => "minor",
            VersionPart::Patch => "patch",
        }
    }
}

impl FromStr for VersionPart {
    type Err = VersionBumperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(VersionPart::Major),
            "minor" => Ok(VersionPart::Minor),
            "patch" | "build" => Ok(VersionPart::Patch),
            "none" | "" => Ok(VersionPart::None),
            other => Err(VersionBumperError::version(format!(
                "Unknown version part '{}' (expected major, minor, patch or build)",
                other
            ))),
        }
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
