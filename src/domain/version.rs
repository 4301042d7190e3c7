use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Represents a semantic version with major, minor, and patch components.
///
/// Ordering is lexicographic over (major, minor, patch), which is what both
/// bump arithmetic and newest-first tag sorting rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    /// Creates a new SemanticVersion with the specified components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parses a version string as found in manifests or tags.
    ///
    /// A leading `v`/`V` marker is stripped. Full semver strings are accepted
    /// and their pre-release/build metadata ignored; `MAJOR.MINOR` is accepted
    /// with a zero patch. Anything else is an error, never a guess.
    ///
    /// # Example
    /// ```ignore
    /// assert_eq!(SemanticVersion::parse("v1.2.3")?, SemanticVersion::new(1, 2, 3));
    /// assert_eq!(SemanticVersion::parse("1.4.0-rc.1")?, SemanticVersion::new(1, 4, 0));
    /// assert_eq!(SemanticVersion::parse("2.1")?, SemanticVersion::new(2, 1, 0));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let clean = strip_version_marker(input.trim());

        if let Ok(parsed) = semver::Version::parse(clean) {
            return Ok(SemanticVersion::new(parsed.major, parsed.minor, parsed.patch));
        }

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() == 2 {
            if let (Ok(major), Ok(minor)) = (parts[0].parse::<u64>(), parts[1].parse::<u64>()) {
                return Ok(SemanticVersion::new(major, minor, 0));
            }
        }

        Err(ReleaseError::version(format!(
            "'{}' is not a valid MAJOR.MINOR.PATCH version",
            input
        )))
    }

    /// Parses exactly `MAJOR.MINOR.PATCH`, with no marker and no suffix.
    ///
    /// Used for tag scanning, where anything looser would let a pre-release
    /// tag shadow the release it precedes.
    pub fn parse_strict(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 {
            return None;
        }

        // u64::from_str accepts a leading '+', tags must not
        if parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
        {
            return None;
        }

        let major = parts[0].parse::<u64>().ok()?;
        let minor = parts[1].parse::<u64>().ok()?;
        let patch = parts[2].parse::<u64>().ok()?;

        Some(SemanticVersion::new(major, minor, patch))
    }

    /// Computes the next version for an arithmetic bump class.
    ///
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **Minor**: minor += 1, patch = 0
    /// - **Patch**: patch += 1
    ///
    /// `Override` has no arithmetic and yields `InvalidBumpClass`.
    pub fn bump(&self, class: BumpClass) -> Result<Self> {
        match class {
            BumpClass::Major => Ok(SemanticVersion::new(self.major + 1, 0, 0)),
            BumpClass::Minor => Ok(SemanticVersion::new(self.major, self.minor + 1, 0)),
            BumpClass::Patch => Ok(SemanticVersion::new(self.major, self.minor, self.patch + 1)),
            BumpClass::Override => Err(ReleaseError::InvalidBumpClass(class.to_string())),
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

/// Removes a single leading version marker (`v` or `V`).
pub fn strip_version_marker(input: &str) -> &str {
    input
        .strip_prefix('v')
        .or_else(|| input.strip_prefix('V'))
        .unwrap_or(input)
}

/// The granularity of a release.
///
/// Patch, minor and major derive a strictly greater version; override
/// republishes a version that already has a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpClass {
    Patch,
    Minor,
    Major,
    Override,
}

impl BumpClass {
    /// The classes that carry version arithmetic, in menu order.
    pub const ARITHMETIC: [BumpClass; 3] = [BumpClass::Patch, BumpClass::Minor, BumpClass::Major];

    /// Human description used next to the class name in menus.
    pub fn description(&self) -> &'static str {
        match self {
            BumpClass::Patch => "bug fixes",
            BumpClass::Minor => "new features",
            BumpClass::Major => "breaking changes",
            BumpClass::Override => "republish an existing version",
        }
    }
}

impl fmt::Display for BumpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpClass::Patch => "patch",
            BumpClass::Minor => "minor",
            BumpClass::Major => "major",
            BumpClass::Override => "override",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BumpClass {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "patch" => Ok(BumpClass::Patch),
            "minor" => Ok(BumpClass::Minor),
            "major" => Ok(BumpClass::Major),
            "override" => Ok(BumpClass::Override),
            other => Err(ReleaseError::InvalidBumpClass(other.to_string())),
        }
    }
}
