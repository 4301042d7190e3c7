use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};

/// An annotated release tag: the tag name and its annotation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
    pub annotation_message: String,
}

impl ReleaseTag {
    /// Build the release tag for a version using the given naming pattern.
    pub fn for_version(pattern: &TagPattern, version: &SemanticVersion) -> Self {
        ReleaseTag {
            name: pattern.format(version),
            annotation_message: format!("Release version {}", version),
        }
    }
}

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    prefix: String,
    suffix: String,
}

impl TagPattern {
    /// Parse a pattern that must contain exactly one `{version}` placeholder.
    pub fn new(pattern: &str) -> Result<Self> {
        let parts: Vec<&str> = pattern.split("{version}").collect();
        if parts.len() != 2 {
            return Err(ReleaseError::tag(format!(
                "Invalid pattern '{}': should have exactly one {{version}} placeholder",
                pattern
            )));
        }

        Ok(TagPattern {
            prefix: parts[0].to_string(),
            suffix: parts[1].to_string(),
        })
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &SemanticVersion) -> String {
        format!("{}{}{}", self.prefix, version, self.suffix)
    }

    /// Glob handed to the repository when listing candidate tags (`v*`).
    pub fn glob(&self) -> String {
        format!("{}*{}", self.prefix, self.suffix)
    }

    /// Extract the version from a tag that follows this pattern.
    ///
    /// Returns `None` if the tag does not match or the version part is not a
    /// plain `MAJOR.MINOR.PATCH`.
    pub fn parse(&self, tag: &str) -> Option<SemanticVersion> {
        let rest = tag.strip_prefix(self.prefix.as_str())?;
        let version_part = rest.strip_suffix(self.suffix.as_str())?;
        SemanticVersion::parse_strict(version_part)
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            prefix: "v".to_string(),
            suffix: String::new(),
        }
    }
}
