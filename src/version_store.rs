//! Current-version discovery, bump arithmetic, and manifest rewriting.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::domain::{strip_version_marker, BumpClass, SemanticVersion};
use crate::error::Result;
use crate::git::Repository;

/// Version used when neither tags nor manifests carry one.
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Where the current version string came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    Tag(String),
    Manifest(PathBuf),
    Default,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::Tag(tag) => write!(f, "tag {}", tag),
            VersionSource::Manifest(path) => write!(f, "{}", path.display()),
            VersionSource::Default => write!(f, "default"),
        }
    }
}

/// The raw current version and its origin.
///
/// Discovery never fails; parsing is a separate step so an unparseable
/// version aborts the run instead of being coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentVersion {
    pub raw: String,
    pub source: VersionSource,
}

impl CurrentVersion {
    pub fn parse(&self) -> Result<SemanticVersion> {
        SemanticVersion::parse(&self.raw)
    }
}

/// Reads and writes the project version.
pub struct VersionStore {
    root: PathBuf,
    discovery: Vec<PathBuf>,
}

impl VersionStore {
    /// `discovery` is scanned in order; relative paths resolve against `root`.
    pub fn new(root: impl Into<PathBuf>, discovery: Vec<PathBuf>) -> Self {
        VersionStore {
            root: root.into(),
            discovery,
        }
    }

    /// Resolve the current version.
    ///
    /// Resolution order:
    /// 1. nearest tag reachable from HEAD, marker stripped
    /// 2. first manifest in the discovery list with a recognizable version field
    /// 3. [DEFAULT_VERSION]
    pub fn current_version<R: Repository + ?Sized>(&self, repo: &R) -> CurrentVersion {
        if let Some(tag) = repo.latest_reachable_tag() {
            debug!(tag = %tag, "current version from tag");
            return CurrentVersion {
                raw: strip_version_marker(tag.trim()).to_string(),
                source: VersionSource::Tag(tag),
            };
        }

        for relative in &self.discovery {
            let path = self.resolve(relative);
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            if let Some(version) = extract_version(&path, &content) {
                debug!(path = %path.display(), version = %version, "current version from manifest");
                return CurrentVersion {
                    raw: version,
                    source: VersionSource::Manifest(relative.clone()),
                };
            }
        }

        CurrentVersion {
            raw: DEFAULT_VERSION.to_string(),
            source: VersionSource::Default,
        }
    }

    /// Next version for an arithmetic bump class.
    pub fn bump(&self, current: &SemanticVersion, class: BumpClass) -> Result<SemanticVersion> {
        current.bump(class)
    }

    /// Rewrite the version field of one manifest in place.
    ///
    /// Returns `false` when the file is missing or unreadable, has no
    /// version field, or already carries `new_version`. Callers treat that
    /// as a warning.
    pub fn write_version(&self, path: &Path, new_version: &SemanticVersion) -> bool {
        let path = self.resolve(path);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "manifest not readable");
                return false;
            }
        };

        let Some(updated) = replace_version(&path, &content, &new_version.to_string()) else {
            debug!(path = %path.display(), "no version field to update");
            return false;
        };
        if updated == content {
            return false;
        }

        match fs::write(&path, updated) {
            Ok(()) => {
                info!(path = %path.display(), version = %new_version, "updated manifest version");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot write manifest");
                false
            }
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn is_cargo_manifest(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == "Cargo.toml")
}

fn is_package_json(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == "package.json")
}

/// Line-anchored `version = "..."`, used for Cargo.toml reads and all writes.
fn anchored_version_regex() -> Option<Regex> {
    Regex::new(r#"(?m)^(\s*version\s*=\s*["'])([^"']+)(["'])"#).ok()
}

fn package_json_regex() -> Option<Regex> {
    Regex::new(r#"("version"\s*:\s*")([^"]+)(")"#).ok()
}

/// Find a version string in manifest content.
///
/// Cargo manifests only match a line-leading `version` key so dependency
/// tables are skipped; other files try `version`, `__version__`,
/// `app_version` and `VERSION`, case-insensitively, in that order.
pub fn extract_version(path: &Path, content: &str) -> Option<String> {
    if is_cargo_manifest(path) {
        return anchored_version_regex()
            .and_then(|re| re.captures(content))
            .map(|caps| caps[2].to_string());
    }

    if is_package_json(path) {
        return package_json_regex()
            .and_then(|re| re.captures(content))
            .map(|caps| caps[2].to_string());
    }

    let patterns = [
        r#"(?i)version\s*=\s*["']([^"']+)["']"#,
        r#"(?i)__version__\s*=\s*["']([^"']+)["']"#,
        r#"(?i)app_version\s*=\s*["']([^"']+)["']"#,
        r#"(?i)VERSION\s*=\s*["']([^"']+)["']"#,
    ];

    patterns.iter().find_map(|pattern| {
        Regex::new(pattern)
            .ok()
            .and_then(|re| re.captures(content))
            .map(|caps| caps[1].to_string())
    })
}

/// Replace the first version field, preserving quotes and indentation.
fn replace_version(path: &Path, content: &str, new_version: &str) -> Option<String> {
    let re = if is_package_json(path) {
        package_json_regex()?
    } else {
        anchored_version_regex()?
    };

    if !re.is_match(content) {
        return None;
    }

    Some(
        re.replacen(content, 1, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], new_version, &caps[3])
        })
        .into_owned(),
    )
}
