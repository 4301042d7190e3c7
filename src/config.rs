use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "gitrelease.toml";

/// Represents the complete configuration for git-release.
///
/// Contains repository settings, manifest locations, and the text-generation
/// endpoint used for commit messages. Every key has a default.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_project_name")]
    pub project_name: String,

    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub message: MessageConfig,
}

fn default_project_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string())
}

/// Where releases are pushed and how release tags are named.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            remote: default_remote(),
            branch: default_branch(),
            tag_pattern: default_tag_pattern(),
        }
    }
}

/// Manifest files scanned for the current version, and the one rewritten on release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManifestConfig {
    #[serde(default = "default_discovery")]
    pub discovery: Vec<PathBuf>,

    #[serde(default = "default_target")]
    pub target: PathBuf,
}

/// Returns the default manifest scan order.
fn default_discovery() -> Vec<PathBuf> {
    [
        "Cargo.toml",
        "pyproject.toml",
        "setup.py",
        "src/core/config.py",
        "__init__.py",
        "package.json",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn default_target() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            discovery: default_discovery(),
            target: default_target(),
        }
    }
}

/// Remote text-generation settings for commit messages.
///
/// The API key itself is never stored here, only the name of the
/// environment variable that carries it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MessageConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_max_prompt_changes")]
    pub max_prompt_changes: usize,
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_language() -> String {
    "English".to_string()
}

fn default_max_prompt_changes() -> usize {
    20
}

impl Default for MessageConfig {
    fn default() -> Self {
        MessageConfig {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            language: default_language(),
            max_prompt_changes: default_max_prompt_changes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project_name: default_project_name(),
            repository: RepositoryConfig::default(),
            manifest: ManifestConfig::default(),
            message: MessageConfig::default(),
        }
    }
}

impl Config {
    /// Checks values that deserialize fine but cannot drive a release.
    pub fn validate(&self) -> Result<()> {
        if self.repository.remote.trim().is_empty() {
            return Err(ReleaseError::config("repository.remote must not be empty"));
        }
        if self.repository.branch.trim().is_empty() {
            return Err(ReleaseError::config("repository.branch must not be empty"));
        }
        TagPattern::new(&self.repository.tag_pattern)
            .map_err(|e| ReleaseError::config(format!("repository.tag_pattern: {}", e)))?;
        if self.message.timeout_secs == 0 {
            return Err(ReleaseError::config("message.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// The parsed tag naming pattern.
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(&self.repository.tag_pattern)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in current directory
/// 3. `.gitrelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// The result is validated before it is returned.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = match locate_config(config_path)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            let config_str = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str(&config_str)?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

fn locate_config(config_path: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ReleaseError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
        .filter(|path| path.exists()))
}
