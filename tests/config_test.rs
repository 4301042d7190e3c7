// tests/config_test.rs
use git_release::config::{load_config, Config, CONFIG_FILE_NAME};
use git_release::ReleaseError;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
project_name = "imagecompress"

[repository]
remote = "upstream"
branch = "main"
tag_pattern = "release-{version}"

[manifest]
discovery = ["pyproject.toml"]
target = "pyproject.toml"

[message]
model = "openai/gpt-4o-mini"
timeout_secs = 10
language = "Chinese"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path())).unwrap();
    assert_eq!(config.project_name, "imagecompress");
    assert_eq!(config.repository.remote, "upstream");
    assert_eq!(config.repository.branch, "main");
    assert_eq!(config.manifest.discovery, vec![PathBuf::from("pyproject.toml")]);
    assert_eq!(config.manifest.target, PathBuf::from("pyproject.toml"));
    assert_eq!(config.message.model, "openai/gpt-4o-mini");
    assert_eq!(config.message.timeout_secs, 10);
    assert_eq!(config.message.language, "Chinese");
    // untouched keys keep their defaults
    assert_eq!(config.message.api_key_env, "OPENROUTER_API_KEY");
    assert_eq!(config.message.max_prompt_changes, 20);

    let pattern = config.tag_pattern().unwrap();
    assert_eq!(pattern.glob(), "release-*");
}

#[test]
fn test_invalid_toml_is_reported() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[repository\nbranch = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path())).unwrap_err();
    assert!(matches!(err, ReleaseError::TomlDe(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_invalid_pattern_in_file_is_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[repository]\ntag_pattern = \"{version}-{version}\"\n")
        .unwrap();
    temp_file.flush().unwrap();

    assert!(matches!(
        load_config(Some(temp_file.path())),
        Err(ReleaseError::Config(_))
    ));
}

#[test]
#[serial]
fn test_project_local_file_is_found() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[repository]\nbranch = \"trunk\"\n",
    )
    .unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    std::env::set_current_dir(original).unwrap();

    assert_eq!(result.unwrap().repository.branch, "trunk");
}

#[test]
fn test_default_values() {
    let config = Config::default();
    assert_eq!(config.repository.remote, "origin");
    assert_eq!(config.repository.tag_pattern, "v{version}");
    assert!(config
        .manifest
        .discovery
        .contains(&PathBuf::from("package.json")));
    assert!(!config.project_name.is_empty());
}
