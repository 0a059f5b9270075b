// Configuration tests: YAML loading, env substitution and validation

use media_transform::config::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write temp config");
    file
}

#[test]
fn test_can_load_config_from_file() {
    let file = write_config(
        r#"
logging:
  format: json
  level: warn
sources:
  photos:
    enable_transform: true
    max_width_height: 1024
  avatars:
    enable_transform: false
"#,
    );

    let config = Config::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.sources.len(), 2);

    let photos = config.source("photos").expect("photos source missing");
    assert!(photos.enable_transform);
    assert_eq!(photos.effective_max_width_height(), 1024);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let err = Config::from_file("/nonexistent/media-transform.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}

#[test]
fn test_invalid_yaml_is_an_error() {
    let file = write_config("sources: [this is not a map");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_unknown_source_is_none() {
    let config = Config::from_yaml_with_env("sources: {}\n").unwrap();
    assert!(config.source("photos").is_none());
}

#[test]
fn test_env_var_substitution_from_file() {
    std::env::set_var("MEDIA_TRANSFORM_IT_QUALITY", "55");
    let file = write_config(
        r#"
sources:
  photos:
    enable_transform: true
    quality: ${MEDIA_TRANSFORM_IT_QUALITY}
"#,
    );

    let config = Config::from_file(file.path()).unwrap();
    let photos = config.source("photos").unwrap();
    assert_eq!(photos.quality, Some(55));
    assert_eq!(photos.effective_quality(), 55);
}

#[test]
fn test_validate_rejects_empty_logging_level() {
    let config = Config::from_yaml_with_env("logging:\n  level: \"\"\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_quality_above_100() {
    let config =
        Config::from_yaml_with_env("sources:\n  photos:\n    quality: 101\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.contains("photos"));
}
