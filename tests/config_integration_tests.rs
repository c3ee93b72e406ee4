//! Integration tests for ConfigManager and settings file handling
//!
//! These tests verify:
//! - Settings loading and saving
//! - Default settings generation
//! - Environment overrides layered over the file
//! - Conversion of settings into a validated RunConfig

use camino::Utf8PathBuf;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;
use ytbulk::models::{ConfigError, RuleSet, Severity};
use ytbulk::{ConfigManager, UploadSettings};

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.settings_path(), config_path.join("ytbulk.yaml"));
}

#[test]
fn test_config_dir_created() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("ytbulk");

    ConfigManager::new(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_load_default_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    // Settings file doesn't exist, should return defaults
    let settings = manager.load_file_settings().unwrap();

    assert_eq!(settings.log_level, Severity::Info);
    assert!(!settings.dry_run);
    assert!(settings.interactive);
    assert_eq!(settings.input_extensions, vec![".mp4", ".mov"]);
    assert_eq!(settings.upload_batch_limit, 100);
    assert_eq!(settings.category_id, "10");
    assert_eq!(settings.keywords, vec!["music"]);
    assert_eq!(settings.thumbnail_extensions, vec![".png", ".jpg", ".jpeg"]);
    assert_eq!(settings.upload_timeout_secs, 300);
    assert!(settings.upload_command.is_none());
}

#[test]
fn test_save_and_load_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut settings = manager.load_file_settings().unwrap();
    settings.source_directory = config_path.join("videos");
    settings.title_prefix = "Live: ".to_string();
    settings.title_replacements = RuleSet::new().with("_", " ").with("  ", " ");
    settings.keywords = vec!["music".to_string(), "live".to_string()];

    manager.save_settings(&settings).unwrap();
    let loaded = manager.load_file_settings().unwrap();

    assert_eq!(loaded, settings);
    // Rule order survives the round trip
    assert_eq!(loaded.title_replacements.iter().next().unwrap().find, "_");
}

#[test]
fn test_hand_written_settings_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let yaml = r#"
log_level: warn
interactive: false
source_directory: /srv/videos
input_extensions: [".MP4", "mkv"]
upload_batch_limit: 5
keywords: ["music, live"]
title_replacements:
  - find: "_"
    replace: " "
  - find: " (final)"
upload_command: "engine upload"
upload_timeout: 60
"#;
    fs::write(manager.settings_path(), yaml).unwrap();

    let settings = manager.load_file_settings().unwrap();
    assert_eq!(settings.log_level, Severity::Warning);
    assert_eq!(settings.upload_timeout_secs, 60);
    assert_eq!(settings.title_replacements.len(), 2);
    assert_eq!(settings.title_replacements.apply("a_b (final)"), "a b");

    let config = settings.to_run_config().unwrap();
    assert_eq!(config.source_directory(), camino::Utf8Path::new("/srv/videos"));
    assert_eq!(
        config.input_extensions().iter().collect::<Vec<_>>(),
        vec![".mp4", ".mkv"]
    );
    assert_eq!(config.batch_limit(), 5);
    assert_eq!(config.keywords(), ["music", "live"]);
    assert!(!config.interactive());
}

const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("YTBULK__UPLOAD_BATCH_LIMIT", "5"),
    ("YTBULK__CATEGORY_ID", "22"),
    ("YTBULK__KEYWORDS", "live,acoustic"),
    ("YTBULK__DRY_RUN", "true"),
];

#[test]
#[serial]
fn test_environment_overrides_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(
        manager.settings_path(),
        "upload_batch_limit: 50\ncategory_id: \"10\"\ntitle_prefix: \"Live: \"\n",
    )
    .unwrap();

    // SAFETY: serialized with every other test that touches the environment
    unsafe {
        for (key, value) in ENV_OVERRIDES {
            std::env::set_var(key, value);
        }
    }
    let loaded = manager.load_settings();
    let file_only = manager.load_file_settings();
    unsafe {
        for (key, _) in ENV_OVERRIDES {
            std::env::remove_var(key);
        }
    }

    let settings = loaded.unwrap();
    assert_eq!(settings.upload_batch_limit, 5);
    assert_eq!(settings.category_id, "22");
    assert_eq!(settings.keywords, vec!["live", "acoustic"]);
    assert!(settings.dry_run);
    // Keys without an override still come from the file
    assert_eq!(settings.title_prefix, "Live: ");

    // Overrides are never read by the file-only loader
    let file_only = file_only.unwrap();
    assert_eq!(file_only.upload_batch_limit, 50);
    assert!(!file_only.dry_run);
}

#[test]
fn test_invalid_yaml_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(manager.settings_path(), "upload_batch_limit: [not, a, number]\n").unwrap();

    assert!(manager.load_file_settings().is_err());
}

#[test]
fn test_write_default_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let written = manager.write_default_settings().unwrap();
    let content = fs::read_to_string(manager.settings_path()).unwrap();

    assert!(content.contains("upload_batch_limit: 100"));
    assert!(content.contains("upload_timeout: 300"));
    assert_eq!(manager.load_file_settings().unwrap(), written);

    // Existing file is left alone
    fs::write(manager.settings_path(), "dry_run: true\n").unwrap();
    assert!(manager.write_default_settings().is_err());
    assert!(manager.load_file_settings().unwrap().dry_run);
}

#[test]
fn test_settings_validation_errors() {
    let mut settings = UploadSettings {
        upload_batch_limit: 0,
        ..UploadSettings::default()
    };
    assert_eq!(settings.to_run_config().unwrap_err(), ConfigError::ZeroBatchLimit);

    settings.upload_batch_limit = 10;
    settings.input_extensions = vec!["  ".to_string()];
    assert_eq!(settings.to_run_config().unwrap_err(), ConfigError::NoInputExtensions);

    settings.input_extensions = vec![".mp4".to_string()];
    settings.category_id = "music".to_string();
    assert!(matches!(
        settings.to_run_config().unwrap_err(),
        ConfigError::InvalidCategoryId(_)
    ));
}
