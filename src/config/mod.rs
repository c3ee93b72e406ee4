use crate::models::UploadSettings;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Default settings file name, looked up in the config directory.
pub const SETTINGS_FILE_NAME: &str = "ytbulk.yaml";

/// Prefix of environment overrides (`YTBULK__UPLOAD_BATCH_LIMIT=5`,
/// `YTBULK__KEYWORDS=music,live`, ...).
pub const ENV_PREFIX: &str = "YTBULK";

const ENV_SEPARATOR: &str = "__";

/// Settings keys that accept a comma-separated list from the environment.
const ENV_LIST_KEYS: [&str; 3] = ["input_extensions", "keywords", "thumbnail_extensions"];

/// Configuration manager for the YAML settings file.
///
/// Loading layers `YTBULK__*` environment variables over the file, and the
/// file over [`UploadSettings::default`]. A missing file is not an error.
/// Saving writes only the file; environment overrides are never persisted.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Manage `ytbulk.yaml` inside `config_dir`, creating the directory if
    /// needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE_NAME),
        })
    }

    /// Manage an explicit settings file.
    pub fn for_file<P: Into<Utf8PathBuf>>(settings_path: P) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    /// Load settings from the file, then apply environment overrides.
    pub fn load_settings(&self) -> Result<UploadSettings> {
        self.load(true)
    }

    /// Load settings from the file alone.
    pub fn load_file_settings(&self) -> Result<UploadSettings> {
        self.load(false)
    }

    fn load(&self, with_env: bool) -> Result<UploadSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let mut builder = config::Config::builder().add_source(
            config::File::from(self.settings_path.as_std_path())
                .format(config::FileFormat::Yaml)
                .required(false),
        );

        if with_env {
            let mut environment = config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .list_separator(",")
                .try_parsing(true);
            for key in ENV_LIST_KEYS {
                environment = environment.with_list_parse_key(key);
            }
            builder = builder.add_source(environment);
        }

        let settings: UploadSettings = builder
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save settings, creating the parent directory if needed.
    pub fn save_settings(&self, settings: &UploadSettings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {}", parent))?;
            }
        }

        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Write a settings file with every default filled in.
    ///
    /// Refuses to replace an existing file.
    pub fn write_default_settings(&self) -> Result<UploadSettings> {
        if self.settings_path.exists() {
            bail!("Settings file already exists: {}", self.settings_path);
        }

        let settings = UploadSettings::default();
        self.save_settings(&settings)?;
        Ok(settings)
    }
}
