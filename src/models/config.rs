use crate::models::{ConfigError, RuleSet, RunConfig, Severity};
use camino::Utf8PathBuf;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,]+").expect("Invalid list separator regex"));

/// Split a free-text list such as `".mp4 .mov"` or `"music, live"`.
pub fn split_list(input: &str) -> Vec<String> {
    LIST_SEPARATOR
        .split(input)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Persisted upload settings (`ytbulk.yaml`).
///
/// One field per input of the upload form. Missing keys fall back to the
/// form's initial values, so a partial file is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub log_level: Severity,
    pub dry_run: bool,
    pub interactive: bool,

    pub source_directory: Utf8PathBuf,

    /// Handed to the upload engine command; never read by ytbulk itself
    pub client_secrets_file: Utf8PathBuf,

    pub input_extensions: Vec<String>,
    pub upload_batch_limit: usize,

    pub category_id: String,
    pub keywords: Vec<String>,

    pub description_template_file: Utf8PathBuf,
    pub description_replacements: RuleSet,

    pub title_prefix: String,
    pub title_suffix: String,
    pub title_replacements: RuleSet,

    pub thumbnail_prefix: String,
    pub thumbnail_suffix: String,
    pub thumbnail_extensions: Vec<String>,
    pub thumbnail_replacements: RuleSet,

    /// Shell command run once per video to perform the upload
    pub upload_command: Option<String>,

    #[serde(rename = "upload_timeout")]
    pub upload_timeout_secs: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            log_level: Severity::Info,
            dry_run: false,
            interactive: true,
            source_directory: default_source_directory(),
            client_secrets_file: Utf8PathBuf::from("client_secret.json"),
            input_extensions: split_list(".mp4 .mov"),
            upload_batch_limit: 100,
            category_id: "10".to_string(),
            keywords: vec!["music".to_string()],
            description_template_file: Utf8PathBuf::from("description_template.txt"),
            description_replacements: RuleSet::new(),
            title_prefix: String::new(),
            title_suffix: String::new(),
            title_replacements: RuleSet::new(),
            thumbnail_prefix: String::new(),
            thumbnail_suffix: String::new(),
            thumbnail_extensions: split_list(".png .jpg .jpeg"),
            thumbnail_replacements: RuleSet::new(),
            upload_command: None,
            upload_timeout_secs: 300,
        }
    }
}

fn default_source_directory() -> Utf8PathBuf {
    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

impl UploadSettings {
    /// Validate the settings and freeze them into a [`RunConfig`].
    pub fn to_run_config(&self) -> Result<RunConfig, ConfigError> {
        RunConfig::builder(self.source_directory.clone())
            .input_extensions(self.input_extensions.iter().flat_map(|e| split_list(e)))
            .batch_limit(self.upload_batch_limit)
            .category_id(self.category_id.clone())
            .keywords(self.keywords.iter().flat_map(|k| split_list(k)))
            .description_template(self.description_template_file.clone())
            .title_prefix(self.title_prefix.clone())
            .title_suffix(self.title_suffix.clone())
            .title_rules(self.title_replacements.clone())
            .description_rules(self.description_replacements.clone())
            .thumbnail_prefix(self.thumbnail_prefix.clone())
            .thumbnail_suffix(self.thumbnail_suffix.clone())
            .thumbnail_extensions(self.thumbnail_extensions.iter().flat_map(|e| split_list(e)))
            .thumbnail_rules(self.thumbnail_replacements.clone())
            .dry_run(self.dry_run)
            .interactive(self.interactive)
            .log_level(self.log_level)
            .build()
    }
}
