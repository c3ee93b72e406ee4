use crate::models::{RuleSet, Severity};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// YouTube category ids are decimal numbers ("10" is Music).
static CATEGORY_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("Invalid category id regex"));

/// Reasons a run refuses to start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Upload batch limit must be greater than zero")]
    ZeroBatchLimit,

    #[error("At least one input file extension is required")]
    NoInputExtensions,

    #[error("Invalid file extension: {0:?}")]
    InvalidExtension(String),

    #[error("YouTube category id must be numeric, got {0:?}")]
    InvalidCategoryId(String),

    #[error("Interactive mode requires a confirmation handler")]
    MissingConfirmer,

    #[error("Description template {path} could not be loaded: {reason}")]
    TemplateUnavailable { path: Utf8PathBuf, reason: String },
}

/// Normalize a configured extension to lower case with a leading dot.
///
/// `"MP4"`, `".mp4"` and `" .Mp4 "` all become `".mp4"`.
pub fn normalize_extension(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);

    if bare.is_empty()
        || bare
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\' || c == '.')
    {
        return Err(ConfigError::InvalidExtension(raw.to_string()));
    }

    Ok(format!(".{}", bare.to_lowercase()))
}

fn normalize_extensions<I, S>(raw: I) -> Result<IndexSet<String>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter(|ext| !ext.as_ref().trim().is_empty())
        .map(|ext| normalize_extension(ext.as_ref()))
        .collect()
}

/// Immutable snapshot of every operator-chosen setting for one run.
///
/// Only constructible through [`RunConfigBuilder::build`], so a `RunConfig`
/// in hand is always valid: the batch limit is positive, at least one input
/// extension is set, every extension is normalized, and the category id is
/// numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    source_directory: Utf8PathBuf,
    input_extensions: IndexSet<String>,
    batch_limit: usize,
    category_id: String,
    keywords: Vec<String>,
    description_template: Utf8PathBuf,
    title_prefix: String,
    title_suffix: String,
    thumbnail_prefix: String,
    thumbnail_suffix: String,
    thumbnail_extensions: IndexSet<String>,
    title_rules: RuleSet,
    description_rules: RuleSet,
    thumbnail_rules: RuleSet,
    dry_run: bool,
    interactive: bool,
    log_level: Severity,
}

impl RunConfig {
    pub fn builder(source_directory: impl Into<Utf8PathBuf>) -> RunConfigBuilder {
        RunConfigBuilder::new(source_directory)
    }

    pub fn source_directory(&self) -> &Utf8Path {
        &self.source_directory
    }

    pub fn input_extensions(&self) -> &IndexSet<String> {
        &self.input_extensions
    }

    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn description_template(&self) -> &Utf8Path {
        &self.description_template
    }

    pub fn title_prefix(&self) -> &str {
        &self.title_prefix
    }

    pub fn title_suffix(&self) -> &str {
        &self.title_suffix
    }

    pub fn thumbnail_prefix(&self) -> &str {
        &self.thumbnail_prefix
    }

    pub fn thumbnail_suffix(&self) -> &str {
        &self.thumbnail_suffix
    }

    /// Thumbnail extensions in preference order.
    pub fn thumbnail_extensions(&self) -> &IndexSet<String> {
        &self.thumbnail_extensions
    }

    pub fn title_rules(&self) -> &RuleSet {
        &self.title_rules
    }

    pub fn description_rules(&self) -> &RuleSet {
        &self.description_rules
    }

    /// Rules applied to the video base name before thumbnail matching.
    pub fn thumbnail_rules(&self) -> &RuleSet {
        &self.thumbnail_rules
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn log_level(&self) -> Severity {
        self.log_level
    }
}

/// Collects settings for a [`RunConfig`].
///
/// Defaults match the desktop form's initial values (`.mp4 .mov`, batch limit
/// 100, category `10`, keyword `music`, thumbnails `.png .jpg .jpeg`), except
/// that the builder starts non-interactive.
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    source_directory: Utf8PathBuf,
    input_extensions: Vec<String>,
    batch_limit: usize,
    category_id: String,
    keywords: Vec<String>,
    description_template: Utf8PathBuf,
    title_prefix: String,
    title_suffix: String,
    thumbnail_prefix: String,
    thumbnail_suffix: String,
    thumbnail_extensions: Vec<String>,
    title_rules: RuleSet,
    description_rules: RuleSet,
    thumbnail_rules: RuleSet,
    dry_run: bool,
    interactive: bool,
    log_level: Severity,
}

impl RunConfigBuilder {
    pub fn new(source_directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source_directory: source_directory.into(),
            input_extensions: vec![".mp4".to_string(), ".mov".to_string()],
            batch_limit: 100,
            category_id: "10".to_string(),
            keywords: vec!["music".to_string()],
            description_template: Utf8PathBuf::from("description_template.txt"),
            title_prefix: String::new(),
            title_suffix: String::new(),
            thumbnail_prefix: String::new(),
            thumbnail_suffix: String::new(),
            thumbnail_extensions: vec![".png".to_string(), ".jpg".to_string(), ".jpeg".to_string()],
            title_rules: RuleSet::new(),
            description_rules: RuleSet::new(),
            thumbnail_rules: RuleSet::new(),
            dry_run: false,
            interactive: false,
            log_level: Severity::Info,
        }
    }

    pub fn input_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    pub fn category_id(mut self, id: impl Into<String>) -> Self {
        self.category_id = id.into();
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn description_template(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.description_template = path.into();
        self
    }

    pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    pub fn title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = suffix.into();
        self
    }

    pub fn thumbnail_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thumbnail_prefix = prefix.into();
        self
    }

    pub fn thumbnail_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.thumbnail_suffix = suffix.into();
        self
    }

    pub fn thumbnail_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.thumbnail_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn title_rules(mut self, rules: RuleSet) -> Self {
        self.title_rules = rules;
        self
    }

    pub fn description_rules(mut self, rules: RuleSet) -> Self {
        self.description_rules = rules;
        self
    }

    pub fn thumbnail_rules(mut self, rules: RuleSet) -> Self {
        self.thumbnail_rules = rules;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Validate and freeze the settings.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.batch_limit == 0 {
            return Err(ConfigError::ZeroBatchLimit);
        }

        let input_extensions = normalize_extensions(&self.input_extensions)?;
        if input_extensions.is_empty() {
            return Err(ConfigError::NoInputExtensions);
        }

        let category_id = self.category_id.trim().to_string();
        if !CATEGORY_ID_PATTERN.is_match(&category_id) {
            return Err(ConfigError::InvalidCategoryId(self.category_id));
        }

        let thumbnail_extensions = normalize_extensions(&self.thumbnail_extensions)?;

        let keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(RunConfig {
            source_directory: self.source_directory,
            input_extensions,
            batch_limit: self.batch_limit,
            category_id,
            keywords,
            description_template: self.description_template,
            title_prefix: self.title_prefix,
            title_suffix: self.title_suffix,
            thumbnail_prefix: self.thumbnail_prefix,
            thumbnail_suffix: self.thumbnail_suffix,
            thumbnail_extensions,
            title_rules: self.title_rules,
            description_rules: self.description_rules,
            thumbnail_rules: self.thumbnail_rules,
            dry_run: self.dry_run,
            interactive: self.interactive,
            log_level: self.log_level,
        })
    }
}
