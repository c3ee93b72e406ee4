//! Naming engine: turns a discovered file into YouTube metadata.
//!
//! All functions are pure. The description template arrives as a string from
//! a [`TemplateLoader`](crate::services::TemplateLoader); this module never
//! touches the filesystem.

use crate::models::{DiscoveredFile, RuleSet, RunConfig, UploadItem};
use camino::{Utf8Path, Utf8PathBuf};

/// Maximum title length YouTube accepts, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum description length YouTube accepts, in bytes.
pub const MAX_DESCRIPTION_BYTES: usize = 5000;

/// Apply `rules` to `input` in order.
pub fn apply_rules(rules: &RuleSet, input: &str) -> String {
    rules.apply(input)
}

/// `prefix + apply(rules, base_name) + suffix`
pub fn compose_title(prefix: &str, rules: &RuleSet, base_name: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, rules.apply(base_name), suffix)
}

/// Apply the description rules to the raw template text.
pub fn compose_description(template: &str, rules: &RuleSet) -> String {
    rules.apply(template)
}

/// Expected thumbnail file stem for a video: the thumbnail rules run over the
/// video base name, then prefix and suffix are attached.
pub fn thumbnail_stem(prefix: &str, rules: &RuleSet, video_base_name: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, rules.apply(video_base_name), suffix)
}

/// Find the thumbnail for a video among `candidates`.
///
/// A candidate matches when its stem equals `prefix + video_base_name + suffix`
/// exactly and its extension is one of `extensions`, compared without regard
/// to case. When several candidates match, the one whose extension comes first
/// in `extensions` wins.
pub fn match_thumbnail<'a, I, S>(
    video_base_name: &str,
    prefix: &str,
    suffix: &str,
    extensions: I,
    candidates: &'a [Utf8PathBuf],
) -> Option<&'a Utf8Path>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let expected_stem = format!("{}{}{}", prefix, video_base_name, suffix);

    let named: Vec<(&Utf8PathBuf, String)> = candidates
        .iter()
        .filter(|path| path.file_stem() == Some(expected_stem.as_str()))
        .filter_map(|path| path.extension().map(|ext| (path, format!(".{}", ext.to_lowercase()))))
        .collect();

    if named.is_empty() {
        return None;
    }

    extensions.into_iter().find_map(|wanted| {
        let wanted = wanted.as_ref().trim().to_lowercase();
        let wanted = if wanted.starts_with('.') {
            wanted
        } else {
            format!(".{}", wanted)
        };

        named
            .iter()
            .find(|(_, ext)| *ext == wanted)
            .map(|&(path, _)| path.as_path())
    })
}

/// Resolve title, description and thumbnail for one discovered file.
pub fn build_upload_item(
    config: &RunConfig,
    file: &DiscoveredFile,
    description_template: &str,
    thumbnail_candidates: &[Utf8PathBuf],
) -> UploadItem {
    let title = compose_title(
        config.title_prefix(),
        config.title_rules(),
        &file.base_name,
        config.title_suffix(),
    );

    let description = compose_description(description_template, config.description_rules());

    let thumbnail_base = config.thumbnail_rules().apply(&file.base_name);
    let thumbnail = match_thumbnail(
        &thumbnail_base,
        config.thumbnail_prefix(),
        config.thumbnail_suffix(),
        config.thumbnail_extensions(),
        thumbnail_candidates,
    )
    .map(Utf8Path::to_path_buf);

    UploadItem {
        file: file.clone(),
        title,
        description,
        thumbnail,
        category_id: config.category_id().to_string(),
        keywords: config.keywords().to_vec(),
    }
}

/// Problems YouTube would reject the item for.
///
/// Returns one human-readable message per violation; an empty list means the
/// metadata is acceptable.
pub fn check_limits(item: &UploadItem) -> Vec<String> {
    let mut problems = Vec::new();

    let title_chars = item.title.chars().count();
    if item.title.trim().is_empty() {
        problems.push("Title is empty".to_string());
    } else if title_chars > MAX_TITLE_CHARS {
        problems.push(format!(
            "Title is {} characters long (YouTube allows {})",
            title_chars, MAX_TITLE_CHARS
        ));
    }

    if item.description.len() > MAX_DESCRIPTION_BYTES {
        problems.push(format!(
            "Description is {} bytes long (YouTube allows {})",
            item.description.len(),
            MAX_DESCRIPTION_BYTES
        ));
    }

    if item.title.contains(['<', '>']) {
        problems.push("Title contains '<' or '>'".to_string());
    }
    if item.description.contains(['<', '>']) {
        problems.push("Description contains '<' or '>'".to_string());
    }

    problems
}
