//! Integration tests for the naming engine
//!
//! These tests verify:
//! - Rule application order and identity on empty rule sets
//! - Title and description composition
//! - Thumbnail matching by stem and extension order
//! - Upload item resolution from a RunConfig

use camino::{Utf8Path, Utf8PathBuf};
use proptest::prelude::*;
use ytbulk::models::{DiscoveredFile, RuleSet, RunConfig};
use ytbulk::services::naming::{
    apply_rules, build_upload_item, check_limits, compose_description, compose_title,
    match_thumbnail,
};

fn rule_set() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-c_ ]{1,3}", "[a-d_ ]{0,3}"), 0..6)
}

proptest! {
    #[test]
    fn prop_apply_is_left_to_right_fold(rules in rule_set(), input in "[a-d_ ]{0,24}") {
        let set: RuleSet = rules.iter().cloned().collect();

        let expected = rules
            .iter()
            .fold(input.clone(), |acc, (find, replace)| acc.replace(find.as_str(), replace));

        prop_assert_eq!(apply_rules(&set, &input), expected);
    }

    #[test]
    fn prop_empty_rule_set_is_identity(input in ".{0,40}") {
        prop_assert_eq!(apply_rules(&RuleSet::new(), &input), input);
    }

    #[test]
    fn prop_title_is_prefix_rules_suffix(
        prefix in ".{0,8}",
        suffix in ".{0,8}",
        base in "[a-d_ ]{0,16}",
        rules in rule_set(),
    ) {
        let set: RuleSet = rules.into_iter().collect();
        let title = compose_title(&prefix, &set, &base, &suffix);
        prop_assert_eq!(title, format!("{}{}{}", prefix, apply_rules(&set, &base), suffix));
    }
}

#[test]
fn test_title_example() {
    let rules = RuleSet::new().with("_", " ");
    assert_eq!(
        compose_title("Live: ", &rules, "my_song", " [HD]"),
        "Live: my song [HD]"
    );
}

#[test]
fn test_title_without_prefix_or_suffix() {
    assert_eq!(compose_title("", &RuleSet::new(), "track1", ""), "track1");
}

#[test]
fn test_rules_chain_on_previous_output() {
    let rules = RuleSet::new().with("a", "b").with("b", "c");
    assert_eq!(apply_rules(&rules, "ab"), "cc");

    // Order matters
    let reversed = RuleSet::new().with("b", "c").with("a", "b");
    assert_eq!(apply_rules(&reversed, "ab"), "bc");
}

#[test]
fn test_rules_are_literal() {
    let rules = RuleSet::new().with(".*", "X").with("(1)", "[one]");
    assert_eq!(apply_rules(&rules, "a.*b (1)"), "aXb [one]");
}

#[test]
fn test_description_is_template_with_rules() {
    let template = "Recorded at VENUE.\nSubscribe!";
    let rules = RuleSet::new().with("VENUE", "the Roxy");
    assert_eq!(
        compose_description(template, &rules),
        "Recorded at the Roxy.\nSubscribe!"
    );
}

#[test]
fn test_thumbnail_example() {
    let candidates = vec![Utf8PathBuf::from("/videos/track1-thumb.png")];
    let found = match_thumbnail("track1", "", "-thumb", [".jpg", ".png"], &candidates);
    assert_eq!(found, Some(Utf8Path::new("/videos/track1-thumb.png")));
}

#[test]
fn test_thumbnail_prefers_extension_order() {
    let candidates = vec![
        Utf8PathBuf::from("/videos/track1.png"),
        Utf8PathBuf::from("/videos/track1.JPG"),
    ];

    let found = match_thumbnail("track1", "", "", [".jpg", ".png"], &candidates);
    assert_eq!(found, Some(Utf8Path::new("/videos/track1.JPG")));

    let found = match_thumbnail("track1", "", "", [".png", ".jpg"], &candidates);
    assert_eq!(found, Some(Utf8Path::new("/videos/track1.png")));
}

#[test]
fn test_thumbnail_requires_exact_stem() {
    let candidates = vec![
        Utf8PathBuf::from("/videos/track10.png"),
        Utf8PathBuf::from("/videos/my_track1.png"),
        Utf8PathBuf::from("/videos/track1.gif"),
    ];
    assert_eq!(match_thumbnail("track1", "", "", [".png", ".jpg"], &candidates), None);
}

#[test]
fn test_build_upload_item() {
    let config = RunConfig::builder("/videos")
        .title_prefix("Live: ")
        .title_suffix(" [HD]")
        .title_rules(RuleSet::new().with("_", " "))
        .description_rules(RuleSet::new().with("{venue}", "the Roxy"))
        .thumbnail_suffix("-thumb")
        .thumbnail_rules(RuleSet::new().with("_final", ""))
        .category_id("22")
        .keywords(["music", "live"])
        .build()
        .unwrap();

    let file = DiscoveredFile::from_path("/videos/my_song_final.mp4").unwrap();
    let candidates = vec![
        Utf8PathBuf::from("/videos/my_song_final.mp4"),
        Utf8PathBuf::from("/videos/my_song-thumb.jpg"),
    ];

    let item = build_upload_item(&config, &file, "Live at {venue}", &candidates);

    assert_eq!(item.title, "Live: my song final [HD]");
    assert_eq!(item.description, "Live at the Roxy");
    assert_eq!(item.thumbnail, Some(Utf8PathBuf::from("/videos/my_song-thumb.jpg")));
    assert_eq!(item.category_id, "22");
    assert_eq!(item.keywords, vec!["music", "live"]);
    assert!(check_limits(&item).is_empty());
}

#[test]
fn test_check_limits_reports_each_problem() {
    let config = RunConfig::builder("/videos").build().unwrap();
    let file = DiscoveredFile::from_path(format!("/videos/{}.mp4", "x".repeat(120))).unwrap();

    let item = build_upload_item(&config, &file, "<b>bold</b>", &[]);
    let problems = check_limits(&item);

    assert_eq!(problems.len(), 2);
    assert!(problems[0].contains("120 characters"));
}
