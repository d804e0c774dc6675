//! Tests for schema inference.

use super::*;
use crate::parser;
use crate::schema::{FORMAT_CUSTOM, FORMAT_MARKDOWN_CHECKLIST, FORMAT_NUMBERED_LIST, FieldKey};
use crate::status::{FieldKind, State};

/// 50 lines: 20 checklist-marker lines, 2 numbered-list lines, 28 prose.
fn checklist_sample() -> String {
    let mut lines = Vec::new();
    lines.push("# Release plan".to_string());
    lines.push("1. Read the plan".to_string());
    lines.push("2. Pick a task".to_string());
    for i in 1..=10 {
        lines.push(format!("- [ ] T{:03}: Build feature number {}", i, i));
        let dev = match i % 3 {
            0 => "Complete",
            1 => "Not Started",
            _ => "In Progress",
        };
        lines.push(format!("  - [ ] Dev Status: [{}]", dev));
    }
    while lines.len() < 50 {
        lines.push("Some free-form notes about the release.".to_string());
    }
    lines.join("\n")
}

fn full_sample() -> &'static str {
    "\
# Tasks

- [ ] - **T001: Add login route**
  - [x] - Dev Status: [Complete]
  - [x] - QA Status: [Passed]
- [ ] - **T002: Add logout route**
  - [x] - Dev Status: [Complete]
  - [x] - QA Status: [Failed - flaky redirect test]
- [ ] - **T003: Session cache**
  - [ ] - Dev Status: [In Progress]
  - [ ] - QA Status: [Not Started]
- [ ] - **T004: Password reset**
  - [ ] - Dev Status: [Not Started]
  - [ ] - QA Status: [Not Started]
"
}

#[test]
fn test_detects_markdown_checklist_format() {
    let sample = checklist_sample();
    assert_eq!(sample.lines().count(), 50);
    let inference = infer_with_report(&sample);
    assert_eq!(inference.schema.format_type, FORMAT_MARKDOWN_CHECKLIST);
    assert_eq!(inference.detected_ids.len(), 10);
    assert_eq!(inference.match_rate, 1.0);
    assert_eq!(inference.schema.confidence, 1.0);
}

#[test]
fn test_detect_format_thresholds() {
    let numbered = ["1. Alpha", "2. Beta", "3. Gamma", "prose"];
    assert_eq!(detect_format(&numbered), FORMAT_NUMBERED_LIST);

    let prose = ["one", "two", "three", "- [ ] four"];
    assert_eq!(detect_format(&prose), FORMAT_CUSTOM);

    assert_eq!(detect_format(&[]), FORMAT_CUSTOM);
}

#[test]
fn test_detects_id_convention() {
    let lines = ["TASK-0001 a", "TASK-0002 b", "see T1 and REF-12", "TASK-0003 c"];
    let convention = detect_id_convention(&lines).unwrap();
    assert_eq!(convention.prefix, "TASK");
    assert_eq!(convention.separator, "-");
    assert_eq!(convention.width, 4);
    assert_eq!(convention.pattern(), r"TASK\-\d{4}");
}

#[test]
fn test_id_convention_tie_goes_to_first_seen() {
    let lines = ["B-1 first", "A-22 second"];
    let convention = detect_id_convention(&lines).unwrap();
    assert_eq!(convention.prefix, "B");
}

#[test]
fn test_inferred_schema_parses_sample() {
    let inference = infer_with_report(full_sample());
    let schema = &inference.schema;

    assert_eq!(schema.format_type, FORMAT_MARKDOWN_CHECKLIST);
    assert_eq!(schema.confidence, 1.0);
    assert_eq!(schema.match_rate, Some(1.0));
    assert!(schema.last_validated.is_some());
    assert_eq!(
        schema.field_mapping.get(&FieldKey::Dev),
        Some(&vec!["Dev Status".to_string()])
    );
    assert_eq!(schema.field_kind(&FieldKey::Qa), FieldKind::Verification);

    let compiled = schema.compile().unwrap();
    let tasks = parser::parse(full_sample(), &compiled);
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0].state(&FieldKey::Qa), State::VerifiedSuccess);
    assert_eq!(tasks[1].state(&FieldKey::Qa), State::VerifiedFailure);
    assert_eq!(
        tasks[1].field(&FieldKey::Qa).unwrap().reason.as_deref(),
        Some("flaky redirect test")
    );
    assert_eq!(tasks[2].state(&FieldKey::Dev), State::InProgress);
    assert_eq!(tasks[3].state(&FieldKey::Dev), State::NotStarted);
}

#[test]
fn test_inferred_semantics_fill_missing_states() {
    let schema = infer(full_sample());
    let dev = schema.status_semantics.get(&FieldKey::Dev).unwrap();
    for state in FieldKind::Progress.states() {
        assert!(
            dev.states.get(state).is_some_and(|v| !v.is_empty()),
            "missing variants for {}",
            state
        );
    }
}

#[test]
fn test_semantic_key_mapping() {
    assert_eq!(semantic_key("Dev Status"), FieldKey::Dev);
    assert_eq!(semantic_key("Development"), FieldKey::Dev);
    assert_eq!(semantic_key("QA"), FieldKey::Qa);
    assert_eq!(semantic_key("Quality Check"), FieldKey::Qa);
    assert_eq!(semantic_key("User Verification"), FieldKey::UserVerification);
    assert_eq!(
        semantic_key("Docs Review!"),
        FieldKey::Custom("docs_review".to_string())
    );
}

#[test]
fn test_classify_checks_negative_vocabulary_first() {
    assert_eq!(classify("Not Verified", FieldKind::Verification), Some(State::NotVerified));
    assert_eq!(classify("Verified", FieldKind::Verification), Some(State::VerifiedSuccess));
    assert_eq!(classify("Incomplete", FieldKind::Progress), Some(State::NotStarted));
    assert_eq!(classify("Completed", FieldKind::Progress), Some(State::Complete));
    assert_eq!(classify("Rejected", FieldKind::Verification), Some(State::VerifiedFailure));
    assert_eq!(classify("Purple", FieldKind::Progress), None);
}

#[test]
fn test_classify_matches_whole_words_only() {
    let verification = FieldKind::Verification;
    assert_eq!(classify("Looking into it", verification), None);
    assert_eq!(classify("Bypassed", verification), None);
    assert_eq!(classify("Not OK", verification), Some(State::NotVerified));
    assert_eq!(classify("Not passed", verification), Some(State::NotVerified));
    assert_eq!(classify("not pass", verification), Some(State::NotVerified));
    assert_eq!(classify("OK", verification), Some(State::VerifiedSuccess));
    assert_eq!(classify("Passing", verification), Some(State::VerifiedSuccess));
    assert_eq!(classify("Failures found", verification), Some(State::VerifiedFailure));
    assert_eq!(classify("Unverified", verification), Some(State::NotVerified));
}

#[test]
fn test_too_small_sample_uses_default() {
    let inference = infer_with_report("- [ ] T001: one\n\n");
    assert_eq!(inference.schema, crate::schema::Schema::builtin_default());
    assert_eq!(inference.warnings.len(), 1);

    assert_eq!(infer(""), crate::schema::Schema::builtin_default());
}

#[test]
fn test_low_match_rate_lowers_confidence() {
    // Ids mentioned only in prose are detected but never parsed as tasks.
    let sample = "\
- [ ] T001: Login
  - [ ] Dev Status: [In Progress]
- [ ] T002: Logout
  - [ ] Dev Status: [Not Started]
Follow-ups: T003, T004, T005 and T006 are tracked elsewhere.
";
    let inference = infer_with_report(sample);
    assert_eq!(inference.detected_ids.len(), 6);
    assert_eq!(inference.recovered_ids, vec!["T001", "T002"]);
    assert!(inference.match_rate < ACCEPT_MATCH_RATE);
    assert_eq!(inference.schema.confidence, LOW_CONFIDENCE);
    assert!(inference.warnings.iter().any(|w| w.contains("2 of 6")));
}

#[test]
fn test_revalidate_low_recovery_sets_confidence_without_error() {
    let schema = infer(full_sample());
    assert_eq!(schema.confidence, 1.0);

    let drifted = "\
1) T001 Add login route
   Dev Status: [Complete]
2) T002 Add logout route
- [ ] - **T003: Session cache**
  - [ ] - Dev Status: [In Progress]
";
    let inference = revalidate(&schema, drifted).unwrap();
    assert_eq!(inference.detected_ids, vec!["T001", "T002", "T003"]);
    assert_eq!(inference.recovered_ids, vec!["T003"]);
    assert_eq!(inference.schema.confidence, LOW_CONFIDENCE);
    assert!(inference.schema.match_rate.is_some_and(|r| r < ACCEPT_MATCH_RATE));
}

#[test]
fn test_revalidate_rejects_invalid_schema() {
    let mut schema = crate::schema::Schema::builtin_default();
    schema.version = None;
    assert!(revalidate(&schema, full_sample()).is_err());
}

#[test]
fn test_only_leading_lines_are_sampled() {
    let mut text = String::from(
        "- [ ] T001: One\n  - [ ] Dev Status: [Not Started]\n- [ ] T002: Two\n",
    );
    for _ in 0..MAX_SAMPLE_LINES {
        text.push_str("filler\n");
    }
    text.push_str("- [ ] T999: Far away\n");

    let inference = infer_with_report(&text);
    assert_eq!(inference.detected_ids, vec!["T001", "T002"]);
    assert_eq!(inference.schema.confidence, 1.0);
}

#[test]
fn test_sample_without_ids_is_low_confidence() {
    let sample = "- [ ] write docs\n- [ ] fix build\n- [x] ship\n";
    let inference = infer_with_report(sample);
    assert!(inference.detected_ids.is_empty());
    assert_eq!(inference.schema.confidence, LOW_CONFIDENCE);
    assert!(inference.schema.compile().is_ok());
}
