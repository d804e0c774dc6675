//! Tests for the workflow gates.

use super::*;
use crate::config::{Config, GateConfig};
use crate::parser::{Task, parse};
use crate::schema::{self, CompiledSchema};
use crate::scope_record::ActiveScope;

fn checklist(entries: &[(&str, &str, &str)]) -> String {
    let mut text = String::from("# Tasks\n\n");
    for (id, dev, qa) in entries {
        text.push_str(&format!("- [ ] - **{}: Work item {}**\n", id, id));
        text.push_str(&format!("  - [ ] - Dev Status: [{}]\n", dev));
        text.push_str(&format!("  - [ ] - QA Status: [{}]\n", qa));
    }
    text
}

fn tasks_of(text: &str) -> (Vec<Task>, CompiledSchema) {
    let compiled = schema::builtin();
    (parse(text, &compiled), compiled)
}

fn scope(ids: &[&str]) -> ActiveScope {
    let mut scope = ActiveScope::default();
    let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
    scope.declare(&ids, Some("dev"));
    scope
}

// ---------------------------------------------------------------------------
// Pre-work gate
// ---------------------------------------------------------------------------

#[test]
fn test_prework_blocks_when_other_task_in_progress() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "In Progress", "Not Started"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let gates = GateConfig::default();

    let decision = check_prework_request(Target::Id("T002"), &tasks, &gates);
    let reason = decision.block_reason().expect("should block");
    assert_eq!(reason.gate, GateKind::PreWork);
    assert_eq!(reason.task_ids, vec!["T001"]);
    assert!(matches!(
        &reason.kind,
        BlockKind::SlotOccupied { in_progress, unverified }
            if in_progress == &vec!["T001".to_string()] && unverified.is_empty()
    ));
    assert!(reason.directive.contains("T001"));
    assert!(reason.directive.contains("line 3"));
}

#[test]
fn test_prework_allows_resuming_in_progress_target() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "In Progress", "Not Started"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let decision = check_prework_request(Target::Id("t001"), &tasks, &GateConfig::default());
    assert!(decision.is_allowed());
}

#[test]
fn test_prework_allows_when_slot_free() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "Complete", "Passed"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let gates = GateConfig::default();
    assert!(check_prework_request(Target::Id("T002"), &tasks, &gates).is_allowed());
    assert!(check_prework_request(Target::Unspecified, &tasks, &gates).is_allowed());
}

#[test]
fn test_prework_blocks_unverified_target() {
    let (tasks, _) = tasks_of(&checklist(&[("T001", "Complete", "Not Started")]));
    let decision = check_prework_request(Target::Id("T001"), &tasks, &GateConfig::default());
    let reason = decision.block_reason().expect("should block");
    assert_eq!(reason.kind, BlockKind::TargetNeedsVerification);
    assert!(reason.directive.contains("line 5"));
}

#[test]
fn test_prework_blocks_new_work_while_completed_task_unverified() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "Complete", "Not Started"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let decision = check_prework_request(Target::Id("T002"), &tasks, &GateConfig::default());
    let reason = decision.block_reason().expect("should block");
    assert!(matches!(
        &reason.kind,
        BlockKind::SlotOccupied { unverified, .. } if unverified == &vec!["T001".to_string()]
    ));
}

#[test]
fn test_recorded_failure_occupies_slot() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "Complete", "Failed - missing redirect"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let gates = GateConfig::default();

    let decision = check_prework_request(Target::Id("T002"), &tasks, &gates);
    let reason = decision.block_reason().expect("should block");
    assert_eq!(reason.task_ids, vec!["T001"]);
    assert!(reason.directive.contains("verification failed: missing redirect"));

    // The failed task itself is routed to rework first.
    let decision = check_prework_request(Target::Id("T001"), &tasks, &gates);
    let reason = decision.block_reason().expect("should block");
    assert_eq!(
        reason.kind,
        BlockKind::TargetNeedsRework {
            reason: Some("missing redirect".to_string())
        }
    );
    assert!(reason.directive.contains("taskgate rework T001"));
    assert!(reason.directive.contains("line 5"));
}

#[test]
fn test_reworked_task_can_be_resumed() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "In Progress", "Not Started"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let gates = GateConfig::default();
    assert!(check_prework_request(Target::Id("T001"), &tasks, &gates).is_allowed());
    assert!(!check_prework_request(Target::Id("T002"), &tasks, &gates).is_allowed());
}

#[test]
fn test_prework_unspecified_target_blocks_on_any_occupant() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "Not Started", "Not Started"),
        ("T002", "In Progress", "Not Started"),
    ]));
    let decision = check_prework_request(Target::Unspecified, &tasks, &GateConfig::default());
    assert_eq!(decision.block_reason().unwrap().task_ids, vec!["T002"]);
}

#[test]
fn test_prework_unknown_explicit_id_blocks() {
    let (tasks, _) = tasks_of(&checklist(&[("T001", "Not Started", "Not Started")]));
    let decision = check_prework_request(Target::Id("T042"), &tasks, &GateConfig::default());
    let reason = decision.block_reason().unwrap();
    assert_eq!(
        reason.kind,
        BlockKind::UnknownTask {
            id: "T042".to_string()
        }
    );
}

#[test]
fn test_prework_prompt_resolves_through_matcher() {
    let (tasks, _) = tasks_of(&checklist(&[
        ("T001", "In Progress", "Not Started"),
        ("T002", "Not Started", "Not Started"),
    ]));
    let gates = GateConfig::default();
    assert!(check_prework_request(Target::Prompt("continue T001"), &tasks, &gates).is_allowed());
    assert!(!check_prework_request(Target::Prompt("start T002"), &tasks, &gates).is_allowed());
    // Unmatched prompts fall back to the whole-set policy.
    assert!(!check_prework_request(Target::Prompt("refactor billing"), &tasks, &gates).is_allowed());
}

#[test]
fn test_prework_respects_configured_verification_field() {
    let text = "\
- [ ] - T001: Login
  - [x] - Dev Status: [Complete]
  - [x] - QA Status: [Passed]
  - [ ] - User Verification: [Pending]
- [ ] - T002: Logout
  - [ ] - Dev Status: [Not Started]
";
    let (tasks, _) = tasks_of(text);
    let gates = GateConfig {
        verification_field: crate::schema::FieldKey::UserVerification,
        ..GateConfig::default()
    };
    let decision = check_prework_request(Target::Id("T002"), &tasks, &gates);
    assert_eq!(decision.block_reason().unwrap().task_ids, vec!["T001"]);
}

// ---------------------------------------------------------------------------
// Scope gate
// ---------------------------------------------------------------------------

#[test]
fn test_scope_blocks_source_edit_without_scope() {
    let config = Config::default();
    let decision = check_edit("src/main.rs", &ActiveScope::default(), &config);
    let reason = decision.block_reason().expect("should block");
    assert_eq!(reason.gate, GateKind::Scope);
    assert_eq!(
        reason.kind,
        BlockKind::NoActiveScope {
            path: "src/main.rs".to_string()
        }
    );
    assert!(reason.directive.contains("taskgate scope set <TASK-ID>"));
}

#[test]
fn test_scope_allows_with_active_scope() {
    let config = Config::default();
    assert!(check_edit("src/main.rs", &scope(&["T001"]), &config).is_allowed());
}

#[test]
fn test_scope_exempt_paths() {
    let config = Config::default();
    let empty = ActiveScope::default();
    for path in [
        "README.md",
        "docs/guide/intro.rs",
        "Cargo.toml",
        "config/app.yaml",
        ".env.local",
        ".taskgate/active_scope.json",
        "./notes.txt",
        "tasks.md",
    ] {
        assert!(check_edit(path, &empty, &config).is_allowed(), "{} should be exempt", path);
    }
}

#[test]
fn test_scope_task_file_exempt_even_without_globs() {
    let mut config = Config::default();
    config.task_file = "plan/TODO.org".to_string();
    config.gates.exempt_globs.clear();
    let empty = ActiveScope::default();
    assert!(check_edit("plan/TODO.org", &empty, &config).is_allowed());
    assert!(check_edit("plan\\TODO.org", &empty, &config).is_allowed());
    assert!(!check_edit("README.md", &empty, &config).is_allowed());
}

#[test]
fn test_scope_resolves_parent_segments_before_matching() {
    let config = Config::default();
    let empty = ActiveScope::default();

    let decision = check_edit("docs/../src/main.rs", &empty, &config);
    let reason = decision.block_reason().expect("should block");
    assert_eq!(
        reason.kind,
        BlockKind::NoActiveScope {
            path: "src/main.rs".to_string()
        }
    );
    assert!(!check_edit("docs\\..\\src\\main.rs", &empty, &config).is_allowed());
    assert!(check_edit("src/../docs/guide.rs", &empty, &config).is_allowed());
}

#[test]
fn test_scope_paths_outside_root_are_never_exempt() {
    let config = Config::default();
    let empty = ActiveScope::default();
    for path in ["../other/README.md", "docs/../../notes.md", "/etc/app.yaml"] {
        assert!(!check_edit(path, &empty, &config).is_allowed(), "{} should block", path);
    }
    assert!(check_edit("../other/README.md", &scope(&["T001"]), &config).is_allowed());
}

// ---------------------------------------------------------------------------
// Completion gate
// ---------------------------------------------------------------------------

fn single_task(qa_box: &str, qa_value: &str) -> String {
    format!(
        "- [ ] - **T001: Add login route**\n  - [x] - Dev Status: [Complete]\n  - [{}] - QA Status: [{}]\n",
        qa_box, qa_value
    )
}

fn completion(text: &str, report: &str) -> GateDecision {
    let (tasks, compiled) = tasks_of(text);
    check_completion(report, &scope(&["T001"]), &tasks, &compiled, &GateConfig::default())
}

fn only_issue(decision: &GateDecision) -> RecordIssue {
    match &decision.block_reason().expect("should block").kind {
        BlockKind::Completion { problems } => {
            assert_eq!(problems.len(), 1);
            problems[0].issue.clone()
        }
        other => panic!("unexpected block kind {:?}", other),
    }
}

#[test]
fn test_completion_pass_with_unchecked_box_blocks() {
    let decision = completion(&single_task(" ", "Passed"), "All good.\nSTATUS: PASS\n");
    assert_eq!(only_issue(&decision), RecordIssue::ValueOnly);
    let directive = &decision.block_reason().unwrap().directive;
    assert!(directive.contains("checkbox is not checked"));
    assert!(directive.contains("line 3"));
}

#[test]
fn test_completion_pass_with_stale_value_blocks() {
    let decision = completion(&single_task("x", "Not Started"), "STATUS: PASS");
    assert_eq!(
        only_issue(&decision),
        RecordIssue::CheckboxOnly {
            expected: "Passed".to_string()
        }
    );
    let directive = &decision.block_reason().unwrap().directive;
    assert!(directive.contains("value was not updated"));
    assert!(!directive.contains("checkbox is not checked"));
}

#[test]
fn test_completion_pass_nothing_recorded_blocks() {
    let decision = completion(&single_task(" ", "Not Started"), "Verdict: passed");
    assert_eq!(
        only_issue(&decision),
        RecordIssue::NeitherUpdated {
            expected: "Passed".to_string()
        }
    );
}

#[test]
fn test_completion_pass_recorded_allows() {
    let decision = completion(&single_task("x", "passed"), "STATUS: PASS");
    assert!(decision.is_allowed());
}

#[test]
fn test_completion_contradiction_blocks() {
    let decision = completion(&single_task("x", "Passed"), "STATUS: FAIL\n2 tests failed");
    assert!(matches!(
        only_issue(&decision),
        RecordIssue::ContradictsVerdict {
            verdict: Verdict::Fail,
            ..
        }
    ));
}

#[test]
fn test_completion_fail_expected_value_includes_reason_shape() {
    let decision = completion(&single_task(" ", "Not Started"), "STATUS: FAIL");
    assert_eq!(
        only_issue(&decision),
        RecordIssue::NeitherUpdated {
            expected: "Failed - <reason>".to_string()
        }
    );
}

#[test]
fn test_completion_recorded_failure_routes_to_implementer() {
    let decision = completion(
        &single_task("x", "Failed - login redirect broken"),
        "STATUS: FAIL",
    );
    assert_eq!(
        only_issue(&decision),
        RecordIssue::RecordedFailure {
            reason: Some("login redirect broken".to_string())
        }
    );
    let directive = &decision.block_reason().unwrap().directive;
    assert!(directive.contains("re-invoke the dev role"));
    assert!(directive.contains("taskgate rework T001"));
}

#[test]
fn test_completion_empty_scope_allows() {
    let (tasks, compiled) = tasks_of(&single_task(" ", "Not Started"));
    let decision = check_completion(
        "STATUS: PASS",
        &ActiveScope::default(),
        &tasks,
        &compiled,
        &GateConfig::default(),
    );
    assert!(decision.is_allowed());
}

#[test]
fn test_completion_unknown_scoped_task_blocks() {
    let (tasks, compiled) = tasks_of(&single_task("x", "Passed"));
    let decision = check_completion(
        "STATUS: PASS",
        &scope(&["T001", "T404"]),
        &tasks,
        &compiled,
        &GateConfig::default(),
    );
    let reason = decision.block_reason().unwrap();
    assert_eq!(reason.task_ids, vec!["T404"]);
    assert!(reason.directive.contains("taskgate scope remove T404"));
}

#[test]
fn test_extract_verdict() {
    assert_eq!(extract_verdict("STATUS: PASS", None), Verdict::Pass);
    assert_eq!(extract_verdict("**Result:** FAILED", None), Verdict::Fail);
    assert_eq!(extract_verdict("Result: **FAILED**", None), Verdict::Fail);
    assert_eq!(extract_verdict("verdict = pass", None), Verdict::Pass);
    assert_eq!(
        extract_verdict("STATUS: PASS\nSTATUS: FAIL", None),
        Verdict::Fail
    );
    assert_eq!(extract_verdict("Everything works, no errors.", None), Verdict::Pass);
    assert_eq!(extract_verdict("The build is broken.", None), Verdict::Fail);
}

#[test]
fn test_extract_verdict_prefers_lines_naming_task() {
    let report = "T001 STATUS: PASS\nT002 STATUS: FAIL\n";
    assert_eq!(extract_verdict(report, Some("T001")), Verdict::Pass);
    assert_eq!(extract_verdict(report, Some("T002")), Verdict::Fail);
    assert_eq!(extract_verdict(report, None), Verdict::Fail);
}

#[test]
fn test_block_reason_serializes_flat() {
    let decision = completion(&single_task(" ", "Passed"), "STATUS: PASS");
    let json = serde_json::to_value(decision.block_reason().unwrap()).unwrap();
    assert_eq!(json["gate"], "completion");
    assert_eq!(json["kind"], "completion");
    assert_eq!(json["problems"][0]["issue"], "value_only");
    assert_eq!(json["problems"][0]["field"], "qa");
}
