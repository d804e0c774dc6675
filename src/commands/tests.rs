//! Tests for command implementations.
//!
//! Commands resolve the project from the working directory, so every test
//! switches into its temp project with `DirGuard` and runs `#[serial]`.

use super::*;
use crate::cli::{
    GateCompleteArgs, GateEditArgs, GateStartArgs, InitArgs, ReworkArgs, SchemaValidateArgs,
    ScopeIdsArgs, SetStatusArgs, StatusArgs,
};
use crate::exit_codes;
use crate::schema::Schema;
use crate::scope_record::ActiveScope;
use crate::test_support::{DirGuard, SAMPLE_CHECKLIST, create_test_project};
use serial_test::serial;
use tempfile::TempDir;

fn ids(values: &[&str]) -> ScopeIdsArgs {
    ScopeIdsArgs {
        ids: values.iter().map(|v| v.to_string()).collect(),
        actor: Some("dev".to_string()),
    }
}

fn read_tasks(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("tasks.md")).unwrap()
}

fn read_scope(dir: &TempDir) -> ActiveScope {
    ActiveScope::load(dir.path().join(".taskgate").join("active_scope.json")).unwrap()
}

fn set_status(id: &str, field: &str, state: &str, reason: Option<&str>) -> Result<()> {
    set_status::cmd_set_status(SetStatusArgs {
        task_id: id.to_string(),
        field: field.to_string(),
        state: state.to_string(),
        reason: reason.map(str::to_string),
        uncheck: false,
    })
}

#[test]
#[serial]
fn test_init_infers_schema_from_existing_checklist() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("tasks.md"), SAMPLE_CHECKLIST).unwrap();
    let _guard = DirGuard::new(temp_dir.path());

    init::cmd_init(InitArgs {
        task_file: "tasks.md".to_string(),
        force: false,
    })
    .unwrap();

    let config = Config::load(temp_dir.path().join(".taskgate").join("config.yaml")).unwrap();
    let schema = config.schema().unwrap().expect("schema should be inferred");
    assert_eq!(schema.format_type, "markdown-checklist");
    assert_eq!(schema.confidence, 1.0);
}

#[test]
#[serial]
fn test_init_is_idempotent_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let _guard = DirGuard::new(temp_dir.path());

    let args = || InitArgs {
        task_file: "TODO.md".to_string(),
        force: false,
    };
    init::cmd_init(args()).unwrap();
    let config_path = temp_dir.path().join(".taskgate").join("config.yaml");
    let first = std::fs::read_to_string(&config_path).unwrap();

    init::cmd_init(InitArgs {
        task_file: "OTHER.md".to_string(),
        force: false,
    })
    .unwrap();
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), first);

    let config = Config::load(&config_path).unwrap();
    assert_eq!(config.task_file, "TODO.md");
    assert!(config.schema.is_none());
}

#[test]
#[serial]
fn test_commands_require_init() {
    let temp_dir = TempDir::new().unwrap();
    let _guard = DirGuard::new(temp_dir.path());

    let err = status::cmd_status(StatusArgs { json: false }).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert!(err.to_string().contains("taskgate init"));
}

#[test]
#[serial]
fn test_status_runs() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());
    status::cmd_status(StatusArgs { json: false }).unwrap();
    status::cmd_status(StatusArgs { json: true }).unwrap();
}

#[test]
#[serial]
fn test_scope_set_add_remove_clear() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    scope::cmd_scope_set(ids(&["t001"])).unwrap();
    let recorded = read_scope(&temp_dir);
    assert_eq!(recorded.task_ids, vec!["T001"]);
    assert_eq!(recorded.declared_by.as_deref(), Some("dev"));

    scope::cmd_scope_add(ids(&["T002", "T001"])).unwrap();
    assert_eq!(read_scope(&temp_dir).task_ids, vec!["T001", "T002"]);

    scope::cmd_scope_remove(ids(&["T001"])).unwrap();
    assert_eq!(read_scope(&temp_dir).task_ids, vec!["T002"]);

    scope::cmd_scope_clear().unwrap();
    assert!(read_scope(&temp_dir).is_empty());
}

#[test]
#[serial]
fn test_scope_set_rejects_unknown_ids() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    let err = scope::cmd_scope_set(ids(&["T001", "T999"])).unwrap_err();
    assert!(err.to_string().contains("T999"));
    assert!(read_scope(&temp_dir).is_empty());
}

#[test]
#[serial]
fn test_gate_start_blocks_with_blocked_exit_code() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    let err = gate::cmd_gate_start(GateStartArgs {
        task: Some("T002".to_string()),
        prompt: None,
    })
    .unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::BLOCKED);
    assert!(err.to_string().contains("T001"));

    gate::cmd_gate_start(GateStartArgs {
        task: None,
        prompt: Some("keep going on the login route".to_string()),
    })
    .unwrap();
}

#[test]
#[serial]
fn test_gate_edit_uses_active_scope() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    let edit = || GateEditArgs {
        path: "src/auth.rs".to_string(),
    };
    assert!(gate::cmd_gate_edit(edit()).is_err());
    gate::cmd_gate_edit(GateEditArgs {
        path: "README.md".to_string(),
    })
    .unwrap();

    scope::cmd_scope_set(ids(&["T001"])).unwrap();
    gate::cmd_gate_edit(edit()).unwrap();
}

#[test]
#[serial]
fn test_gate_complete_reads_report_file() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());
    scope::cmd_scope_set(ids(&["T001"])).unwrap();

    let report = temp_dir.path().join("report.md");
    std::fs::write(&report, "## QA\nSTATUS: PASS\n").unwrap();
    let complete = || GateCompleteArgs {
        report: Some(report.clone()),
    };

    let err = gate::cmd_gate_complete(complete()).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::BLOCKED);
    assert!(err.to_string().contains("value not updated and checkbox not checked"));

    set_status("T001", "qa", "verified_success", None).unwrap();
    gate::cmd_gate_complete(complete()).unwrap();
}

#[test]
#[serial]
fn test_set_status_writes_canonical_value_and_checkbox() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    set_status("T001", "dev", "complete", None).unwrap();
    set_status("T001", "QA", "verified_failure", Some("redirect loops")).unwrap();

    let text = read_tasks(&temp_dir);
    assert!(text.contains("  - [x] - Dev Status: [Complete]\n"));
    assert!(text.contains("  - [x] - QA Status: [Failed - redirect loops]\n"));
    // Untouched lines are byte-identical.
    assert!(text.contains("- [ ] - **T002: Password reset email**\n"));
}

#[test]
#[serial]
fn test_set_status_rejects_bad_state() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    let err = set_status("T001", "dev", "shipped", None).unwrap_err();
    assert!(err.to_string().contains("unknown state"));
    let err = set_status("T404", "dev", "complete", None).unwrap_err();
    assert!(err.to_string().contains("T404"));
    assert_eq!(read_tasks(&temp_dir), SAMPLE_CHECKLIST);
}

#[test]
#[serial]
fn test_rework_after_failed_verification() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    set_status("T001", "dev", "complete", None).unwrap();
    set_status("T001", "qa", "verified_failure", Some("flaky")).unwrap();

    // The recorded failure keeps the slot occupied.
    assert!(
        gate::cmd_gate_start(GateStartArgs {
            task: Some("T002".to_string()),
            prompt: None,
        })
        .is_err()
    );

    set_status::cmd_rework(ReworkArgs {
        task_id: "T001".to_string(),
    })
    .unwrap();
    let text = read_tasks(&temp_dir);
    assert!(text.contains("  - [ ] - Dev Status: [In Progress]\n"));
    assert!(text.contains("  - [ ] - QA Status: [Not Started]\n"));

    let err = set_status::cmd_rework(ReworkArgs {
        task_id: "T001".to_string(),
    })
    .unwrap_err();
    assert!(err.to_string().contains("cannot be reworked"));
}

#[test]
#[serial]
fn test_schema_validate_refreshes_confidence() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    let config_path = temp_dir.path().join(".taskgate").join("config.yaml");
    let mut config = Config::default();
    config.set_schema(&Schema::builtin_default()).unwrap();
    config.save(&config_path).unwrap();

    schema::cmd_schema_validate(SchemaValidateArgs { write: true }).unwrap();
    let stored = Config::load(&config_path)
        .unwrap()
        .schema()
        .unwrap()
        .unwrap();
    assert_eq!(stored.match_rate, Some(1.0));
    assert!(stored.last_validated.is_some());
}

#[test]
#[serial]
fn test_schema_validate_invalid_schema_exit_code() {
    let temp_dir = create_test_project(SAMPLE_CHECKLIST);
    let _guard = DirGuard::new(temp_dir.path());

    let mut broken = Schema::builtin_default();
    broken.version = Some("0.1".to_string());
    let mut config = Config::default();
    config.set_schema(&broken).unwrap();
    config
        .save(temp_dir.path().join(".taskgate").join("config.yaml"))
        .unwrap();

    let err = schema::cmd_schema_validate(SchemaValidateArgs { write: false }).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::SCHEMA_INVALID);

    // The gating path still works on the built-in default.
    scope::cmd_scope_set(ids(&["T001"])).unwrap();
}
