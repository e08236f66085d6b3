use expb_cli::check::{Severity, check_project};
use expb_export::Project;
use expb_ingest::read_csv_dataset;
use expb_schema::SchemaRegistry;
use serde_json::json;
use tempfile::TempDir;

fn project(config: serde_json::Value) -> Project {
    serde_json::from_value(json!({
        "name": "study",
        "trials": [
            {
                "id": "t1",
                "components": [
                    {"id": "img", "type": "image-keyboard-response",
                     "x": 0, "y": 0, "width": 100, "height": 100, "config": config}
                ],
                "branches": [
                    {"response": "f", "action": {"kind": "skip-to", "target": "t2"}}
                ]
            },
            {"id": "t2"}
        ],
        "order_columns": ["position"]
    }))
    .unwrap()
}

fn write_csv(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("participants.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn clean_project_has_no_issues() {
    let dir = TempDir::new().unwrap();
    let data = read_csv_dataset(&write_csv(
        &dir,
        "image,duration,position\nface1.png,1000,1\nface2.png,1500,2\n",
    ))
    .unwrap();
    let project = project(json!({
        "stimulus": {"source": "csv", "value": "image"},
        "trial_duration": {"source": "csv", "value": "duration"},
        "prompt": {"source": "typed", "value": "Press F or J"}
    }));

    let report = check_project(&project, &SchemaRegistry::builtin(), Some(&data), true);
    assert!(report.is_clean(), "{:?}", report.issues);
}

#[test]
fn binding_problems_are_reported() {
    let dir = TempDir::new().unwrap();
    let data = read_csv_dataset(&write_csv(
        &dir,
        "image,duration,position\nface1.png,fast,1\nface2.png,1500,x\n",
    ))
    .unwrap();
    let project = project(json!({
        "stimulus": {"source": "csv", "value": "picture"},
        "trial_duration": {"source": "csv", "value": "duration"},
        "prompt": {"source": "typed", "value": 42},
        "volume": {"source": "typed", "value": 1}
    }));

    let report = check_project(&project, &SchemaRegistry::builtin(), Some(&data), true);
    let errors: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| i.key.as_deref().unwrap_or("-"))
        .collect();
    assert_eq!(errors, vec!["prompt", "stimulus", "volume"]);
    assert_eq!(report.warning_count(), 2);
    assert!(report.has_errors());
    // Errors sort ahead of warnings.
    assert_eq!(report.issues[0].severity, Severity::Error);
}

#[test]
fn lenient_check_downgrades_type_mismatch() {
    let project = project(json!({"prompt": 42}));
    let report = check_project(&project, &SchemaRegistry::builtin(), None, false);
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn bad_branch_targets_are_errors() {
    let mut project = project(json!({}));
    project.trials[1].branches = serde_json::from_value(json!([
        {"response": 1, "action": {"kind": "skip-to", "target": "t1"}},
        {"response": 2, "action": {"kind": "jump-to", "target": "t1"}},
        {"response": 3, "action": {"kind": "jump-to", "target": "nowhere"}}
    ]))
    .unwrap();
    let report = check_project(&project, &SchemaRegistry::builtin(), None, true);
    assert_eq!(report.error_count(), 2);
    assert!(report.issues.iter().all(|i| i.trial.as_ref().map(|t| t.as_str()) == Some("t2")));
}

#[test]
fn missing_order_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    let data = read_csv_dataset(&write_csv(&dir, "image\nface1.png\n")).unwrap();
    let report = check_project(&project(json!({})), &SchemaRegistry::builtin(), Some(&data), true);
    assert_eq!(report.error_count(), 1);
    assert!(report.issues[0].message.contains("position"));
}
