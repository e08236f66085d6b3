use expb_export::{
    BranchAction, Project, SequenceError, SequenceMode, SequencingController,
};
use expb_model::TrialId;
use serde_json::json;

fn tid(id: &str) -> TrialId {
    TrialId::new(id).unwrap()
}

fn project() -> Project {
    serde_json::from_value(json!({
        "name": "branching",
        "trials": [
            {"id": "intro"},
            {
                "id": "question",
                "branches": [
                    {"response": "skip", "action": {"kind": "skip-to", "target": "outro"}},
                    {"response": "again", "action": {"kind": "jump-to", "target": "intro"}},
                    {"response": "quit", "action": {"kind": "end"}}
                ]
            },
            {"id": "filler"},
            {"id": "outro"}
        ]
    }))
    .unwrap()
}

fn run(responses: &[&str]) -> Vec<String> {
    let project = project();
    let mut controller = SequencingController::new(&project.trials);
    let mut responses = responses.iter();
    let mut visited = Vec::new();
    while let Some(trial) = controller.next() {
        visited.push(trial.to_string());
        if trial.as_str() == "question" {
            let response = responses.next().copied().unwrap_or("continue");
            controller.record_response(&json!(response)).unwrap();
        }
    }
    visited
}

#[test]
fn unmatched_response_runs_in_order() {
    assert_eq!(run(&["continue"]), ["intro", "question", "filler", "outro"]);
}

#[test]
fn skip_response_passes_filler() {
    assert_eq!(run(&["skip"]), ["intro", "question", "outro"]);
}

#[test]
fn jump_response_loops_back() {
    assert_eq!(
        run(&["again", "skip"]),
        ["intro", "question", "intro", "question", "outro"]
    );
}

#[test]
fn end_response_stops_the_sequence() {
    assert_eq!(run(&["quit"]), ["intro", "question"]);
}

#[test]
fn context_reflects_pending_request() {
    let project = project();
    let mut controller = SequencingController::new(&project.trials);
    controller.next();
    controller.next();
    let action = controller.record_response(&json!("skip")).unwrap();
    assert_eq!(action, Some(BranchAction::SkipTo(tid("outro"))));
    assert_eq!(controller.context().mode(), SequenceMode::SkipTo);
    assert_eq!(controller.context().target_id(), Some(&tid("outro")));
    assert!(!controller.context().should_run(&tid("filler")));

    assert_eq!(
        controller.request_jump_to(&tid("missing")),
        Err(SequenceError::UnknownTrial(tid("missing")))
    );
    assert_eq!(controller.next(), Some(tid("outro")));
    assert_eq!(controller.current(), Some(&tid("outro")));
}
