//! End-to-end materialize and run against in-memory adapters.

use std::path::Path;
use std::time::Duration;

use contextcore_demo::adapters::memory::ScriptedWorkflow;
use contextcore_demo::context::ServiceContext;
use contextcore_demo::materialize::{CreateOptions, Materializer};
use contextcore_demo::ports::WorkflowError;
use contextcore_demo::runner::{RunOptions, Runner, TaskOutcome};
use contextcore_demo::store::{TaskStatus, TaskStore};

fn options(phases: &[u8]) -> RunOptions {
    RunOptions {
        phases: phases.to_vec(),
        dry_run: false,
        max_iterations: 2,
        confirm: false,
        concept_mode: false,
        lead_agent: "lead".into(),
        drafter_agent: "drafter".into(),
        timeout: None,
    }
}

#[tokio::test]
async fn failed_task_is_blocked_then_retried() {
    let state = Path::new("/state/ecosystem-demo");
    let mut ctx = ServiceContext::in_memory();
    ctx.workflow = Box::new(
        ScriptedWorkflow::new().failing("DEMO-P2-HISTORY", WorkflowError::Failed("boom".into())),
    );

    Materializer::new(&ctx, state)
        .create(&CreateOptions { phases: vec![2], ..CreateOptions::default() })
        .unwrap();

    let summary = Runner::new(&ctx, state).run(&options(&[2])).await.unwrap();
    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.success());

    let store = TaskStore::new(&ctx, state);
    let history = store.load("DEMO-P2-HISTORY").unwrap().unwrap();
    assert_eq!(history.status, TaskStatus::Blocked);
    assert!(history.status_description.unwrap().contains("boom"));
    assert_eq!(store.load("DEMO-P0-EPIC").unwrap().unwrap().status, TaskStatus::Done);

    ctx.workflow = Box::new(ScriptedWorkflow::new());
    let retry = Runner::new(&ctx, state).run(&options(&[2])).await.unwrap();
    assert!(retry.success());
    let outcomes: Vec<_> = retry.results.iter().map(|r| (r.task_id.as_str(), r.outcome)).collect();
    assert!(outcomes.contains(&("DEMO-P2-HISTORY", TaskOutcome::Succeeded)));
    assert!(outcomes.iter().any(|(_, o)| *o == TaskOutcome::Skipped));
}

#[tokio::test]
async fn timeout_is_reported_per_task() {
    let state = Path::new("/state/ecosystem-demo");
    let mut ctx = ServiceContext::in_memory();
    ctx.workflow = Box::new(ScriptedWorkflow::new().failing(
        "CONCEPT-P1-CONTEXT",
        WorkflowError::Timeout(Duration::from_secs(5)),
    ));

    Materializer::new(&ctx, state)
        .create(&CreateOptions { concept_mode: true, ..CreateOptions::default() })
        .unwrap();
    let summary = Runner::new(&ctx, state)
        .run(&RunOptions { concept_mode: true, ..options(&[]) })
        .await
        .unwrap();

    assert_eq!(summary.results.len(), 6);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.succeeded(), 5);
}
