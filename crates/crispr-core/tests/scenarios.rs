mod common;

use common::{Auto, Input, TestCtx};
use crispr_core::{OutcomeKind, PipelineRunner, Router, RunnerError, RunnerStatus};

#[test]
fn input_step_pauses_then_runs_to_the_end() {
    let router = Router::<TestCtx>::builder().sequence("demo",
                                                       vec![Auto::cont("AutoX"),
                                                            Input::new("InputY", "Which gene?"),
                                                            Auto::done("AutoZ")])
                                             .build();
    let mut runner = PipelineRunner::new(router);
    let mut ctx = TestCtx::default();

    let out = runner.start("demo", &mut ctx).expect("start");
    assert_eq!(out.kind, OutcomeKind::WaitForInput);
    assert_eq!(out.message, "Which gene?");
    // AutoX ya corrió; InputY todavía no.
    assert_eq!(ctx.trail, vec!["AutoX"]);
    assert_eq!(runner.status(), RunnerStatus::WaitingForInput);
    assert_eq!(runner.cursor(), 1);
    assert_eq!(runner.current_step().map(|s| s.name()), Some("InputY"));

    let out = runner.submit_input(&mut ctx, "foo").expect("submit");
    assert_eq!(out.kind, OutcomeKind::Done);
    assert_eq!(out.message, "AutoZ ran");
    assert!(runner.is_done());
    assert_eq!(ctx.trail, vec!["AutoX", "InputY", "AutoZ"]);
    assert_eq!(ctx.inputs, vec![("InputY".to_string(), "foo".to_string())]);
}

#[test]
fn branch_lands_on_the_target_sequence() {
    let router = Router::<TestCtx>::builder().sequence("main", vec![Auto::branch("BranchStep", "alt")])
                                             .sequence("alt", vec![Auto::done("Terminal")])
                                             .build();
    let mut runner = PipelineRunner::new(router);
    let mut ctx = TestCtx::default();

    let out = runner.start("main", &mut ctx).expect("start");
    assert!(out.is_done());
    assert!(runner.is_done());
    assert_eq!(runner.active_sequence_name(), "alt");
    assert_eq!(ctx.workflow, "alt");
    assert_eq!(ctx.trail, vec!["BranchStep", "Terminal"]);
}

#[test]
fn unknown_workflow_lists_registered_names() {
    let router = Router::<TestCtx>::builder().sequence("knockout", vec![])
                                             .sequence("base_editing", vec![])
                                             .build();

    let err = router.get("missing").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("base_editing, knockout"), "got: {msg}");

    let mut runner = PipelineRunner::new(router);
    let mut ctx = TestCtx::default();
    let err = runner.start("missing", &mut ctx).unwrap_err();
    assert!(matches!(err, RunnerError::UnknownWorkflow { .. }));
    assert_eq!(runner.status(), RunnerStatus::Idle);
    assert_eq!(ctx.workflow, "");
}

#[test]
fn step_outcome_data_reaches_the_host() {
    let router = Router::<TestCtx>::builder().sequence("demo", vec![Auto::done("Only")]).build();
    let mut runner = PipelineRunner::new(router);
    let mut ctx = TestCtx::default();

    let out = runner.start("demo", &mut ctx).expect("start");
    assert_eq!(out.data.get("step").and_then(|v| v.as_str()), Some("Only"));
}

#[test]
fn wait_outcome_from_auto_step_resumes_the_same_step() {
    // Un step automático puede pedir más información devolviendo WaitForInput;
    // el input siguiente vuelve a ejecutar ese mismo step.
    let router = Router::<TestCtx>::builder().sequence("demo", vec![Auto::wait("Ask"), Auto::done("End")])
                                             .build();
    let mut runner = PipelineRunner::new(router);
    let mut ctx = TestCtx::default();

    let out = runner.start("demo", &mut ctx).expect("start");
    assert!(out.is_waiting());
    assert_eq!(runner.cursor(), 0);

    // Ask vuelve a pedir input: el runner sigue esperando en el cursor 0.
    let out = runner.submit_input(&mut ctx, "more").expect("submit");
    assert!(out.is_waiting());
    assert_eq!(runner.cursor(), 0);
    assert_eq!(ctx.inputs, vec![("Ask".to_string(), "more".to_string())]);
}

#[test]
fn trailing_input_step_with_continue_completes() {
    // Una secuencia cuyo último step pide input y termina con Continue se
    // cierra sola; advance sólo es legal en estado Ready, que aquí no se da.
    let router = Router::<TestCtx>::builder().sequence("demo",
                                                       vec![Input::then("Ask", "?", OutcomeKind::Continue)])
                                             .build();
    let mut runner = PipelineRunner::new(router);
    let mut ctx = TestCtx::default();

    runner.start("demo", &mut ctx).expect("start");
    let out = runner.submit_input(&mut ctx, "x").expect("submit");
    assert!(out.is_done());
    assert_eq!(out.message, "Ask got input");
    assert!(runner.is_done());
}
