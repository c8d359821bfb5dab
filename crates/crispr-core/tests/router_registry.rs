mod common;

use common::{Auto, TestCtx};
use crispr_core::{PipelineRunner, Router};

#[test]
fn register_replaces_previous_sequence() {
    let mut router = Router::<TestCtx>::new();
    router.register("Knockout", vec![Auto::done("Old")]);
    let old_hash = router.get("knockout").expect("old").definition_hash().to_string();
    router.register("KNOCKOUT", vec![Auto::cont("New1"), Auto::done("New2")]);

    assert_eq!(router.len(), 1);
    let seq = router.get("knockout").expect("new");
    assert_eq!(seq.step_names(), vec!["New1", "New2"]);
    assert_ne!(seq.definition_hash(), old_hash);
}

#[test]
fn modalities_are_sorted_lowercase() {
    let router = Router::<TestCtx>::builder().sequence("Troubleshoot", vec![])
                                             .sequence("base_editing", vec![])
                                             .sequence("Knockout", vec![])
                                             .into_router();
    assert_eq!(router.modalities(), vec!["base_editing", "knockout", "troubleshoot"]);
    assert!(router.contains("TROUBLESHOOT"));
    assert!(!router.contains("delivery"));
}

#[test]
fn same_definition_hashes_the_same() {
    let a = Router::<TestCtx>::builder().sequence("demo", vec![Auto::cont("A"), Auto::done("B")]).into_router();
    let b = Router::<TestCtx>::builder().sequence("demo", vec![Auto::cont("A"), Auto::done("B")]).into_router();
    let ha = a.get("demo").expect("a").definition_hash().to_string();
    let hb = b.get("demo").expect("b").definition_hash().to_string();
    assert_eq!(ha, hb);
    assert_eq!(ha.len(), 64);
}

#[test]
fn router_is_shared_between_runners() {
    let router = Router::<TestCtx>::builder().sequence("demo", vec![Auto::done("Only")]).build();
    let mut first = PipelineRunner::new(router.clone());
    let mut second = PipelineRunner::new(router);
    let mut c1 = TestCtx::default();
    let mut c2 = TestCtx::default();

    first.start("demo", &mut c1).expect("first");
    assert!(first.is_done());
    assert_eq!(second.cursor(), 0);
    second.start("demo", &mut c2).expect("second");
    assert_ne!(first.run_id(), second.run_id());
    assert_eq!(first.events().len(), second.events().len());
}
