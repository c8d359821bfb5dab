use crisprflow::workflow::manager::{COMPLETION_NOTE, FINISHED_REPLY};
use crisprflow::{build_router, ConversationManager};
use crispr_core::{RunEventKind, RunnerStatus, SessionContext};

fn manager() -> ConversationManager {
    ConversationManager::new(build_router(), "triage")
}

#[test]
fn knockout_conversation_end_to_end() {
    let mut m = manager();

    let greeting = m.greeting().unwrap();
    assert_eq!(greeting.status, RunnerStatus::WaitingForInput);
    assert!(greeting.text.contains("Type a number or workflow name to begin."));

    let reply = m.handle_message("knockout").unwrap();
    assert!(reply.text.starts_with("Starting the **Knockout** workflow."));
    assert!(reply.text.contains("Knockout Target Selection"));
    assert!(reply.events.iter().any(|e| matches!(e.kind, RunEventKind::Branched { ref to, .. } if to == "knockout")));

    let reply = m.handle_message("BRCA1 human").unwrap();
    assert!(reply.text.contains("**Target gene:** BRCA1"));
    assert!(reply.text.contains("Paste candidate spacer sequences"));

    let reply = m.handle_message("GACGTACGTACGTACGTACG GGCCGGCCAATTAATTGGCC").unwrap();
    assert!(reply.text.contains("| 1 |"));
    assert!(reply.text.contains("select a guide by number"));

    // GuideSelection devuelve Done desde un step intermedio: el runner sigue
    // con DeliveryEntry y se detiene en DeliverySelect.
    let reply = m.handle_message("1").unwrap();
    assert_eq!(reply.status, RunnerStatus::WaitingForInput);
    assert!(reply.text.contains("Selected 1 guide(s) for knockout of **BRCA1**."));
    assert!(reply.text.contains("## Delivery Planning"));
    assert!(reply.text.contains("**Target gene:** BRCA1"));
    assert!(reply.text.contains("Cell or tissue context"));

    let reply = m.handle_message("HEK293T cells, in vitro").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("**Recommended delivery method:** lipofection"));
    assert!(reply.text.ends_with(COMPLETION_NOTE));

    let reply = m.handle_message("anything else?").unwrap();
    assert_eq!(reply.text, FINISHED_REPLY);

    let ctx = m.context();
    assert_eq!(ctx.modality, "knockout");
    assert_eq!(ctx.target_gene, "BRCA1");
    assert_eq!(ctx.selected_guide_index, 0);
    assert_eq!(ctx.delivery.method, "lipofection");
    assert_eq!(ctx.chat_history.len(), 6);
}

#[test]
fn first_message_without_greeting_picks_the_workflow() {
    let mut m = manager();
    let reply = m.handle_message("7").unwrap();
    assert!(reply.text.contains("**Troubleshooting Mode**"));

    let reply = m.handle_message("transfection killed most cells, low viability").unwrap();
    assert_eq!(reply.status, RunnerStatus::WaitingForInput);
    assert!(reply.text.contains("**Issue category:** high_toxicity"));
    assert!(reply.text.contains("To help diagnose the issue"));

    let reply = m.handle_message("primary T cells, nucleofection of Cas9 RNP").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("## Diagnosis"));
    assert!(reply.text.contains("**Most likely:** Electroporation settings too harsh for this cell type"));
    assert!(reply.text.contains("## Troubleshooting Plan"));
    assert_eq!(m.context().troubleshoot_recommendations.len(), 3);
}

#[test]
fn troubleshoot_diagnosis_end_to_end() {
    let mut m = manager();
    m.greeting().unwrap();
    m.handle_message("troubleshooting").unwrap();
    m.handle_message("very low editing efficiency").unwrap();

    let reply = m.handle_message("HEK293T, plasmid lipofection, about 5% indels at 72h").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("**Reported efficiency:** 5%"));
    assert!(reply.text.contains("**Most likely:** Plasmid delivery gives delayed and variable Cas9 expression"));
    assert!(reply.text.ends_with(COMPLETION_NOTE));

    let ctx = m.context();
    assert_eq!(ctx.troubleshoot_issue, "low_efficiency");
    assert_eq!(ctx.troubleshoot_recommendations.len(), 4);
    assert!(ctx.extra["troubleshoot_diagnosis"].as_array().is_some_and(|d| !d.is_empty()));
}

#[test]
fn base_editing_conversation_end_to_end() {
    let mut m = manager();
    m.greeting().unwrap();

    let reply = m.handle_message("2").unwrap();
    assert!(reply.text.starts_with("Starting the **Base Editing** workflow."));
    assert!(reply.text.contains("## Base Editing"));
    assert!(reply.text.contains("Which base editor"));

    let reply = m.handle_message("ABE").unwrap();
    assert!(reply.text.contains("Selected base editing system: **ABE**"));
    assert!(reply.text.contains("Describe the edit"));

    let reply = m.handle_message("HBB A>G human").unwrap();
    assert!(reply.text.contains("**Base change:** A>G"));
    assert!(!reply.text.contains("**Warning:**"));
    assert!(reply.text.contains("guide design rules"));

    let reply = m.handle_message("yes").unwrap();
    assert_eq!(reply.status, RunnerStatus::WaitingForInput);
    assert!(reply.text.contains("## Base Editor Guide Design"));
    assert!(reply.text.contains("## Delivery Planning"));
    assert!(reply.text.contains("**CRISPR system:** ABE8e (nCas9)"));

    let reply = m.handle_message("mouse liver, in vivo").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("**Recommended delivery method:** LNP"));
    assert!(reply.text.ends_with(COMPLETION_NOTE));

    let ctx = m.context();
    assert_eq!(ctx.modality, "base_editing");
    assert_eq!(ctx.base_editor, "ABE");
    assert_eq!(ctx.target_base_change, "A>G");
    assert_eq!(ctx.delivery.method, "LNP");
}

#[test]
fn prime_editing_conversation_end_to_end() {
    let mut m = manager();
    let reply = m.handle_message("prime editing").unwrap();
    assert!(reply.text.contains("## Prime Editing"));
    assert!(reply.text.contains("Which prime editing system?"));

    let reply = m.handle_message("pe3").unwrap();
    assert!(reply.text.contains("Selected prime editing system: **PE3**"));
    assert!(reply.text.contains("nicking sgRNA"));

    let reply = m.handle_message("HEXA insert 4 bp, human").unwrap();
    assert!(reply.text.contains("**Edit type:** insertion"));
    assert!(reply.text.contains("pegRNA design recommendations"));

    let reply = m.handle_message("yes").unwrap();
    assert!(reply.text.contains("## pegRNA Design"));
    assert!(reply.text.contains("**Nicking guide (PE3):**"));
    assert!(reply.text.contains("Cell or tissue context"));

    let reply = m.handle_message("HEK293T cells, in vitro").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("**Recommended delivery method:** lipofection"));

    let ctx = m.context();
    assert_eq!(ctx.prime_editor, "PE3");
    assert_eq!(ctx.pegrna_extension, "PBS 13 nt + RT 25 nt");
    assert!(!ctx.nick_guide.is_empty());
}

#[test]
fn activation_conversation_end_to_end() {
    let mut m = manager();
    let reply = m.handle_message("crispra").unwrap();
    assert!(reply.text.starts_with("Starting the **Activation** workflow."));
    assert!(reply.text.contains("Choose an effector system"));

    let reply = m.handle_message("3").unwrap();
    assert!(reply.text.contains("Selected effector: **dCas9-VPR** (activation)"));
    assert!(!reply.text.contains("*Note:"));

    let reply = m.handle_message("MYOD1 human").unwrap();
    assert!(reply.text.contains("**Target region:** -400 to -50 bp upstream of the TSS"));

    let reply = m.handle_message("no").unwrap();
    assert!(reply.text.contains("Skipping guide design."));
    assert!(reply.text.contains("## Delivery Planning"));

    let reply = m.handle_message("iPSC-derived neurons").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("**Recommended delivery method:** electroporation"));

    let ctx = m.context();
    assert_eq!(ctx.modality, "activation");
    assert_eq!(ctx.effector_system, "dCas9-VPR");
    assert_eq!(ctx.cas_system, "dCas9");
}

#[test]
fn repression_conversation_end_to_end() {
    let mut m = manager();
    m.handle_message("5").unwrap();

    // Vacío: efector por defecto de la modalidad.
    let reply = m.handle_message("").unwrap();
    assert!(reply.text.contains("Selected effector: **dCas9-KRAB** (repression)"));

    let reply = m.handle_message("CD274 mouse").unwrap();
    assert!(reply.text.contains("**Target region:** -50 to +300 bp around the TSS"));

    let reply = m.handle_message("yes").unwrap();
    assert!(reply.text.contains("## Guide Placement (repression)"));

    let reply = m.handle_message("pooled screen, stable integration").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("**Recommended delivery method:** lentiviral"));
    assert_eq!(m.context().species, "mouse");
    assert_eq!(m.runner().active_sequence_name(), "repression");
}

#[test]
fn off_target_conversation_end_to_end() {
    let mut m = manager();
    let reply = m.handle_message("6").unwrap();
    assert!(reply.text.contains("## Off-Target Analysis"));
    assert!(reply.text.contains("Paste one or more guide sequences"));

    let reply = m.handle_message("not a guide").unwrap();
    assert_eq!(reply.status, RunnerStatus::WaitingForInput);
    assert!(reply.text.starts_with("No guide sequences found."));

    // Input y scoring corren en el mismo turno; el reporte espera respuesta.
    let reply = m.handle_message("GACGTACGTACGTACGTACG GGGGGCCGCCGGCGCGGCGC\nSpecies: mouse").unwrap();
    assert_eq!(reply.status, RunnerStatus::WaitingForInput);
    assert!(reply.text.contains("Parsed 2 guide(s) for analysis."));
    assert!(reply.text.contains("## Off-Target Analysis Report"));
    assert!(reply.text.contains("genome-wide off-target search"));

    let reply = m.handle_message("yes").unwrap();
    assert_eq!(reply.status, RunnerStatus::Done);
    assert!(reply.text.contains("Off-target analysis complete."));
    assert!(reply.text.ends_with(COMPLETION_NOTE));

    let ctx = m.context();
    assert_eq!(ctx.off_target_results.len(), 2);
    assert_eq!(ctx.off_target_results[0]["risk"], "low");
    assert_eq!(ctx.guides[0].sequence, "GACGTACGTACGTACGTACG");
}

#[test]
fn unrecognized_choices_keep_the_user_in_triage() {
    let mut m = manager();
    m.greeting().unwrap();

    let reply = m.handle_message("something else").unwrap();
    assert!(reply.text.starts_with("I didn't recognize that workflow."));
    assert_eq!(reply.status, RunnerStatus::WaitingForInput);

    let reply = m.handle_message("8").unwrap();
    assert!(reply.text.starts_with("I didn't recognize that workflow."));
    assert_eq!(m.runner().active_sequence_name(), "triage");

    let reply = m.handle_message("1").unwrap();
    assert!(reply.text.contains("Knockout Target Selection"));
}

#[test]
fn export_and_reset() {
    let mut m = manager();
    m.handle_message("1").unwrap();
    m.handle_message("TP53 mouse").unwrap();

    let exported = m.export_json().unwrap();
    let restored = SessionContext::from_json(serde_json::from_str(&exported).unwrap()).unwrap();
    assert_eq!(&restored, m.context());

    let old_id = m.context().session_id.clone();
    m.reset();
    assert!(!m.is_started());
    assert_ne!(m.context().session_id, old_id);
    assert!(m.context().chat_history.is_empty());
}
