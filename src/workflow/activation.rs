//! CRISPRa / CRISPRi con dCas9. La misma secuencia se registra como
//! `activation` y como `repression`; el efector elegido fija el modo.
use crispr_core::{SessionContext, Step, StepError, StepOutcome};
use log::debug;
use serde_json::json;

use super::parsing;

const ENTRY_TEXT: &str = "\
## Gene Activation / Repression

Catalytically dead Cas9 (dCas9) fused to an effector domain changes transcription without cutting DNA.
CRISPRa recruits activators upstream of the TSS; CRISPRi blocks or silences the promoter.";

const SYSTEM_PROMPT: &str = "\
Choose an effector system:

**CRISPRa (activation)**
1. dCas9-VP64 - simple, moderate activation
2. dCas9-p65-HSF1 (SAM) - strong, needs the MS2 sgRNA scaffold
3. dCas9-VPR - strong, single construct
4. SunTag-VP64 - strong, multi-component

**CRISPRi (repression)**
5. dCas9-KRAB - standard choice
6. dCas9-KRAB-MeCP2 - stronger silencing

Press enter to use the default for this workflow.";

const TARGET_PROMPT: &str = "\
Which gene should be regulated, and in which species? (e.g., \"MYOD1 human\")";

const DESIGN_PROMPT: &str = "Do you want guide placement rules for this target? (yes/no)";

const ACTIVATION: &str = "activation";
const REPRESSION: &str = "repression";

struct Effector {
    name: &'static str,
    aliases: &'static [&'static str],
    mode: &'static str,
}

const EFFECTORS: &[Effector] = &[Effector { name: "dCas9-VP64", aliases: &["1", "vp64"], mode: ACTIVATION },
                                 Effector { name: "dCas9-p65-HSF1 (SAM)", aliases: &["2", "sam", "p65"], mode: ACTIVATION },
                                 Effector { name: "dCas9-VPR", aliases: &["3", "vpr"], mode: ACTIVATION },
                                 Effector { name: "SunTag-VP64", aliases: &["4", "suntag"], mode: ACTIVATION },
                                 Effector { name: "dCas9-KRAB", aliases: &["5", "krab"], mode: REPRESSION },
                                 Effector { name: "dCas9-KRAB-MeCP2", aliases: &["6", "krab-mecp2", "mecp2"], mode: REPRESSION }];

fn effector(choice: &str) -> Option<&'static Effector> {
    // "krab-mecp2" también contiene "krab": gana el nombre más largo.
    EFFECTORS.iter()
             .filter(|e| e.aliases.iter().any(|a| if a.len() == 1 { choice == *a } else { choice.contains(a) }))
             .max_by_key(|e| e.name.len())
}

fn default_effector(workflow: &str) -> &'static Effector {
    let name = if workflow == REPRESSION { "dCas9-KRAB" } else { "dCas9-VPR" };
    EFFECTORS.iter().find(|e| e.name == name).unwrap_or(&EFFECTORS[0])
}

fn mode_of(ctx: &SessionContext) -> &str {
    ctx.extra.get("regulation_mode").and_then(|v| v.as_str()).unwrap_or(ACTIVATION)
}

/// Introducción; no pide input.
pub struct ActRepEntry;

impl Step<SessionContext> for ActRepEntry {
    fn execute(&self, _ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        Ok(StepOutcome::continue_with(ENTRY_TEXT))
    }
}

/// Elige el efector; vacío usa el de la modalidad activa.
pub struct ActRepSystemSelect;

impl Step<SessionContext> for ActRepSystemSelect {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let choice = input.unwrap_or_default().trim().to_lowercase();
        let chosen = if choice.is_empty() || choice == "default" {
            default_effector(&ctx.modality)
        } else {
            match effector(&choice) {
                Some(e) => e,
                None => return Ok(StepOutcome::wait_for_input("Please choose an effector by number (1-6).")),
            }
        };
        debug!("effector={} mode={} workflow={}", chosen.name, chosen.mode, ctx.modality);

        ctx.effector_system = chosen.name.to_string();
        ctx.cas_system = "dCas9".to_string();
        ctx.extra.insert("regulation_mode".into(), json!(chosen.mode));

        let mut message = format!("Selected effector: **{}** ({})", chosen.name, chosen.mode);
        let requested = ctx.modality.as_str();
        if (requested == ACTIVATION || requested == REPRESSION) && requested != chosen.mode {
            message.push_str(&format!("\n\n*Note: {} is a {} system; continuing in {} mode.*",
                                      chosen.name, chosen.mode, chosen.mode));
        }
        Ok(StepOutcome::continue_with(message).with_data("effector_system", chosen.name))
    }
}

/// Gen y especie; la región objetivo depende del modo.
pub struct ActRepTarget;

impl Step<SessionContext> for ActRepTarget {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        TARGET_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let words = parsing::words(input.unwrap_or_default());
        let Some(gene) = parsing::gene_symbol(&words) else {
            return Ok(StepOutcome::wait_for_input("No target gene found. Please provide a gene symbol (e.g., MYOD1)."));
        };

        ctx.target_gene = gene;
        ctx.species = parsing::species(&words);
        ctx.target_region = match mode_of(ctx) {
            REPRESSION => "-50 to +300 bp around the TSS".to_string(),
            _ => "-400 to -50 bp upstream of the TSS".to_string(),
        };

        let message = format!("**Target gene:** {}\n**Species:** {}\n**Target region:** {}",
                              ctx.target_gene, ctx.species, ctx.target_region);
        Ok(StepOutcome::continue_with(message).with_data("target_region", ctx.target_region.clone()))
    }
}

/// Reglas de colocación de guides respecto al TSS.
pub struct ActRepGuideDesign;

impl Step<SessionContext> for ActRepGuideDesign {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        DESIGN_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        if !parsing::is_affirmative(input.unwrap_or_default()) {
            return Ok(StepOutcome::done("Skipping guide design. CRISPick has CRISPRa/CRISPRi rule sets for most genomes."));
        }

        let mut lines = vec![format!("## Guide Placement ({})", mode_of(ctx)),
                             String::new(),
                             format!("- Place guides at **{}** of {}.", ctx.target_region, ctx.target_gene),
                             "- Use the annotated TSS of the transcript expressed in your cells; alternative promoters need their own guides.".to_string()];
        if mode_of(ctx) == REPRESSION {
            lines.push("- One strong guide is usually enough with KRAB; test 2-3 and keep the best.".to_string());
        } else {
            lines.push("- Pool 3-4 guides across the window for additive activation.".to_string());
        }
        lines.push("- Measure expression by RT-qPCR 3-5 days after delivery.".to_string());
        Ok(StepOutcome::done(lines.join("\n")).with_data("guide_design", true))
    }
}
