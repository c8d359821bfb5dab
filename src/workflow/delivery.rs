//! Planificación del método de delivery, compartida por varias modalidades.
use crispr_core::{DeliveryInfo, SessionContext, Step, StepError, StepOutcome};

const ENTRY_TEXT: &str = "\
## Delivery Planning

Delivery strategy usually determines whether a design succeeds in practice.
Key tradeoffs: transfection efficiency, viability impact, persistence of editor exposure and fit for in vivo constraints.
";

const SELECT_PROMPT: &str = "\
Please share:
1. Cell or tissue context (for example: HEK293T, primary T cells, iPSC-derived neurons, mouse liver)
2. In vitro vs in vivo
3. Any hard constraints (toxicity ceiling, stable integration requirement, AAV size limit, throughput)

Free-form descriptions are fine.";

/// Resume el contexto del experimento antes de preguntar por delivery.
pub struct DeliveryEntry;

impl Step<SessionContext> for DeliveryEntry {
    fn execute(&self, ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        let mut text = ENTRY_TEXT.to_string();

        let fields = [("Current workflow", &ctx.modality),
                      ("CRISPR system", &ctx.cas_system),
                      ("Target gene", &ctx.target_gene),
                      ("Species", &ctx.species)];
        let context_lines: Vec<String> = fields.iter()
                                               .filter(|(_, value)| !value.is_empty())
                                               .map(|(label, value)| format!("**{label}:** {value}"))
                                               .collect();
        if !context_lines.is_empty() {
            text.push_str("\n**Your experiment context:**\n");
            text.push_str(&context_lines.join("\n"));
            text.push('\n');
        }

        if ctx.cas_system == "SaCas9" {
            text.push_str("\n*Note: SaCas9 is compact enough for AAV packaging; consider AAV for in vivo work.*\n");
        } else if ctx.cas_system.contains("Cas12a") {
            text.push_str("\n*Note: Cas12a systems work well with both RNP and plasmid delivery.*\n");
        }

        Ok(StepOutcome::continue_with(text))
    }
}

/// Recomienda método y formato a partir de la descripción del sistema celular.
pub struct DeliverySelect;

impl Step<SessionContext> for DeliverySelect {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        SELECT_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let text = input.unwrap_or_default().to_lowercase();
        if text.trim().is_empty() {
            return Ok(StepOutcome::wait_for_input("Please describe the cell or tissue context."));
        }

        let delivery = recommend(&text, &ctx.cas_system);
        let mut message = format!("**Recommended delivery method:** {}\n**Format:** {}\n**Specific product:** {}\n\n**Reasoning:** {}\n",
                                  delivery.method, delivery.format, delivery.product, delivery.reasoning);
        if !delivery.alternatives.is_empty() {
            message.push_str(&format!("\n**Alternative:** {}\n", delivery.alternatives));
        }

        let data = serde_json::to_value(&delivery)?;
        ctx.delivery = delivery;
        Ok(StepOutcome::done(message).with_data("delivery", data))
    }
}

// Reglas en orden de prioridad; la primera que aplica gana.
fn recommend(text: &str, cas_system: &str) -> DeliveryInfo {
    // Espacio inicial para que " t cell" no coincida dentro de "hek293t cells".
    let text = format!(" {}", text.to_lowercase());
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));
    let info = |method: &str, format: &str, product: &str, reasoning: &str, alternatives: &str| DeliveryInfo {
        method: method.to_string(),
        format: format.to_string(),
        product: product.to_string(),
        reasoning: reasoning.to_string(),
        alternatives: alternatives.to_string(),
    };

    if has(&["in vivo", "liver", "mouse model", "muscle", "retina"]) {
        if cas_system == "SaCas9" || has(&["aav"]) {
            return info("AAV",
                        "plasmid",
                        "AAV9 or tissue-tropic serotype",
                        "In vivo target with a Cas small enough for single-vector AAV packaging.",
                        "LNP-formulated mRNA for transient exposure");
        }
        return info("LNP",
                    "mRNA",
                    "Liver-tropic lipid nanoparticle",
                    "Transient in vivo expression limits off-target exposure and fits SpCas9 size.",
                    "Dual-AAV split-Cas9 systems");
    }
    if has(&["stable", "integration", "screen", "pooled"]) {
        return info("lentiviral",
                    "plasmid",
                    "Lentiviral transfer plasmid with selection marker",
                    "Stable integration is required for selection and long-term expression.",
                    "");
    }
    if has(&["primary", " t cell", " t-cell", "ipsc", "stem cell", "neuron", "hsc"]) {
        return info("electroporation",
                    "RNP",
                    "Nucleofection with pre-complexed Cas9 RNP",
                    "Hard-to-transfect cells tolerate RNP electroporation best and clear the editor quickly.",
                    "Lentiviral delivery if stable expression is needed");
    }
    info("lipofection",
         "plasmid",
         "Lipofectamine 3000",
         "Easy-to-transfect cell lines reach high efficiency with lipid reagents.",
         "RNP lipofection to reduce off-target exposure")
}
