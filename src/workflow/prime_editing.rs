//! Workflow de prime editing: sistema PE, descripción del edit y diseño de pegRNA.
use crispr_core::{SessionContext, Step, StepError, StepOutcome};
use serde_json::json;

use super::parsing;

const ENTRY_TEXT: &str = "\
## Prime Editing

Prime editors write any small substitution, insertion or deletion from a pegRNA template,
without a double-strand break or donor DNA.";

const SYSTEM_PROMPT: &str = "\
Which prime editing system?

1. **PE2** - Cas9 nickase + RT, single pegRNA
2. **PE3** - PE2 plus a nicking sgRNA on the other strand (higher efficiency)
3. **PE3b** - nicking sgRNA that only matches the edited sequence (fewer indels)
4. **PEmax** - optimized architecture, best default for new projects";

const TARGET_PROMPT: &str = "\
Describe the edit:

1. **Target gene**
2. **Species**
3. **Edit** (e.g., \"G>C substitution at codon 6\", \"insert 3 bp FLAG linker\", \"delete 12 bp\")";

const DESIGN_PROMPT: &str = "Do you want pegRNA design recommendations? (yes/no)";

// Longitudes iniciales recomendadas para el primer barrido.
const PBS_LENGTH: u32 = 13;
const RT_LENGTH: u32 = 15;

const SYSTEMS: &[(&str, &[&str])] = &[("PE2", &["1", "pe2"]),
                                      ("PE3", &["2", "pe3"]),
                                      ("PE3b", &["3", "pe3b"]),
                                      ("PEmax", &["4", "pemax", "pe max"])];

/// Introducción; no pide input.
pub struct PrimeEditingEntry;

impl Step<SessionContext> for PrimeEditingEntry {
    fn execute(&self, _ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        Ok(StepOutcome::continue_with(ENTRY_TEXT))
    }
}

pub struct PrimeEditingSystemSelect;

impl Step<SessionContext> for PrimeEditingSystemSelect {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let choice = input.unwrap_or_default().trim().to_lowercase();
        let Some((name, _)) = SYSTEMS.iter().find(|(_, aliases)| aliases.contains(&choice.as_str())) else {
            return Ok(StepOutcome::wait_for_input("Please choose 1 (PE2), 2 (PE3), 3 (PE3b) or 4 (PEmax)."));
        };

        ctx.prime_editor = name.to_string();
        ctx.cas_system = "nCas9(H840A)-RT".to_string();
        let mut message = format!("Selected prime editing system: **{name}**");
        if needs_nick_guide(name) {
            message.push_str("\n\nThis system needs a second, nicking sgRNA 40-90 bp from the pegRNA nick.");
        }
        Ok(StepOutcome::continue_with(message).with_data("prime_editor", *name))
    }
}

fn needs_nick_guide(system: &str) -> bool {
    matches!(system, "PE3" | "PE3b")
}

/// Gen, especie y tipo de edit.
pub struct PrimeEditingTarget;

impl Step<SessionContext> for PrimeEditingTarget {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        TARGET_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let text = input.unwrap_or_default().trim();
        let words = parsing::words(text);
        let Some(gene) = parsing::gene_symbol(&words) else {
            return Ok(StepOutcome::wait_for_input("No target gene found. Please provide a gene symbol and describe the edit."));
        };

        let edit_type = edit_type(text);
        ctx.target_gene = gene;
        ctx.species = parsing::species(&words);
        ctx.extra.insert("edit_type".into(), json!(edit_type));
        ctx.extra.insert("edit_description".into(), json!(text));

        let message = format!("**Target gene:** {}\n**Species:** {}\n**Edit type:** {edit_type}\n\n\
                               The pegRNA has three parts:\n\
                               1. **Spacer** - directs the nick to the target site\n\
                               2. **PBS** - primer binding site, anneals to the nicked strand\n\
                               3. **RT template** - encodes the edit plus flanking homology",
                              ctx.target_gene, ctx.species);
        Ok(StepOutcome::continue_with(message).with_data("edit_type", edit_type))
    }
}

fn edit_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));
    if has(&["insert", "insertion", "knock-in", "tag"]) {
        "insertion"
    } else if has(&["delete", "deletion", "remove"]) {
        "deletion"
    } else if has(&["substitut", "mutation", "snp", ">"]) {
        "substitution"
    } else {
        "complex"
    }
}

/// Recomendaciones de PBS, RT template y nicking guide.
pub struct PegRnaDesign;

impl Step<SessionContext> for PegRnaDesign {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        DESIGN_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        if !parsing::is_affirmative(input.unwrap_or_default()) {
            return Ok(StepOutcome::done("Skipping pegRNA design. PrimeDesign and pegFinder can generate candidates."));
        }

        let edit_type = ctx.extra.get("edit_type").and_then(|v| v.as_str()).unwrap_or("complex");
        // Inserciones largas necesitan más homología 3' tras el edit.
        let rt_length = if edit_type == "insertion" { RT_LENGTH + 10 } else { RT_LENGTH };
        ctx.pegrna_extension = format!("PBS {PBS_LENGTH} nt + RT {rt_length} nt");

        let mut lines = vec!["## pegRNA Design".to_string(),
                             String::new(),
                             format!("- **PBS length:** start at {PBS_LENGTH} nt, screen 10-16 nt"),
                             format!("- **RT template:** start at {rt_length} nt, at least 10 nt of homology past the edit"),
                             "- Add a tevopreQ1 motif (epegRNA) to protect the 3' extension".to_string()];
        if needs_nick_guide(&ctx.prime_editor) {
            ctx.nick_guide = "nicking sgRNA 40-90 bp from the pegRNA nick".to_string();
            lines.push(format!("- **Nicking guide ({}):** pick a spacer on the opposite strand, {}",
                               ctx.prime_editor, if ctx.prime_editor == "PE3b" {
                                   "overlapping the edit so it only binds the edited allele"
                               } else {
                                   "40-90 bp from the pegRNA nick"
                               }));
        }
        Ok(StepOutcome::done(lines.join("\n")).with_data("pegrna_extension", ctx.pegrna_extension.clone()))
    }
}
