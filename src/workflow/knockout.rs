//! Workflow de knockout: gen objetivo, candidatos de guide RNA y selección.
//!
//! Los candidatos se ingresan a mano (sin consulta a servicios externos); el
//! score de cada guide es una heurística local basada en contenido GC.
use crispr_core::{GuideRna, SessionContext, Step, StepError, StepOutcome};
use log::debug;
use serde_json::json;

use super::parsing;
use crate::errors::DomainError;

const DEFAULT_CAS: &str = "SpCas9";
const MIN_GUIDE_LEN: usize = 17;
const MAX_GUIDE_LEN: usize = 24;
const TOP_GUIDES: usize = 3;

const TARGET_PROMPT: &str = "\
## Step: Knockout Target Selection

To design guide RNAs for gene knockout, please provide:

1. **Target gene** - gene symbol (e.g., TP53, BRCA1, CD274)
2. **Species** - human, mouse, rat, zebrafish, or drosophila
3. **Any preferences?** - specific exons or functional domains";

const GUIDE_PROMPT: &str = "\
## Guide RNA Candidates

Paste candidate spacer sequences (17-24 nt, A/C/G/T), separated by spaces, commas or new lines.";

const SELECTION_PROMPT: &str = "Please select a guide by number, or type 'all' to use the top-ranked guides.";

/// Recoge gen objetivo y especie.
pub struct TargetInput;

impl Step<SessionContext> for TargetInput {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        TARGET_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let words = parsing::words(input.unwrap_or_default());
        let species = parsing::species(&words);
        let gene = parsing::gene_symbol(&words);

        let Some(gene) = gene else {
            return Ok(StepOutcome::wait_for_input("No target gene found. Please provide a gene symbol (e.g., TP53)."));
        };

        ctx.target_gene = gene;
        ctx.species = species;
        if ctx.cas_system.is_empty() {
            ctx.cas_system = DEFAULT_CAS.to_string();
        }
        let exon = words.windows(2)
                        .find(|pair| pair[0].eq_ignore_ascii_case("exon"))
                        .map(|pair| format!("exon {}", pair[1]))
                        .unwrap_or_else(|| "early constitutive exons".to_string());
        ctx.extra.insert("preferred_exon".into(), json!(exon));

        let message = format!("**Target gene:** {}\n**Species:** {}\n**Cas system:** {}\n**Strategy:** Target {}",
                              ctx.target_gene, ctx.species, ctx.cas_system, exon);
        Ok(StepOutcome::continue_with(message).with_data("target_gene", ctx.target_gene.clone())
                                              .with_data("species", ctx.species.clone()))
    }
}

/// Recibe los candidatos de guide RNA y los ordena por score.
pub struct GuideEntry;

impl Step<SessionContext> for GuideEntry {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        GUIDE_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let mut guides = Vec::new();
        let mut rejected = Vec::new();
        for raw in parsing::words(input.unwrap_or_default()) {
            match parse_guide(&raw) {
                Some(guide) => guides.push(guide),
                None => rejected.push(raw),
            }
        }

        if guides.is_empty() {
            let mut message = "No valid guide sequences found.".to_string();
            if !rejected.is_empty() {
                message.push_str(&format!(" Rejected: {}.", rejected.join(", ")));
            }
            message.push_str(" Please paste 17-24 nt sequences using A/C/G/T.");
            return Ok(StepOutcome::wait_for_input(message));
        }

        guides.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!("guide entry accepted={} rejected={}", guides.len(), rejected.len());

        let mut lines = vec![format!("Candidate guides for **{}** ({}):", ctx.target_gene, ctx.species),
                             String::new(),
                             "| # | Sequence | Score | GC |".to_string(),
                             "|---|----------|-------|----|".to_string()];
        for (i, g) in guides.iter().enumerate() {
            lines.push(format!("| {} | `{}` | {:.1} | {:.0}% |", i + 1, g.sequence, g.score, gc_fraction(&g.sequence) * 100.0));
        }
        if !rejected.is_empty() {
            lines.push(String::new());
            lines.push(format!("Ignored invalid entries: {}", rejected.join(", ")));
        }

        let count = guides.len();
        ctx.guides = guides;
        ctx.selected_guide_index = -1;
        Ok(StepOutcome::continue_with(lines.join("\n")).with_data("guide_count", count))
    }
}

pub(crate) fn parse_guide(raw: &str) -> Option<GuideRna> {
    let sequence = raw.to_uppercase();
    let valid_len = (MIN_GUIDE_LEN..=MAX_GUIDE_LEN).contains(&sequence.len());
    if !valid_len || !sequence.chars().all(|c| matches!(c, 'A' | 'C' | 'G' | 'T')) {
        return None;
    }
    let score = guide_score(&sequence);
    Some(GuideRna { sequence,
                    pam: "NGG".to_string(),
                    score,
                    source: "manual".to_string(),
                    ..Default::default() })
}

pub(crate) fn gc_fraction(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gc = sequence.chars().filter(|c| matches!(c, 'G' | 'C')).count();
    gc as f64 / sequence.len() as f64
}

/// 0-100: máximo con GC al 50%, penaliza poli-T (terminador de Pol III).
fn guide_score(sequence: &str) -> f64 {
    let gc = gc_fraction(sequence);
    let mut score = 100.0 - (gc - 0.5).abs() * 200.0;
    if sequence.contains("TTTT") {
        score -= 30.0;
    }
    score.clamp(0.0, 100.0)
}

/// Selección de guide: número (1-based) o `all`/`top3`.
pub struct GuideSelection;

impl Step<SessionContext> for GuideSelection {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        SELECTION_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        if ctx.guides.is_empty() {
            return Err(Box::new(DomainError::MissingData("guide candidates".into())));
        }

        let choice = input.unwrap_or_default().trim().to_lowercase();
        let (index, selected) = match choice.as_str() {
            "all" | "top3" | "" => (0, ctx.guides.len().min(TOP_GUIDES)),
            other => match other.parse::<usize>() {
                Ok(n) if (1..=ctx.guides.len()).contains(&n) => (n - 1, 1),
                _ => {
                    return Ok(StepOutcome::wait_for_input(format!("Please choose a number between 1 and {}, or 'all'.",
                                                                  ctx.guides.len())))
                }
            },
        };

        ctx.selected_guide_index = index as i64;
        let message = format!("Selected {} guide(s) for knockout of **{}**.", selected, ctx.target_gene);
        Ok(StepOutcome::done(message).with_data("selected_guide_index", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_input_parses_gene_and_species() {
        let mut ctx = SessionContext::new();
        let out = TargetInput.execute(&mut ctx, Some("I want to knock out tp53 in mouse, exon 4")).unwrap();
        assert!(matches!(out.kind, crispr_core::OutcomeKind::Continue));
        assert_eq!(ctx.target_gene, "TP53");
        assert_eq!(ctx.species, "mouse");
        assert_eq!(ctx.cas_system, "SpCas9");
        assert_eq!(ctx.extra["preferred_exon"], "exon 4");
    }

    #[test]
    fn target_input_without_gene_asks_again() {
        let mut ctx = SessionContext::new();
        let out = TargetInput.execute(&mut ctx, Some("  ")).unwrap();
        assert!(out.is_waiting());
        assert!(ctx.target_gene.is_empty());
    }

    #[test]
    fn guides_are_validated_and_ranked() {
        let mut ctx = SessionContext::new();
        // 50% GC primero, luego uno sesgado a AT con poli-T.
        let out = GuideEntry.execute(&mut ctx, Some("aattttaaaattttaaaatt, GACGTACGTACGTACGTACG, xyz")).unwrap();
        assert!(matches!(out.kind, crispr_core::OutcomeKind::Continue));
        assert_eq!(ctx.guides.len(), 2);
        assert_eq!(ctx.guides[0].sequence, "GACGTACGTACGTACGTACG");
        assert!(ctx.guides[0].score > ctx.guides[1].score);
        assert!(out.message.contains("Ignored invalid entries: xyz"));
    }

    #[test]
    fn guide_entry_without_valid_sequences_asks_again() {
        let mut ctx = SessionContext::new();
        let out = GuideEntry.execute(&mut ctx, Some("ACGT")).unwrap();
        assert!(out.is_waiting());
        assert!(out.message.contains("Rejected: ACGT."));
    }

    #[test]
    fn selection_by_number_and_out_of_range() {
        let mut ctx = SessionContext::new();
        GuideEntry.execute(&mut ctx, Some("GACGTACGTACGTACGTACG GGCCGGCCAATTAATTGGCC")).unwrap();

        let out = GuideSelection.execute(&mut ctx, Some("5")).unwrap();
        assert!(out.is_waiting());
        assert_eq!(ctx.selected_guide_index, -1);

        let out = GuideSelection.execute(&mut ctx, Some("2")).unwrap();
        assert!(out.is_done());
        assert_eq!(ctx.selected_guide_index, 1);
        assert!(ctx.selected_guide().is_some());
    }

    #[test]
    fn selection_without_guides_is_a_domain_error() {
        let mut ctx = SessionContext::new();
        let err = GuideSelection.execute(&mut ctx, Some("all")).unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::MissingData(_))));
    }
}
