//! Análisis de off-target para guides ya diseñados.
//!
//! Sin búsqueda genómica: el riesgo se estima con reglas de secuencia (GC
//! global y de la región seed, homopolímeros, baja complejidad). La búsqueda
//! completa queda como instrucción en el reporte.
use crispr_core::{GuideRna, SessionContext, Step, StepError, StepOutcome};
use log::debug;
use serde_json::json;

use super::knockout::{gc_fraction, parse_guide};
use super::parsing;
use crate::errors::DomainError;

const ENTRY_TEXT: &str = "\
## Off-Target Analysis

I will screen your guide sequences for features linked to promiscuous binding and rank them by estimated specificity.";

const INPUT_PROMPT: &str = "\
Paste one or more guide sequences (17-24 nt, without PAM). Optionally add lines such as:

Species: mouse
Cas system: SaCas9";

const REPORT_PROMPT: &str = "Do you want instructions for a genome-wide off-target search? (yes/no)";

/// Longitud de la región seed, adyacente al PAM.
const SEED_LENGTH: usize = 12;
const HOMOPOLYMER_RUN: usize = 5;

/// (sistema, alias en minúsculas, PAM)
const CAS_SYSTEMS: &[(&str, &str, &str)] = &[("SaCas9", "sacas9", "NNGRRT"),
                                             ("Cas12a", "cas12a", "TTTV"),
                                             ("SpCas9", "spcas9", "NGG")];

pub struct OffTargetEntry;

impl Step<SessionContext> for OffTargetEntry {
    fn execute(&self, _ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        Ok(StepOutcome::continue_with(ENTRY_TEXT))
    }
}

/// Lee los guides, la especie y el sistema Cas.
pub struct OffTargetInput;

impl Step<SessionContext> for OffTargetInput {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        INPUT_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let text = input.unwrap_or_default();
        let lower = text.to_lowercase();
        let (cas, _, pam) = CAS_SYSTEMS.iter()
                                       .find(|(_, alias, _)| lower.contains(alias))
                                       .copied()
                                       .unwrap_or(("SpCas9", "spcas9", "NGG"));

        let words = parsing::words(text);
        let guides: Vec<GuideRna> = words.iter()
                                         .filter_map(|w| parse_guide(w))
                                         .map(|g| GuideRna { pam: pam.to_string(),
                                                             source: "user".to_string(),
                                                             ..g })
                                         .collect();
        if guides.is_empty() {
            return Ok(StepOutcome::wait_for_input("No guide sequences found. Please paste 17-24 nt sequences using A/C/G/T."));
        }

        ctx.species = parsing::species(&words);
        ctx.cas_system = cas.to_string();
        let count = guides.len();
        ctx.guides = guides;
        ctx.selected_guide_index = -1;
        ctx.off_target_results.clear();

        let message = format!("Parsed {count} guide(s) for analysis.\n**Species:** {}\n**Cas system:** {} (PAM {pam})",
                              ctx.species, ctx.cas_system);
        Ok(StepOutcome::continue_with(message).with_data("guide_count", count))
    }
}

/// Rasgos de secuencia asociados a off-target.
fn risk_flags(sequence: &str) -> Vec<&'static str> {
    let mut flags = Vec::new();
    let gc = gc_fraction(sequence);
    if gc > 0.7 {
        flags.push("high GC");
    } else if gc < 0.3 {
        flags.push("low GC");
    }
    let seed = &sequence[sequence.len().saturating_sub(SEED_LENGTH)..];
    if gc_fraction(seed) >= 0.75 {
        flags.push("GC-rich seed");
    }
    if longest_run(sequence) >= HOMOPOLYMER_RUN {
        flags.push("homopolymer run");
    }
    if distinct_dinucleotides(sequence) <= 4 {
        flags.push("low complexity");
    }
    flags
}

fn longest_run(sequence: &str) -> usize {
    let bytes = sequence.as_bytes();
    let mut best = 0;
    let mut run = 0;
    for (i, b) in bytes.iter().enumerate() {
        run = if i > 0 && bytes[i - 1] == *b { run + 1 } else { 1 };
        best = best.max(run);
    }
    best
}

fn distinct_dinucleotides(sequence: &str) -> usize {
    let mut seen: Vec<&[u8]> = sequence.as_bytes().windows(2).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

fn risk_level(flags: usize) -> &'static str {
    match flags {
        0 => "low",
        1 => "medium",
        _ => "high",
    }
}

/// Puntúa cada guide y arma el reporte ordenado por especificidad.
pub struct OffTargetScoring;

impl Step<SessionContext> for OffTargetScoring {
    fn execute(&self, ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        if ctx.guides.is_empty() {
            return Err(Box::new(DomainError::MissingData("guides for off-target analysis".into())));
        }

        let mut results = Vec::with_capacity(ctx.guides.len());
        for guide in ctx.guides.iter_mut() {
            let flags = risk_flags(&guide.sequence);
            guide.off_target_score = (100.0 - 25.0 * flags.len() as f64).max(0.0);
            results.push(json!({
                "sequence": guide.sequence,
                "specificity": guide.off_target_score,
                "risk": risk_level(flags.len()),
                "flags": flags,
            }));
        }
        ctx.guides.sort_by(|a, b| b.off_target_score.total_cmp(&a.off_target_score));
        results.sort_by(|a, b| b["specificity"].as_f64()
                                               .unwrap_or_default()
                                               .total_cmp(&a["specificity"].as_f64().unwrap_or_default()));
        debug!("scored {} guides", results.len());

        let mut lines = vec!["## Off-Target Analysis Report".to_string(),
                             String::new(),
                             "| # | Sequence | Specificity | Risk | Flags |".to_string(),
                             "|---|----------|-------------|------|-------|".to_string()];
        for (i, r) in results.iter().enumerate() {
            let flags = r["flags"].as_array()
                                  .map(|f| f.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>().join(", "))
                                  .unwrap_or_default();
            lines.push(format!("| {} | `{}` | {} | {} | {} |",
                               i + 1,
                               r["sequence"].as_str().unwrap_or_default(),
                               r["specificity"],
                               r["risk"].as_str().unwrap_or_default(),
                               if flags.is_empty() { "-" } else { flags.as_str() }));
        }
        let high = results.iter().filter(|r| r["risk"] == "high").count();
        if high > 0 {
            lines.push(String::new());
            lines.push(format!("{high} guide(s) are high risk; prefer a high-fidelity nuclease or redesign them."));
        }

        ctx.off_target_results = results;
        Ok(StepOutcome::continue_with(lines.join("\n")).with_data("high_risk", high))
    }
}

/// Cierre: instrucciones de búsqueda genómica si se piden.
pub struct OffTargetReport;

impl Step<SessionContext> for OffTargetReport {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        REPORT_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        if !parsing::is_affirmative(input.unwrap_or_default()) {
            return Ok(StepOutcome::done("Off-target analysis complete."));
        }

        let pam = ctx.guides.first().map(|g| g.pam.as_str()).unwrap_or("NGG");
        let lines = ["## Genome-wide Search".to_string(),
                     String::new(),
                     format!("1. Download the {} reference genome (FASTA, one file per chromosome).", ctx.species),
                     format!("2. Write one line per guide followed by the PAM `{pam}` into `guides.txt`."),
                     "3. Run `crispritz.py search genome/ pam.txt guides.txt results -mm 4 -t -scores`, or Cas-OFFinder with up to 4 mismatches.".to_string(),
                     "4. Flag any site with <= 2 mismatches inside an exon and validate it by amplicon sequencing.".to_string(),
                     String::new(),
                     "Off-target analysis complete.".to_string()];
        Ok(StepOutcome::done(lines.join("\n")))
    }
}
