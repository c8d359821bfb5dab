//! Diagnóstico de experimentos fallidos.
use crispr_core::{SessionContext, Step, StepError, StepOutcome};
use log::debug;
use serde_json::{json, Value};

use crate::errors::DomainError;

const ENTRY_PROMPT: &str = "\
**Troubleshooting Mode**

I can help diagnose issues with your CRISPR experiment. What problem are you experiencing?

1. Low or no editing efficiency
2. High toxicity / low cell viability
3. Off-target effects detected
4. Unexpected phenotype or no phenotype
5. Other issue (please describe)";

const DIAGNOSE_PROMPT: &str = "\
To help diagnose the issue, please provide:

1. **Cell type/line** (e.g., HEK293T, primary T cells, iPSCs)
2. **Delivery method** (lipofection, electroporation, lentivirus, AAV) and format (plasmid, RNP, mRNA)
3. **CRISPR system** (e.g., SpCas9, high-fidelity variant)
4. **Guide RNA details** (how many guides, how they were designed)
5. **Editing efficiency** observed, if measured (e.g., 5%)
6. **Time point** of the readout (e.g., 48h, day 5)";

/// Causas frecuentes y comprobaciones rápidas por categoría.
struct Knowledge {
    category: &'static str,
    keywords: &'static [&'static str],
    common_causes: &'static [&'static str],
    quick_checks: &'static [&'static str],
}

const KNOWLEDGE: &[Knowledge] = &[Knowledge { category: "low_efficiency",
                                              keywords: &["1", "efficiency", "no editing", "low editing", "indel"],
                                              common_causes: &["Poor guide RNA design with low on-target activity",
                                                               "Insufficient delivery efficiency",
                                                               "Cas protein poorly expressed in this cell type",
                                                               "Target site blocked by closed chromatin"],
                                              quick_checks: &["Verify transfection efficiency with a fluorescent reporter",
                                                              "Test a validated positive-control guide in parallel",
                                                              "Try multiple guides targeting different exons",
                                                              "Switch to RNP delivery if using plasmids"] },
                                  Knowledge { category: "high_toxicity",
                                              keywords: &["2", "toxic", "viability", "death", "dying"],
                                              common_causes: &["DNA damage response to double-strand breaks",
                                                               "Innate immune sensing of plasmid or mRNA",
                                                               "Too much transfection reagent or harsh electroporation",
                                                               "Essential gene targeted"],
                                              quick_checks: &["Reduce reagent amount or electroporation voltage",
                                                              "Include a non-targeting guide control",
                                                              "Use endotoxin-free plasmid preparations"] },
                                  Knowledge { category: "off_target",
                                              keywords: &["3", "off-target", "off target", "offtarget"],
                                              common_causes: &["Guide with low specificity score",
                                                               "Prolonged nuclease exposure from plasmid expression",
                                                               "Mismatch-tolerant target sites in paralogs"],
                                              quick_checks: &["Switch to a high-fidelity Cas9 variant",
                                                              "Deliver as RNP to shorten exposure",
                                                              "Re-rank guides by specificity before repeating"] },
                                  Knowledge { category: "unexpected_phenotype",
                                              keywords: &["4", "phenotype"],
                                              common_causes: &["In-frame indels preserving protein function",
                                                               "Genetic compensation by paralogs",
                                                               "Mixed population masking the edited phenotype"],
                                              quick_checks: &["Confirm protein loss by Western blot",
                                                              "Derive clonal lines and genotype them",
                                                              "Test a second guide against a different exon"] }];

static OTHER: Knowledge = Knowledge { category: "other",
                                      keywords: &[],
                                      common_causes: &["Experimental design or reagent quality issues"],
                                      quick_checks: &["Review controls and reagent lots",
                                                      "Repeat with a validated positive-control guide"] };

/// Hallazgo que se activa cuando los detalles mencionan alguno de los `triggers`.
struct Rule {
    category: &'static str,
    triggers: &'static [&'static str],
    finding: &'static str,
    likelihood: &'static str,
}

const RULES: &[Rule] = &[Rule { category: "low_efficiency",
                                triggers: &["plasmid"],
                                finding: "Plasmid delivery gives delayed and variable Cas9 expression",
                                likelihood: "high" },
                         Rule { category: "low_efficiency",
                                triggers: &["primary", "ipsc", "stem"],
                                finding: "Hard-to-transfect cells; lipid reagents rarely reach them efficiently",
                                likelihood: "high" },
                         Rule { category: "low_efficiency",
                                triggers: &["24h", "24 h", "day 1"],
                                finding: "Readout too early; indels keep accumulating for 48-72 h",
                                likelihood: "medium" },
                         Rule { category: "high_toxicity",
                                triggers: &["electroporat", "nucleofect"],
                                finding: "Electroporation settings too harsh for this cell type",
                                likelihood: "high" },
                         Rule { category: "high_toxicity",
                                triggers: &["plasmid"],
                                finding: "Innate immune sensing of plasmid DNA",
                                likelihood: "high" },
                         Rule { category: "high_toxicity",
                                triggers: &["primary", "ipsc", "stem"],
                                finding: "p53-dependent arrest after double-strand breaks in primary or stem cells",
                                likelihood: "medium" },
                         Rule { category: "off_target",
                                triggers: &["plasmid", "lenti"],
                                finding: "Prolonged nuclease expression from a persistent vector",
                                likelihood: "high" },
                         Rule { category: "off_target",
                                triggers: &["wild-type", "wildtype", "spcas9"],
                                finding: "Wild-type SpCas9 tolerates mismatches at many sites",
                                likelihood: "medium" },
                         Rule { category: "unexpected_phenotype",
                                triggers: &["pool", "bulk"],
                                finding: "Mixed population masking the edited phenotype",
                                likelihood: "high" },
                         Rule { category: "unexpected_phenotype",
                                triggers: &["qpcr", "mrna level", "transcript"],
                                finding: "Transcript levels do not show protein loss",
                                likelihood: "medium" }];

/// Hallazgos ordenados: primero las reglas que disparan, después las causas
/// frecuentes de la categoría que no quedaron cubiertas.
fn diagnose(category: &str, details: &str) -> Vec<Value> {
    let details = details.to_lowercase();
    let mut findings: Vec<Value> = RULES.iter()
                                        .filter(|r| r.category == category)
                                        .filter(|r| r.triggers.iter().any(|t| details.contains(t)))
                                        .map(|r| json!({ "finding": r.finding, "likelihood": r.likelihood }))
                                        .collect();
    findings.sort_by_key(|f| if f["likelihood"] == "high" { 0 } else { 1 });
    let fallback = if findings.is_empty() { "medium" } else { "low" };
    findings.extend(knowledge_for(category).common_causes
                                           .iter()
                                           .map(|c| json!({ "finding": c, "likelihood": fallback })));
    findings
}

/// `5%` o `5 %` en el texto, como fracción de 0 a 100.
fn reported_efficiency(details: &str) -> Option<f64> {
    let compact = details.replace(" %", "%");
    compact.split_whitespace()
           .filter_map(|w| w.trim_matches(|c: char| c == ',' || c == '.' || c == '(' || c == ')').strip_suffix('%'))
           .find_map(|n| n.parse::<f64>().ok())
           .filter(|v| (0.0..=100.0).contains(v))
}

fn classify(text: &str) -> &'static Knowledge {
    let text = text.trim().to_lowercase();
    KNOWLEDGE.iter()
             .find(|k| k.keywords.iter().any(|w| if w.len() == 1 { text == *w } else { text.contains(w) }))
             .unwrap_or(&OTHER)
}

fn knowledge_for(category: &str) -> &'static Knowledge {
    KNOWLEDGE.iter().find(|k| k.category == category).unwrap_or(&OTHER)
}

/// Clasifica el problema reportado.
pub struct TroubleshootEntry;

impl Step<SessionContext> for TroubleshootEntry {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        ENTRY_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let summary = input.unwrap_or_default().trim().to_string();
        if summary.is_empty() {
            return Ok(StepOutcome::wait_for_input("Please describe the problem, or pick a number from the list."));
        }

        let knowledge = classify(&summary);
        ctx.troubleshoot_issue = knowledge.category.to_string();
        ctx.extra.insert("troubleshoot_summary".into(), json!(summary));

        let message = format!("**Issue category:** {}\n**Summary:** {}", knowledge.category, summary);
        Ok(StepOutcome::continue_with(message).with_data("category", knowledge.category))
    }
}

/// Pide detalles del experimento y ordena las causas probables.
pub struct TroubleshootDiagnose;

impl Step<SessionContext> for TroubleshootDiagnose {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        DIAGNOSE_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        if ctx.troubleshoot_issue.is_empty() {
            return Err(Box::new(DomainError::MissingData("troubleshoot issue".into())));
        }
        let details = input.unwrap_or_default().trim();
        let findings = diagnose(&ctx.troubleshoot_issue, details);
        debug!("diagnosis issue={} findings={}", ctx.troubleshoot_issue, findings.len());

        let mut lines = vec!["## Diagnosis".to_string(), String::new()];
        for (i, f) in findings.iter().enumerate() {
            lines.push(format!("{}. {} (**{}**)",
                               i + 1,
                               f["finding"].as_str().unwrap_or_default(),
                               f["likelihood"].as_str().unwrap_or_default()));
        }
        let efficiency = reported_efficiency(details);
        if let Some(value) = efficiency {
            lines.push(String::new());
            lines.push(format!("**Reported efficiency:** {value}%"));
            ctx.extra.insert("reported_efficiency".into(), json!(value));
        }

        ctx.extra.insert("troubleshoot_details".into(), json!(details));
        ctx.extra.insert("troubleshoot_diagnosis".into(), Value::Array(findings));
        Ok(StepOutcome::continue_with(lines.join("\n")).with_data("reported_efficiency", json!(efficiency)))
    }
}

/// Arma el plan de acción priorizado para la categoría detectada.
pub struct TroubleshootAdvise;

impl Step<SessionContext> for TroubleshootAdvise {
    fn execute(&self, ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        if ctx.troubleshoot_issue.is_empty() {
            return Err(Box::new(DomainError::MissingData("troubleshoot issue".into())));
        }
        let knowledge = knowledge_for(&ctx.troubleshoot_issue);

        let mut lines = vec!["## Troubleshooting Plan".to_string(), String::new()];
        let top = ctx.extra
                     .get("troubleshoot_diagnosis")
                     .and_then(|d| d.get(0))
                     .and_then(|f| f.get("finding"))
                     .and_then(|f| f.as_str());
        if let Some(top) = top {
            lines.push(format!("**Most likely:** {top}"));
            lines.push(String::new());
        }
        lines.push("**Likely causes:**".to_string());
        lines.extend(knowledge.common_causes.iter().map(|c| format!("- {c}")));
        lines.push(String::new());
        lines.push("**Actions:**".to_string());
        lines.extend(knowledge.quick_checks.iter().enumerate().map(|(i, c)| format!("{}. **{c}**", i + 1)));

        ctx.troubleshoot_recommendations = knowledge.quick_checks.iter().map(|c| c.to_string()).collect();
        Ok(StepOutcome::done(lines.join("\n")).with_data("actions", knowledge.quick_checks.len()))
    }
}
