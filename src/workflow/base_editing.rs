//! Workflow de base editing: editor (CBE/ABE), sitio objetivo y diseño de guide.
//!
//! Todo es local: la ventana de edición y las advertencias salen de reglas
//! fijas por tipo de editor.
use crispr_core::{SessionContext, Step, StepError, StepOutcome};
use serde_json::json;

use super::parsing;

const ENTRY_TEXT: &str = "\
## Base Editing

Base editors install single-nucleotide changes without a double-strand break:

- **CBE** (cytosine base editor): C>T (G>A on the opposite strand)
- **ABE** (adenine base editor): A>G (T>C on the opposite strand)

The target base has to sit inside the editing window of the protospacer.";

const SYSTEM_PROMPT: &str = "\
Which base editor do you want to use?

1. **CBE** - BE4max, C>T conversions
2. **ABE** - ABE8e, A>G conversions
3. **Dual** - both conversions at the same site";

const TARGET_PROMPT: &str = "\
Describe the edit:

1. **Target gene** (e.g., HBB, PCSK9)
2. **Species**
3. **Base change** written as X>Y (e.g., C>T, A>G)";

const DESIGN_PROMPT: &str = "Do you want guide design rules for this edit? (yes/no)";

/// Editores conocidos: (nombre, alias, cambio nativo, producto).
const EDITORS: &[(&str, &[&str], &str, &str)] = &[("CBE", &["1", "cbe", "c>t", "be4max", "cytosine"], "C>T", "BE4max"),
                                                   ("ABE", &["2", "abe", "a>g", "abe8e", "adenine"], "A>G", "ABE8e"),
                                                   ("Dual", &["3", "dual", "both"], "C>T + A>G", "SPACE / A&C-BEmax")];

/// Introducción; no pide input.
pub struct BaseEditingEntry;

impl Step<SessionContext> for BaseEditingEntry {
    fn execute(&self, _ctx: &mut SessionContext, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        Ok(StepOutcome::continue_with(ENTRY_TEXT))
    }
}

/// Elige el editor.
pub struct BaseEditingSystemSelect;

impl Step<SessionContext> for BaseEditingSystemSelect {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let choice = input.unwrap_or_default().trim().to_lowercase();
        let editor = EDITORS.iter()
                            .find(|(_, aliases, _, _)| aliases.iter().any(|a| choice == *a || choice.starts_with(&format!("{a} "))));
        let Some((name, _, change, product)) = editor else {
            return Ok(StepOutcome::wait_for_input("Please choose 1 (CBE), 2 (ABE) or 3 (Dual)."));
        };

        ctx.base_editor = name.to_string();
        ctx.cas_system = format!("{product} (nCas9)");
        Ok(StepOutcome::continue_with(format!("Selected base editing system: **{name}** ({product}, {change})."))
                      .with_data("base_editor", *name))
    }
}

/// Gen, especie y cambio de base; advierte si el cambio no es el del editor.
pub struct BaseEditingTarget;

impl Step<SessionContext> for BaseEditingTarget {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        TARGET_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let words = parsing::words(input.unwrap_or_default());
        let Some(gene) = parsing::gene_symbol(&words) else {
            return Ok(StepOutcome::wait_for_input("No target gene found. Please provide a gene symbol and the base change (e.g., HBB C>T)."));
        };
        let change = words.iter().find_map(|w| base_change(w));

        ctx.target_gene = gene;
        ctx.species = parsing::species(&words);
        ctx.target_base_change = change.clone().unwrap_or_default();

        let window = if ctx.base_editor == "CBE" { "4-8" } else { "4-7" };
        ctx.extra.insert("editing_window".into(), json!(window));

        let mut lines = vec![format!("**Target gene:** {}", ctx.target_gene),
                             format!("**Species:** {}", ctx.species),
                             format!("**Base change:** {}",
                                     change.as_deref().unwrap_or("not specified"))];
        lines.push(format!("**Editing window:** protospacer positions {window} (PAM-distal numbering)"));
        if let Some(warning) = change.as_deref().and_then(|c| mismatch_warning(&ctx.base_editor, c)) {
            lines.push(String::new());
            lines.push(warning);
        }
        Ok(StepOutcome::continue_with(lines.join("\n")).with_data("target_base_change", ctx.target_base_change.clone()))
    }
}

/// `c>t`, `C->T` o `C→T` a `C>T`; `None` si no es un cambio de base.
fn base_change(word: &str) -> Option<String> {
    let upper = word.to_uppercase().replace("->", ">").replace('→', ">");
    let (from, to) = upper.split_once('>')?;
    let valid = |s: &str| s.len() == 1 && matches!(s, "A" | "C" | "G" | "T");
    (valid(from) && valid(to) && from != to).then(|| format!("{from}>{to}"))
}

fn mismatch_warning(editor: &str, change: &str) -> Option<String> {
    let native: &[&str] = match editor {
        "CBE" => &["C>T", "G>A"],
        "ABE" => &["A>G", "T>C"],
        _ => &["C>T", "G>A", "A>G", "T>C"],
    };
    if native.contains(&change) {
        return None;
    }
    let hint = match change {
        "A>G" | "T>C" => "an ABE",
        "C>T" | "G>A" => "a CBE",
        _ => "prime editing (transversions are outside base editor chemistry)",
    };
    Some(format!("**Warning:** {editor} cannot install {change}. Consider {hint} instead."))
}

/// Reglas de diseño de guide para el editor elegido.
pub struct BaseEditingGuideDesign;

impl Step<SessionContext> for BaseEditingGuideDesign {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        DESIGN_PROMPT
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        if !parsing::is_affirmative(input.unwrap_or_default()) {
            return Ok(StepOutcome::done("Skipping guide design. You can design guides with BE-Designer or CHOPCHOP."));
        }

        let window = ctx.extra.get("editing_window").and_then(|v| v.as_str()).unwrap_or("4-7");
        let lines = ["## Base Editor Guide Design".to_string(),
                     String::new(),
                     format!("1. Place the target base of **{}** at protospacer positions {window}.",
                             if ctx.target_gene.is_empty() { "your gene" } else { ctx.target_gene.as_str() }),
                     "2. Avoid other editable bases inside the window (bystander edits).".to_string(),
                     "3. If no NGG PAM fits, use a PAM-relaxed variant (SpRY, NG-Cas9).".to_string(),
                     "4. Screen 2-3 guides and quantify conversion by amplicon sequencing.".to_string()];
        Ok(StepOutcome::done(lines.join("\n")).with_data("guide_design", true))
    }
}
