//! Lectura de respuestas libres: palabras, especie, símbolo de gen y sí/no.
const SPECIES: &[&str] = &["human", "mouse", "rat", "zebrafish", "drosophila"];
const DEFAULT_SPECIES: &str = "human";

// Palabras frecuentes en la respuesta libre que nunca son un símbolo de gen.
const FILLER: &[&str] = &["a", "activate", "an", "and", "base", "edit", "editing", "exon", "exons", "for", "gene",
                          "i", "in", "is", "knock", "knockout", "my", "no", "of", "on", "out", "please", "prime",
                          "repress", "target", "the", "to", "want", "with", "yes"];

const AFFIRMATIVE: &[&str] = &["y", "yes", "yeah", "sure", "ok", "okay", "please", "go"];

pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Primera especie conocida, o `human`.
pub(crate) fn species(words: &[String]) -> String {
    words.iter()
         .map(|w| w.to_lowercase())
         .find(|w| SPECIES.contains(&w.as_str()))
         .unwrap_or_else(|| DEFAULT_SPECIES.to_string())
}

/// Primer token con forma de símbolo de gen, en mayúsculas.
pub(crate) fn gene_symbol(words: &[String]) -> Option<String> {
    words.iter().find(|w| is_gene_symbol(w)).map(|w| w.to_uppercase())
}

pub(crate) fn is_gene_symbol(word: &str) -> bool {
    let lower = word.to_lowercase();
    if FILLER.contains(&lower.as_str()) || SPECIES.contains(&lower.as_str()) {
        return false;
    }
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
    && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    && word.len() <= 15
}

/// `true` si la primera palabra es afirmativa. Vacío o cualquier otra cosa es "no".
pub(crate) fn is_affirmative(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    let first = lower.split(|c: char| !c.is_ascii_alphabetic()).next().unwrap_or_default();
    AFFIRMATIVE.contains(&first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_gene_and_species_from_free_text() {
        let w = words("I want to knock out tp53 in mouse, exon 4");
        assert_eq!(gene_symbol(&w).as_deref(), Some("TP53"));
        assert_eq!(species(&w), "mouse");
        assert_eq!(species(&words("BRCA1")), "human");
    }

    #[test]
    fn gene_symbols_reject_filler_and_numbers() {
        assert!(is_gene_symbol("CD274"));
        assert!(is_gene_symbol("HLA-A"));
        assert!(!is_gene_symbol("the"));
        assert!(!is_gene_symbol("4"));
        assert!(!is_gene_symbol("zebrafish"));
    }

    #[test]
    fn yes_and_no() {
        assert!(is_affirmative("Yes please"));
        assert!(is_affirmative("y"));
        assert!(is_affirmative("ok, go ahead"));
        assert!(!is_affirmative("no thanks"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("yesterday"));
    }
}
