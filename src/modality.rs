//! Menú de modalidades y resolución del texto libre del usuario a un nombre de
//! workflow.

/// Mensaje de bienvenida con el menú numerado.
pub const WELCOME_MESSAGE: &str = "\
**Welcome to the CRISPR research assistant**

I can help you design and optimize CRISPR experiments. Choose a workflow to get started:

1. **Knockout** - Gene knockout via guide RNA design
2. **Base Editing** - CBE (C>T) or ABE (A>G) base editing
3. **Prime Editing** - PE2/PE3/PEmax precise editing
4. **Activation** - CRISPRa gene activation
5. **Repression** - CRISPRi gene repression
6. **Off-Target Analysis** - Score and assess guide specificity
7. **Troubleshoot** - Diagnose failed experiments

Type a number or workflow name to begin.";

// (alias, workflow)
const ALIASES: &[(&str, &str)] = &[("1", "knockout"),
                                   ("2", "base_editing"),
                                   ("3", "prime_editing"),
                                   ("4", "activation"),
                                   ("5", "repression"),
                                   ("6", "off_target"),
                                   ("7", "troubleshoot"),
                                   ("knockout", "knockout"),
                                   ("base editing", "base_editing"),
                                   ("base_editing", "base_editing"),
                                   ("prime editing", "prime_editing"),
                                   ("prime_editing", "prime_editing"),
                                   ("activation", "activation"),
                                   ("crispra", "activation"),
                                   ("repression", "repression"),
                                   ("crispri", "repression"),
                                   ("off-target", "off_target"),
                                   ("off_target", "off_target"),
                                   ("troubleshoot", "troubleshoot"),
                                   ("troubleshooting", "troubleshoot")];

/// Resuelve la elección del usuario (número del menú o alias, sin distinguir
/// mayúsculas ni espacios alrededor) al nombre del workflow.
pub fn resolve(text: &str) -> Option<&'static str> {
    let key = text.trim().to_lowercase();
    ALIASES.iter().find(|(alias, _)| *alias == key).map(|(_, workflow)| *workflow)
}

/// Nombre legible de un workflow para mensajes.
pub fn display_name(workflow: &str) -> String {
    workflow.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
}
