//! Step de entrada: elige la modalidad y salta a su secuencia.
use crispr_core::{SessionContext, Step, StepError, StepOutcome};
use log::info;

use crate::modality::{self, WELCOME_MESSAGE};

/// Pide al usuario una modalidad del menú y devuelve `Branch` hacia ella.
///
/// Sólo ramifica a secuencias de `available`; cualquier otra elección vuelve a
/// pedir input sin salir del step.
pub struct WorkflowTriage {
    available: Vec<String>,
}

impl WorkflowTriage {
    pub fn new(available: Vec<String>) -> Self {
        Self { available }
    }
}

impl Step<SessionContext> for WorkflowTriage {
    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        WELCOME_MESSAGE
    }

    fn execute(&self, ctx: &mut SessionContext, input: Option<&str>) -> Result<StepOutcome, StepError> {
        let text = input.unwrap_or_default();
        let Some(workflow) = modality::resolve(text) else {
            return Ok(StepOutcome::wait_for_input(format!("I didn't recognize that workflow. {WELCOME_MESSAGE}")));
        };

        if !self.available.iter().any(|name| name == workflow) {
            let offered = self.available.iter().map(|w| modality::display_name(w)).collect::<Vec<_>>().join(", ");
            return Ok(StepOutcome::wait_for_input(format!("The {} workflow is not available in this build. \
                                                           Available: {offered}.",
                                                          modality::display_name(workflow))));
        }

        info!("triage selected workflow={workflow}");
        ctx.modality = workflow.to_string();
        Ok(StepOutcome::branch(workflow, format!("Starting the **{}** workflow.", modality::display_name(workflow)))
                      .with_data("modality", workflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triage() -> WorkflowTriage {
        WorkflowTriage::new(vec!["knockout".into(), "troubleshoot".into()])
    }

    #[test]
    fn branches_to_a_registered_modality() {
        let mut ctx = SessionContext::new();
        let out = triage().execute(&mut ctx, Some("1")).unwrap();
        assert_eq!(out.branch_target(), Some("knockout"));
        assert_eq!(ctx.modality, "knockout");
    }

    #[test]
    fn unknown_choice_asks_again() {
        let mut ctx = SessionContext::new();
        let out = triage().execute(&mut ctx, Some("pizza")).unwrap();
        assert!(out.is_waiting());
        assert!(out.message.starts_with("I didn't recognize that workflow."));
        assert!(ctx.modality.is_empty());
    }

    #[test]
    fn unavailable_modality_asks_again() {
        let mut ctx = SessionContext::new();
        let out = triage().execute(&mut ctx, Some("crispra")).unwrap();
        assert!(out.is_waiting());
        assert!(out.message.contains("Activation"));
        assert!(out.message.contains("Knockout, Troubleshoot"));
    }
}
