//! Steps y contexto de prueba compartidos por los tests de integración.
#![allow(dead_code)]

use std::sync::Arc;

use crispr_core::{OutcomeKind, SharedContext, Step, StepError, StepOutcome};
use thiserror::Error;

#[derive(Debug, Default)]
pub struct TestCtx {
    pub workflow: String,
    /// Nombres de los steps ejecutados, en orden.
    pub trail: Vec<String>,
    /// (step, input) recibidos.
    pub inputs: Vec<(String, String)>,
    /// Si coincide con el nombre de un `Flaky`, ese step falla.
    pub fail_on: Option<String>,
}

impl SharedContext for TestCtx {
    fn workflow(&self) -> &str {
        &self.workflow
    }

    fn set_workflow(&mut self, name: &str) {
        self.workflow = name.to_string();
    }
}

impl TestCtx {
    pub fn count(&self, step: &str) -> usize {
        self.trail.iter().filter(|s| *s == step).count()
    }
}

#[derive(Debug, Error)]
#[error("step {0} failed")]
pub struct Boom(pub String);

pub type DynStep = Arc<dyn Step<TestCtx>>;

/// Step automático que devuelve un outcome fijo.
pub struct Auto {
    name: &'static str,
    kind: OutcomeKind,
}

impl Auto {
    pub fn cont(name: &'static str) -> DynStep {
        Arc::new(Self { name, kind: OutcomeKind::Continue })
    }

    pub fn done(name: &'static str) -> DynStep {
        Arc::new(Self { name, kind: OutcomeKind::Done })
    }

    pub fn wait(name: &'static str) -> DynStep {
        Arc::new(Self { name, kind: OutcomeKind::WaitForInput })
    }

    pub fn branch(name: &'static str, target: &str) -> DynStep {
        Arc::new(Self { name, kind: OutcomeKind::Branch(target.to_string()) })
    }
}

impl Step<TestCtx> for Auto {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self, ctx: &mut TestCtx, input: Option<&str>) -> Result<StepOutcome, StepError> {
        ctx.trail.push(self.name.to_string());
        if let Some(text) = input {
            ctx.inputs.push((self.name.to_string(), text.to_string()));
        }
        Ok(StepOutcome::new(self.kind.clone(), format!("{} ran", self.name)).with_data("step", self.name))
    }
}

/// Step que pide input antes de ejecutarse.
pub struct Input {
    name: &'static str,
    prompt: &'static str,
    then: OutcomeKind,
}

impl Input {
    pub fn new(name: &'static str, prompt: &'static str) -> DynStep {
        Arc::new(Self { name, prompt, then: OutcomeKind::Continue })
    }

    pub fn then(name: &'static str, prompt: &'static str, then: OutcomeKind) -> DynStep {
        Arc::new(Self { name, prompt, then })
    }
}

impl Step<TestCtx> for Input {
    fn name(&self) -> &str {
        self.name
    }

    fn needs_input(&self) -> bool {
        true
    }

    fn prompt(&self) -> &str {
        self.prompt
    }

    fn execute(&self, ctx: &mut TestCtx, input: Option<&str>) -> Result<StepOutcome, StepError> {
        ctx.trail.push(self.name.to_string());
        ctx.inputs.push((self.name.to_string(), input.unwrap_or_default().to_string()));
        Ok(StepOutcome::new(self.then.clone(), format!("{} got input", self.name)))
    }
}

/// Step automático que falla cuando `ctx.fail_on` lo nombra.
pub struct Flaky {
    name: &'static str,
}

impl Flaky {
    pub fn new(name: &'static str) -> DynStep {
        Arc::new(Self { name })
    }
}

impl Step<TestCtx> for Flaky {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self, ctx: &mut TestCtx, _input: Option<&str>) -> Result<StepOutcome, StepError> {
        if ctx.fail_on.as_deref() == Some(self.name) {
            return Err(Box::new(Boom(self.name.to_string())));
        }
        ctx.trail.push(self.name.to_string());
        Ok(StepOutcome::continue_with(format!("{} ran", self.name)))
    }
}
