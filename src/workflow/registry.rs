//! Registro de las secuencias disponibles en el router.
use std::sync::Arc;

use crispr_core::{Router, SessionContext, Step};

use super::activation::{ActRepEntry, ActRepGuideDesign, ActRepSystemSelect, ActRepTarget};
use super::base_editing::{BaseEditingEntry, BaseEditingGuideDesign, BaseEditingSystemSelect, BaseEditingTarget};
use super::delivery::{DeliveryEntry, DeliverySelect};
use super::knockout::{GuideEntry, GuideSelection, TargetInput};
use super::off_target::{OffTargetEntry, OffTargetInput, OffTargetReport, OffTargetScoring};
use super::prime_editing::{PegRnaDesign, PrimeEditingEntry, PrimeEditingSystemSelect, PrimeEditingTarget};
use super::triage::WorkflowTriage;
use super::troubleshoot::{TroubleshootAdvise, TroubleshootDiagnose, TroubleshootEntry};

pub const TRIAGE: &str = "triage";

/// Construye el router con todas las modalidades disponibles más la secuencia
/// de triage, que sólo ofrece las modalidades registradas.
pub fn build_router() -> Arc<Router<SessionContext>> {
    // activation y repression comparten los mismos steps; el efector fija el modo.
    let act_rep = with_delivery(vec![step(ActRepEntry),
                                     step(ActRepSystemSelect),
                                     step(ActRepTarget),
                                     step(ActRepGuideDesign)]);

    let mut router =
        Router::<SessionContext>::builder().sequence("knockout",
                                                     with_delivery(vec![step(TargetInput),
                                                                        step(GuideEntry),
                                                                        step(GuideSelection)]))
                                           .sequence("base_editing",
                                                     with_delivery(vec![step(BaseEditingEntry),
                                                                        step(BaseEditingSystemSelect),
                                                                        step(BaseEditingTarget),
                                                                        step(BaseEditingGuideDesign)]))
                                           .sequence("prime_editing",
                                                     with_delivery(vec![step(PrimeEditingEntry),
                                                                        step(PrimeEditingSystemSelect),
                                                                        step(PrimeEditingTarget),
                                                                        step(PegRnaDesign)]))
                                           .sequence("activation", act_rep.clone())
                                           .sequence("repression", act_rep)
                                           .sequence("off_target",
                                                     vec![step(OffTargetEntry),
                                                          step(OffTargetInput),
                                                          step(OffTargetScoring),
                                                          step(OffTargetReport)])
                                           .sequence("troubleshoot",
                                                     vec![step(TroubleshootEntry),
                                                          step(TroubleshootDiagnose),
                                                          step(TroubleshootAdvise)])
                                           .into_router();

    let modalities = router.modalities();
    router.register(TRIAGE, vec![step(WorkflowTriage::new(modalities))]);
    Arc::new(router)
}

/// Agrega la planificación de delivery al final de una modalidad.
fn with_delivery(mut steps: Vec<Arc<dyn Step<SessionContext>>>) -> Vec<Arc<dyn Step<SessionContext>>> {
    steps.push(step(DeliveryEntry));
    steps.push(step(DeliverySelect));
    steps
}

fn step<S>(s: S) -> Arc<dyn Step<SessionContext>>
    where S: Step<SessionContext> + 'static
{
    Arc::new(s)
}
