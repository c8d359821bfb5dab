//! Builder para `Router`.
//!
//! ```ignore
//! let router = Router::builder()
//!     .sequence("knockout", vec![Arc::new(TargetInput), Arc::new(GuideEntry)])
//!     .sequence("troubleshoot", vec![Arc::new(TroubleshootEntry)])
//!     .build();
//! ```

use std::sync::Arc;

use super::Router;
use crate::step::Step;

/// Acumula registros y entrega el router ya envuelto en `Arc`, listo para
/// compartirse entre runners.
pub struct RouterBuilder<C> {
    router: Router<C>,
}

impl<C> RouterBuilder<C> {
    pub fn new() -> Self {
        Self { router: Router::new() }
    }

    /// Registra una secuencia (mismas reglas que `Router::register`).
    #[inline]
    pub fn sequence(mut self, name: &str, steps: Vec<Arc<dyn Step<C>>>) -> Self {
        self.router.register(name, steps);
        self
    }

    /// Router sin envolver, por si el llamador necesita seguir registrando.
    pub fn into_router(self) -> Router<C> {
        self.router
    }

    #[inline]
    pub fn build(self) -> Arc<Router<C>> {
        Arc::new(self.router)
    }
}

impl<C> Default for RouterBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
