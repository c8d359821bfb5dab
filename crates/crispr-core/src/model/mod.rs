//! Modelos del contexto compartido (trait `SharedContext` y el registro de
//! sesión CRISPR).

pub mod context;
pub mod session;

pub use context::SharedContext;
pub use session::{DeliveryInfo, GuideRna, PrimerPair, SessionContext};
