use crate::step::StepOutcome;

/// Error de dominio de un step. El runner no lo interpreta: lo devuelve tal
/// cual al host (que puede hacer `downcast_ref` al tipo concreto).
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait que define un Step. Las implementaciones no guardan estado propio: todo
/// lo que acumulan vive en el contexto compartido `C`, por lo que una misma
/// instancia puede registrarse en varias secuencias.
pub trait Step<C>: Send + Sync {
    /// Nombre amigable. Por defecto el nombre del tipo sin ruta de módulo ni
    /// parámetros genéricos (`Wrap<Marker>` queda como `Wrap`).
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Si es `true` el runner se detiene antes de ejecutar el step y espera a
    /// `submit_input`.
    fn needs_input(&self) -> bool {
        false
    }

    /// Texto mostrado al pedir input. Sólo se usa cuando `needs_input` es `true`.
    fn prompt(&self) -> &str {
        ""
    }

    /// Ejecuta el step. `input` sólo está presente cuando el runner reanuda un
    /// step en espera.
    fn execute(&self, ctx: &mut C, input: Option<&str>) -> Result<StepOutcome, StepError>;
}

/// Último segmento de la ruta, cortando antes del primer `<`: la ruta de los
/// argumentos genéricos también contiene `::`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
