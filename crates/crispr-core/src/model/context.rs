/// Contexto mutable que el runner entrega por referencia a cada step.
///
/// El runner no impone estructura: lo único que necesita es anotar qué
/// secuencia está activa. El resto de campos los definen y consumen los steps.
pub trait SharedContext {
    /// Nombre de la secuencia activa (vacío si aún no arrancó ninguna).
    fn workflow(&self) -> &str;

    /// Fija el nombre de la secuencia activa. Lo llama `start` (y cada branch).
    fn set_workflow(&mut self, name: &str);
}
