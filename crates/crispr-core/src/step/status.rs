/// Estado observable del runner.
///
/// Las transiciones válidas son:
/// - `Idle` -> `Ready` | `WaitingForInput` | `Done` (vía `start`)
/// - `Ready` -> `WaitingForInput` | `Done` (vía `advance`)
/// - `WaitingForInput` -> `WaitingForInput` | `Done` (vía `submit_input`)
///
/// Un branch vuelve a entrar por `start` sin pasar por `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    /// Construido, sin secuencia activa.
    Idle,
    /// Secuencia activa, listo para `advance`.
    Ready,
    /// Detenido en un step que espera input del usuario.
    WaitingForInput,
    /// La secuencia activa terminó.
    Done,
}
