//! Errores del core del controlador de flujos.
//!
//! La taxonomía distingue fallos transitorios (remotos, reintetables por el
//! usuario) de violaciones de precondición (defectos de cableado de la UI,
//! nunca corrompen el `FlowState`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FlowError {
    /// Se intentó completar un step que no es el activo. Defecto de
    /// programación: el estado queda intacto.
    #[error("step '{0}' is not the active step")]
    StepNotActive(String),
    /// El step referido no existe en la definición del flujo.
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    /// El flujo ya terminó; ninguna operación posterior es válida.
    #[error("flow already completed")]
    FlowCompleted,
    /// Hay una operación remota en vuelo; el controlador es exclusivo.
    #[error("a remote operation is already in flight")]
    OperationInFlight,
    /// El input del formulario no cumple el esquema del step. Se rechaza
    /// antes de tocar la red (fail closed).
    #[error("validation failed: {0}")]
    Validation(String),
    /// Fallo transitorio de la API remota. El estado no cambia y el caller
    /// puede reintentar.
    #[error("remote operation failed: {0}")]
    Remote(String),
    #[error("internal: {0}")]
    Internal(String),
}
