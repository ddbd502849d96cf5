//! Definiciones relacionadas a Steps.
//!
//! Un Step es una etapa de un wizard: (a) un formulario cuyo input se valida
//! contra el esquema declarado por el propio step, y (b) exactamente una
//! operación remota que se ejecuta al enviarlo. Este módulo define:
//! - `StepDefinition`: interfaz neutral usada por el controlador.
//! - `StepOutcome`: resultado de la operación remota (payload normalizado,
//!   entity refs nuevos, estado derivado opcional).
//! - `StatusProbe`: sondeo de estado para pasos cuyo desenlace ocurre fuera
//!   de banda (p.ej. un pago liquidándose).
//! - `StepStatus`: estado de un step dentro del `FlowState`.

pub mod definition;
mod outcome;
mod probe;
mod status;

pub use definition::StepDefinition;
pub use outcome::StepOutcome;
pub use probe::StatusProbe;
pub use status::StepStatus;
