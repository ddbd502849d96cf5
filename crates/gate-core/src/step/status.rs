use serde::{Deserialize, Serialize};

/// Estado de un Step dentro de un flujo.
///
/// Las transiciones válidas son:
/// - `Pending` -> `InProgress` (el step pasa a ser el activo)
/// - `InProgress` -> `Completed` (su operación remota terminó bien)
/// - `InProgress` -> `Pending` (el usuario navegó hacia atrás)
/// - `Completed` -> `InProgress` (el usuario re-entra para re-completar)
/// - `Pending` -> `Disabled` (sólo en construcción, por regla de negocio)
///
/// No existe un estado `Failed`: los fallos remotos son transitorios y no
/// persisten en el `FlowState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// El step todavía no se alcanzó.
    Pending,
    /// El step es el activo del flujo. A lo sumo uno a la vez.
    InProgress,
    /// La operación remota del step terminó con éxito.
    Completed,
    /// Excluido del flujo por regla de negocio (rama "sólo manual", etc.).
    Disabled,
}
