//! Bitácora append-only del controlador.
//!
//! Rol en el flujo:
//! - Cada transición, rechazo y fallo queda registrado aquí, de modo que
//!   las operaciones que "rehúsan en silencio" (navegación no accesible,
//!   completar un step inactivo) sigan siendo observables.
//! - La bitácora vive y muere con el controlador; no se persiste.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::RemoteStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de toda sesión de flujo. `restored` indica si el
    /// estado salió de un snapshot del backend o arrancó fresco.
    FlowInitialized {
        definition_hash: String,
        step_count: usize,
        restored: bool,
    },
    /// La operación remota de un step terminó bien y el flujo avanzó.
    StepCompleted { step_index: usize, step_id: String },
    /// La operación remota falló; el estado quedó intacto (salvo señal
    /// transitoria de error) y el step sigue activo.
    StepFailed { step_id: String, error: String },
    /// Precondición violada o input inválido: la llamada se rechazó antes
    /// de tocar la red.
    StepRejected { step_id: String, reason: String },
    /// Navegación hacia un step accesible.
    Navigated { from: String, to: String },
    /// Intento de navegar a un step no accesible: no-op observable.
    NavigationRefused { target: String },
    /// El sondeo observó un estado derivado distinto.
    RemoteStatusChanged { status: RemoteStatus },
    /// El último step habilitado completó; el flujo terminó.
    FlowCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64,
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>, // metadato, no participa en ninguna comparación
}
