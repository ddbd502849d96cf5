//! Agregado `FlowState`: propiedad exclusiva del controlador.
//!
//! El dueño durable de estos datos es el backend (persistencia autoritativa
//! del lado servidor); este estado en memoria es un espejo/caché que se
//! reconstruye en `initialize` y se descarta al terminar la sesión.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::definition::FlowDefinition;
use crate::model::FlowSnapshot;
use crate::step::StepStatus;

/// Identificadores opacos devueltos por la API, indexados por concepto de
/// dominio ("subscriptionId", "invoiceId", ...). Se pueblan de forma
/// incremental y nunca se eliminan dentro de una sesión.
pub type EntityRefs = IndexMap<String, String>;

/// Estado derivado de una entidad externa que se resuelve fuera de banda.
/// No forma parte de la máquina de steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Processing,
    Succeeded,
    Failed,
}

impl RemoteStatus {
    /// Un estado terminal detiene el sondeo.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteStatus::Processing)
    }
}

/// Vista de un step dentro del estado: lo que el stepper/sidebar renderiza.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSlot {
    pub step_id: String,
    pub title: String,
    pub status: StepStatus,
    /// Si el usuario puede navegar directamente a este step fuera de
    /// secuencia. Se gana al completar el step inmediatamente anterior y no
    /// se pierde al navegar hacia atrás.
    pub accessible: bool,
}

/// Agregado completo de un wizard en curso.
///
/// Invariante: mientras `completed == false`, exactamente un slot está
/// `InProgress` y su id coincide con `current_step_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub flow_id: Uuid,
    pub current_step_id: String,
    pub steps: Vec<StepSlot>,
    /// Payload por step acumulado al completar. Se retiene aunque el
    /// usuario vuelva a un step anterior; re-completar sobreescribe.
    pub collected_data: IndexMap<String, Value>,
    pub entity_refs: EntityRefs,
    /// Estado derivado del sondeo (`refresh_remote_status`).
    pub remote_status: Option<RemoteStatus>,
    /// true cuando el último step habilitado completó.
    pub completed: bool,
    /// Señales transitorias para la UI. No sobreviven un restore.
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl FlowState {
    /// Estado recién creado: primer step habilitado activo y accesible, el
    /// resto pendiente (o deshabilitado según la definición).
    pub(crate) fn fresh(definition: &FlowDefinition) -> Self {
        let first = definition.first_enabled_id()
                              .expect("flow definition must have at least one enabled step")
                              .to_string();
        let steps = definition.steps()
                              .iter()
                              .map(|s| {
                                  let disabled = definition.is_disabled(s.id());
                                  StepSlot { step_id: s.id().to_string(),
                                             title: s.title().to_string(),
                                             status: if disabled {
                                                 StepStatus::Disabled
                                             } else if s.id() == first {
                                                 StepStatus::InProgress
                                             } else {
                                                 StepStatus::Pending
                                             },
                                             accessible: !disabled && s.id() == first }
                              })
                              .collect();
        Self { flow_id: Uuid::new_v4(),
               current_step_id: first,
               steps,
               collected_data: IndexMap::new(),
               entity_refs: IndexMap::new(),
               remote_status: None,
               completed: false,
               is_loading: false,
               last_error: None }
    }

    /// Reconstruye el estado desde un snapshot del backend.
    ///
    /// Devuelve `None` si el snapshot no corresponde a esta definición
    /// (hash distinto, steps desconocidos); el caller degrada a un flujo
    /// fresco en ese caso.
    pub(crate) fn restore(definition: &FlowDefinition, snap: &FlowSnapshot) -> Option<Self> {
        if snap.definition_hash != definition.definition_hash() {
            return None;
        }
        let mut state = Self::fresh(definition);
        // El fresh marcó el primer step activo; se re-aplica todo abajo.
        for slot in &mut state.steps {
            if slot.status == StepStatus::InProgress {
                slot.status = StepStatus::Pending;
                slot.accessible = false;
            }
        }
        for id in &snap.completed_steps {
            let slot = state.steps.iter_mut().find(|s| s.step_id == *id)?;
            if slot.status == StepStatus::Disabled {
                return None;
            }
            slot.status = StepStatus::Completed;
            slot.accessible = true;
        }
        {
            let current = state.steps
                               .iter_mut()
                               .find(|s| s.step_id == snap.current_step_id)?;
            if current.status == StepStatus::Disabled {
                return None;
            }
            current.status = StepStatus::InProgress;
            current.accessible = true;
        }
        state.flow_id = snap.flow_id;
        state.current_step_id = snap.current_step_id.clone();
        state.collected_data = snap.collected_data.clone();
        state.entity_refs = snap.entity_refs.clone();
        state.remote_status = snap.remote_status;
        Some(state)
    }

    pub fn step(&self, step_id: &str) -> Option<&StepSlot> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub(crate) fn step_mut(&mut self, step_id: &str) -> Option<&mut StepSlot> {
        self.steps.iter_mut().find(|s| s.step_id == step_id)
    }

    /// Slot del step activo. El invariante garantiza que existe.
    pub fn current_step(&self) -> &StepSlot {
        self.step(&self.current_step_id)
            .expect("current_step_id must reference a step in `steps`")
    }
}
