use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::RemoteStatus;

/// Forma persistida de un flujo en curso, tal como la reporta el backend.
///
/// El backend es el dueño durable; el cliente sólo espeja. `definition_hash`
/// permite detectar snapshots de una versión anterior del wizard y degradar
/// a un arranque fresco en vez de restaurar un estado incoherente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub flow_id: Uuid,
    pub definition_hash: String,
    pub current_step_id: String,
    pub completed_steps: Vec<String>,
    pub collected_data: IndexMap<String, Value>,
    pub entity_refs: IndexMap<String, String>,
    #[serde(default)]
    pub remote_status: Option<RemoteStatus>,
}
