use serde_json::Value;

use crate::model::RemoteStatus;

/// Resultado de la operación remota de un step.
///
/// `collected` es el payload (posiblemente normalizado por el servidor) que
/// el controlador guarda en `collected_data[step_id]`. `entity_refs` son los
/// identificadores opacos devueltos por la API que los steps posteriores
/// necesitan como input.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub collected: Value,
    pub entity_refs: Vec<(String, String)>,
    pub remote_status: Option<RemoteStatus>,
}

impl StepOutcome {
    pub fn new(collected: Value) -> Self {
        Self { collected,
               entity_refs: Vec::new(),
               remote_status: None }
    }

    pub fn with_ref(mut self, key: impl Into<String>, id: impl Into<String>) -> Self {
        self.entity_refs.push((key.into(), id.into()));
        self
    }

    pub fn with_remote_status(mut self, status: RemoteStatus) -> Self {
        self.remote_status = Some(status);
        self
    }
}
