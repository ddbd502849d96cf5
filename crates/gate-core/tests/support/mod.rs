//! Steps y sondas guionadas para los tests del controlador.
#![allow(dead_code)] // no todos los tests usan todos los helpers

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gate_core::{EntityRefs, FlowDefinition, FlowError, RemoteStatus, StatusProbe, StepDefinition,
                StepOutcome, StepStatus};
use serde_json::{json, Value};

/// Step de prueba dirigido por su propio input:
/// - `{"invalid": true}` hace fallar la validación (nunca toca la "red").
/// - `{"fail_remote": true}` simula un fallo remoto transitorio.
/// - Cualquier otro input completa bien y ecoa el payload normalizado.
pub struct ScriptedStep {
    id: &'static str,
    produces: Option<(&'static str, &'static str)>,
}

impl ScriptedStep {
    pub fn new(id: &'static str) -> Self {
        Self { id, produces: None }
    }

    /// Variante que publica un entity ref al completar.
    pub fn with_ref(id: &'static str, key: &'static str, value: &'static str) -> Self {
        Self { id, produces: Some((key, value)) }
    }
}

#[async_trait]
impl StepDefinition for ScriptedStep {
    fn id(&self) -> &str {
        self.id
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        if input.get("invalid").and_then(Value::as_bool).unwrap_or(false) {
            return Err(FlowError::Validation("scripted invalid input".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, _refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        if input.get("fail_remote").and_then(Value::as_bool).unwrap_or(false) {
            return Err(FlowError::Remote("scripted remote failure".into()));
        }
        let mut outcome = StepOutcome::new(json!({ "echo": input, "normalized": true }));
        if let Some((key, value)) = self.produces {
            outcome = outcome.with_ref(key, value);
        }
        Ok(outcome)
    }
}

/// Sonda guionada: entrega estados de una cola compartida y cuenta las
/// consultas, para poder afirmar que el sondeo se detiene en terminal.
pub struct ScriptedProbe {
    key: &'static str,
    statuses: Arc<Mutex<VecDeque<RemoteStatus>>>,
    polls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new(key: &'static str) -> (Self, Arc<Mutex<VecDeque<RemoteStatus>>>, Arc<AtomicUsize>) {
        let statuses = Arc::new(Mutex::new(VecDeque::new()));
        let polls = Arc::new(AtomicUsize::new(0));
        (Self { key,
                statuses: statuses.clone(),
                polls: polls.clone() },
         statuses,
         polls)
    }
}

#[async_trait]
impl StatusProbe for ScriptedProbe {
    fn entity_key(&self) -> &str {
        self.key
    }

    async fn poll(&self, _entity_id: &str) -> Result<RemoteStatus, FlowError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut q = self.statuses.lock().unwrap();
        match q.len() {
            0 => Err(FlowError::Remote("no scripted status".into())),
            1 => Ok(*q.front().unwrap()), // el último estado se repite
            _ => Ok(q.pop_front().unwrap()),
        }
    }
}

/// Definición lineal de prueba; el primer step publica `ref-<id>` como
/// entity ref para poder verificar el encadenamiento.
pub fn linear_definition(kind: &str, ids: &[&'static str]) -> FlowDefinition {
    let mut builder = FlowDefinition::builder(kind);
    for (i, id) in ids.iter().enumerate() {
        if i == 0 {
            builder = builder.step(ScriptedStep::with_ref(id, "primaryId", "ent-0001"));
        } else {
            builder = builder.step(ScriptedStep::new(id));
        }
    }
    builder.build()
}

/// Invariante 1 del estado: exactamente un step `InProgress` y coincide con
/// `current_step_id` (mientras el flujo no haya terminado).
pub fn assert_single_in_progress(state: &gate_core::FlowState) {
    let in_progress: Vec<&str> = state.steps
                                      .iter()
                                      .filter(|s| s.status == StepStatus::InProgress)
                                      .map(|s| s.step_id.as_str())
                                      .collect();
    if state.completed {
        assert!(in_progress.is_empty(), "completed flow must have no active step");
    } else {
        assert_eq!(in_progress, vec![state.current_step_id.as_str()]);
    }
}
