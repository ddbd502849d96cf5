//! Implementación de `FlowController`.
//!
//! Contrato central (ver doc de cada operación):
//! - `initialize` nunca hace fallar el montaje de la página: si el backend
//!   no responde, arranca un flujo fresco en modo degradado y lo registra.
//! - `complete_step` es todo-o-nada respecto del `FlowState`: o el step
//!   completa y el flujo avanza, o el estado queda intacto salvo la señal
//!   transitoria de error.
//! - `go_to_step` es una guarda de UI, no un canal de errores: una
//!   navegación no permitida se rehúsa en silencio (queda en la bitácora).
//! - `refresh_remote_status` es idempotente y se apaga solo al observar un
//!   estado terminal.

use serde_json::Value;

use crate::definition::FlowDefinition;
use crate::errors::FlowError;
use crate::event::{FlowEvent, FlowEventKind};
use crate::model::FlowState;
use crate::step::{StepOutcome, StepStatus};
use crate::store::FlowStore;

pub struct FlowController<S: FlowStore> {
    definition: FlowDefinition,
    store: S,
    state: FlowState,
    events: Vec<FlowEvent>,
    /// Exclusión cooperativa: mientras una operación remota de
    /// `complete_step` está en vuelo, toda llamada nueva se rechaza. El
    /// runtime no tiene preempción; esto cubre re-entradas desde la UI.
    busy: bool,
}

impl<S: FlowStore> FlowController<S> {
    /// Crea el controlador con un estado fresco. `initialize` lo puede
    /// reemplazar por el flujo en curso que reporte el backend.
    pub fn new(definition: FlowDefinition, store: S) -> Self {
        let state = FlowState::fresh(&definition);
        Self { definition,
               store,
               state,
               events: Vec::new(),
               busy: false }
    }

    /// Recupera el flujo en curso del backend, si existe, y lo restaura.
    ///
    /// Nunca falla: ante error de red o snapshot incompatible degrada al
    /// estado fresco y deja constancia (modo degradado, no fatal).
    pub async fn initialize(&mut self) -> &FlowState {
        let restored = match self.store.fetch(self.definition.kind()).await {
            Ok(Some(snapshot)) => match FlowState::restore(&self.definition, &snapshot) {
                Some(state) => {
                    self.state = state;
                    true
                }
                None => {
                    log::warn!("snapshot for flow '{}' does not match the current definition; starting fresh",
                               self.definition.kind());
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                log::warn!("could not fetch in-progress flow '{}': {e}; starting fresh",
                           self.definition.kind());
                false
            }
        };
        self.record(FlowEventKind::FlowInitialized { definition_hash: self.definition
                                                                          .definition_hash()
                                                                          .to_string(),
                                                     step_count: self.definition.len(),
                                                     restored });
        &self.state
    }

    /// Completa el step activo: valida el input, ejecuta su única operación
    /// remota y, si todo sale bien, avanza el flujo y desbloquea el
    /// siguiente step.
    ///
    /// Precondiciones: `step_id` debe ser el step activo y el input debe
    /// pasar la validación del step; ambas fallas se rechazan sin tocar la
    /// red ni el estado.
    pub async fn complete_step(&mut self, step_id: &str, input: Value) -> Result<&FlowState, FlowError> {
        if self.busy {
            return Err(self.reject(step_id, FlowError::OperationInFlight));
        }
        if self.state.completed {
            return Err(self.reject(step_id, FlowError::FlowCompleted));
        }
        let Some(index) = self.definition.index_of(step_id) else {
            return Err(self.reject(step_id, FlowError::UnknownStep(step_id.to_string())));
        };
        if step_id != self.state.current_step_id {
            return Err(self.reject(step_id, FlowError::StepNotActive(step_id.to_string())));
        }
        if let Err(e) = self.definition.steps()[index].validate(&input) {
            return Err(self.reject(step_id, e));
        }

        self.busy = true;
        self.state.is_loading = true;
        let result = self.definition.steps()[index].submit(&input, &self.state.entity_refs)
                                                   .await;
        self.busy = false;
        self.state.is_loading = false;

        match result {
            Ok(outcome) => {
                self.apply_completion(index, outcome);
                Ok(&self.state)
            }
            Err(e) => {
                // Fallo transitorio: el step sigue activo, el caller
                // muestra el error y permite reintentar.
                self.state.last_error = Some(e.to_string());
                self.record(FlowEventKind::StepFailed { step_id: step_id.to_string(),
                                                        error: e.to_string() });
                Err(e)
            }
        }
    }

    /// Navega directamente a un step ya accesible. No-op silencioso si el
    /// destino no es accesible: guarda de UI, no canal de errores.
    ///
    /// Volver atrás no borra `collected_data` de los steps posteriores;
    /// re-completar un step posterior simplemente sobreescribe.
    pub fn go_to_step(&mut self, step_id: &str) -> &FlowState {
        if step_id == self.state.current_step_id {
            return &self.state;
        }
        let accessible = self.state
                             .step(step_id)
                             .map(|slot| slot.accessible)
                             .unwrap_or(false);
        if self.busy || self.state.completed || !accessible {
            log::debug!("navigation to '{step_id}' refused");
            self.record(FlowEventKind::NavigationRefused { target: step_id.to_string() });
            return &self.state;
        }
        let from = self.state.current_step_id.clone();
        if let Some(slot) = self.state.step_mut(&from) {
            slot.status = StepStatus::Pending; // conserva su accesibilidad
        }
        if let Some(slot) = self.state.step_mut(step_id) {
            slot.status = StepStatus::InProgress;
        }
        self.state.current_step_id = step_id.to_string();
        self.record(FlowEventKind::Navigated { from,
                                               to: step_id.to_string() });
        &self.state
    }

    /// Sondea el estado de la entidad cuyo desenlace ocurre fuera de banda
    /// y actualiza el estado derivado (`remote_status`).
    ///
    /// Idempotente: sin cambio en el backend no hay mutación alguna. Al
    /// observar un estado terminal deja de ir a la red.
    pub async fn refresh_remote_status(&mut self) -> Result<&FlowState, FlowError> {
        if self.state.remote_status.is_some_and(|s| s.is_terminal()) {
            return Ok(&self.state);
        }
        let Some(probe) = self.definition.probe() else {
            return Ok(&self.state);
        };
        let Some(entity_id) = self.state.entity_refs.get(probe.entity_key()).cloned() else {
            // El step que produce el id todavía no corrió.
            return Ok(&self.state);
        };
        match probe.poll(&entity_id).await {
            Ok(status) => {
                if self.state.remote_status != Some(status) {
                    self.state.remote_status = Some(status);
                    self.record(FlowEventKind::RemoteStatusChanged { status });
                }
                Ok(&self.state)
            }
            Err(e) => {
                log::warn!("status poll for '{entity_id}' failed: {e}");
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    /// Bitácora de la sesión (orden ascendente por seq).
    pub fn events(&self) -> &[FlowEvent] {
        &self.events
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Aplica la transición de éxito de forma atómica: marcar completado,
    /// registrar datos y refs, avanzar y desbloquear el siguiente step.
    fn apply_completion(&mut self, index: usize, outcome: StepOutcome) {
        let step_id = self.state.current_step_id.clone();
        self.state.last_error = None;
        if let Some(slot) = self.state.step_mut(&step_id) {
            slot.status = StepStatus::Completed;
        }
        self.state.collected_data.insert(step_id.clone(), outcome.collected);
        for (key, id) in outcome.entity_refs {
            self.state.entity_refs.insert(key, id);
        }
        if let Some(status) = outcome.remote_status {
            if self.state.remote_status != Some(status) {
                self.state.remote_status = Some(status);
                self.record(FlowEventKind::RemoteStatusChanged { status });
            }
        }
        self.record(FlowEventKind::StepCompleted { step_index: index,
                                                   step_id: step_id.clone() });
        match self.definition.next_after(&step_id).map(str::to_string) {
            Some(next) => {
                if let Some(slot) = self.state.step_mut(&next) {
                    slot.status = StepStatus::InProgress;
                    slot.accessible = true;
                }
                self.state.current_step_id = next;
            }
            None => {
                self.state.completed = true;
                self.record(FlowEventKind::FlowCompleted);
            }
        }
    }

    /// Registra un rechazo de precondición/validación y devuelve el error
    /// para el caller. El `FlowState` no se toca.
    fn reject(&mut self, step_id: &str, error: FlowError) -> FlowError {
        log::debug!("complete_step('{step_id}') rejected: {error}");
        self.record(FlowEventKind::StepRejected { step_id: step_id.to_string(),
                                                  reason: error.to_string() });
        error
    }

    fn record(&mut self, kind: FlowEventKind) {
        let seq = self.events.len() as u64;
        self.events.push(FlowEvent { seq,
                                     flow_id: self.state.flow_id,
                                     kind,
                                     ts: chrono::Utc::now() });
    }
}
