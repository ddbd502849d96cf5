//! Definición inmutable de un flujo: lista ordenada de steps, steps
//! deshabilitados por regla de negocio y sonda de estado opcional.
//!
//! El orden se fija en construcción y no se recalcula nunca: "siguiente
//! step" es siempre la próxima entrada habilitada de la lista. Las
//! bifurcaciones (variante self-signed vs. enterprise, etc.) se resuelven
//! entregando al controlador la lista ya elegida; el core es agnóstico a la
//! rama. La tabla de transiciones (`transition_table`) expone la máquina de
//! estados de forma enumerable para tests, sin ejecutar código de UI.

use std::collections::BTreeSet;

use serde_json::json;

use crate::hashing::{hash_str, to_canonical_json};
use crate::step::{StatusProbe, StepDefinition};

pub struct FlowDefinition {
    kind: String,
    steps: Vec<Box<dyn StepDefinition>>,
    disabled: BTreeSet<String>,
    probe: Option<Box<dyn StatusProbe>>,
    definition_hash: String,
}

impl FlowDefinition {
    /// Crea un builder para un flujo del tipo dado ("subscription",
    /// "registration", ...). El tipo es la clave con la que el backend
    /// persiste y recupera el flujo en curso.
    pub fn builder(kind: impl Into<String>) -> FlowDefinitionBuilder {
        FlowDefinitionBuilder { kind: kind.into(),
                                steps: Vec::new(),
                                disabled: BTreeSet::new(),
                                probe: None }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn steps(&self) -> &[Box<dyn StepDefinition>] {
        &self.steps
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn probe(&self) -> Option<&dyn StatusProbe> {
        self.probe.as_deref()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_disabled(&self, step_id: &str) -> bool {
        self.disabled.contains(step_id)
    }

    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id() == step_id)
    }

    pub fn step(&self, step_id: &str) -> Option<&dyn StepDefinition> {
        self.index_of(step_id).map(|i| self.steps[i].as_ref())
    }

    /// Primer step habilitado: el activo de un flujo fresco.
    pub fn first_enabled_id(&self) -> Option<&str> {
        self.steps
            .iter()
            .map(|s| s.id())
            .find(|id| !self.is_disabled(id))
    }

    /// Siguiente step habilitado después de `step_id`, o `None` si es el
    /// último (completar ese step termina el flujo).
    pub fn next_after(&self, step_id: &str) -> Option<&str> {
        let idx = self.index_of(step_id)?;
        self.steps[idx + 1..].iter()
                             .map(|s| s.id())
                             .find(|id| !self.is_disabled(id))
    }

    /// Tabla explícita de transiciones legales: (step activo, siguiente).
    /// Los steps deshabilitados no aparecen; `None` marca el step final.
    pub fn transition_table(&self) -> Vec<(String, Option<String>)> {
        self.steps
            .iter()
            .map(|s| s.id())
            .filter(|id| !self.is_disabled(id))
            .map(|id| (id.to_string(), self.next_after(id).map(str::to_string)))
            .collect()
    }
}

impl std::fmt::Debug for FlowDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDefinition")
         .field("kind", &self.kind)
         .field("steps", &self.steps.iter().map(|s| s.id()).collect::<Vec<_>>())
         .field("disabled", &self.disabled)
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}

pub struct FlowDefinitionBuilder {
    kind: String,
    steps: Vec<Box<dyn StepDefinition>>,
    disabled: BTreeSet<String>,
    probe: Option<Box<dyn StatusProbe>>,
}

impl FlowDefinitionBuilder {
    pub fn step(mut self, step: impl StepDefinition + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn boxed_step(mut self, step: Box<dyn StepDefinition>) -> Self {
        self.steps.push(step);
        self
    }

    /// Excluye un step por regla de negocio (sólo alcanzable desde
    /// `Pending`, en construcción). Ids desconocidos se ignoran.
    pub fn disable(mut self, step_id: impl Into<String>) -> Self {
        self.disabled.insert(step_id.into());
        self
    }

    pub fn status_probe(mut self, probe: impl StatusProbe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Construye la definición y calcula su hash canónico (tipo + ids en
    /// orden + ids deshabilitados). El hash viaja en el snapshot para
    /// detectar restores contra una versión distinta del wizard.
    pub fn build(self) -> FlowDefinition {
        let ids: Vec<&str> = self.steps.iter().map(|s| s.id()).collect();
        debug_assert!(ids.iter().any(|id| !self.disabled.contains(*id)),
                      "flow definition needs at least one enabled step");
        let canonical = to_canonical_json(&json!({
                            "kind": self.kind,
                            "steps": ids,
                            "disabled": self.disabled.iter().collect::<Vec<_>>(),
                        }));
        FlowDefinition { kind: self.kind,
                         steps: self.steps,
                         disabled: self.disabled,
                         probe: self.probe,
                         definition_hash: hash_str(&canonical) }
    }
}
