//! Frontera de restauración: de dónde sale un flujo en curso al montar la
//! página. El dueño durable es el backend; aquí sólo se define el contrato
//! de lectura más una implementación en memoria para tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::FlowError;
use crate::model::FlowSnapshot;

/// Fuente autoritativa de flujos en curso, indexados por tipo de flujo.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Recupera el snapshot en curso para `flow_kind`, si existe uno para
    /// la sesión actual.
    async fn fetch(&self, flow_kind: &str) -> Result<Option<FlowSnapshot>, FlowError>;
}

// El backend real suele compartirse entre la definición (steps) y el
// controlador; delegar a través de Arc evita un newtype en cada caller.
#[async_trait]
impl<T: FlowStore + ?Sized> FlowStore for std::sync::Arc<T> {
    async fn fetch(&self, flow_kind: &str) -> Result<Option<FlowSnapshot>, FlowError> {
        (**self).fetch(flow_kind).await
    }
}

/// Store en memoria: tests y demos siembran snapshots con `seed`.
#[derive(Default)]
pub struct InMemoryFlowStore {
    inner: Mutex<HashMap<String, FlowSnapshot>>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, flow_kind: impl Into<String>, snapshot: FlowSnapshot) {
        self.inner
            .lock()
            .expect("flow store mutex poisoned")
            .insert(flow_kind.into(), snapshot);
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn fetch(&self, flow_kind: &str) -> Result<Option<FlowSnapshot>, FlowError> {
        Ok(self.inner
               .lock()
               .expect("flow store mutex poisoned")
               .get(flow_kind)
               .cloned())
    }
}
