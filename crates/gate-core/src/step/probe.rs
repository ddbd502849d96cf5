use async_trait::async_trait;

use crate::errors::FlowError;
use crate::model::RemoteStatus;

/// Sondeo del estado de una entidad cuyo desenlace ocurre fuera de banda
/// (p.ej. un pago que liquida un procesador externo).
///
/// El controlador lo invoca desde `refresh_remote_status`; el sondeo debe
/// ser idempotente y deja de ejecutarse al observar un estado terminal.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Clave dentro de `entity_refs` cuyo identificador se consulta.
    fn entity_key(&self) -> &str;

    async fn poll(&self, entity_id: &str) -> Result<RemoteStatus, FlowError>;
}
