use async_trait::async_trait;
use serde_json::Value;

use super::StepOutcome;
use crate::errors::FlowError;
use crate::model::EntityRefs;

/// Trait que define un Step. El controlador nunca inspecciona el contenido
/// del input: la validación es responsabilidad del propio step.
#[async_trait]
pub trait StepDefinition: Send + Sync {
    /// Identificador estable y único dentro del flujo.
    fn id(&self) -> &str;

    /// Etiqueta de presentación. Ignorable por el core.
    fn title(&self) -> &str {
        self.id()
    }

    /// Valida el input del formulario contra el esquema del step.
    ///
    /// Debe fallar cerrado: un input inválido jamás llega a la red. Las
    /// reglas cruzadas (p.ej. "confirmación de contraseña igual a la
    /// contraseña") viven aquí, no en el controlador.
    fn validate(&self, input: &Value) -> Result<(), FlowError>;

    /// Ejecuta la única operación remota asociada al step.
    ///
    /// Recibe los `entity_refs` acumulados porque los steps no son
    /// independientes: cada uno suele necesitar el identificador producido
    /// por el anterior.
    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError>;
}
