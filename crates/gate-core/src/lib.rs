//! gate-core: motor de wizards lineales del panel de administración.
//!
//! Un wizard es una secuencia ordenada y fija de steps; cada step renderiza
//! un formulario, ejecuta exactamente una operación remota al enviarse y,
//! en éxito, avanza el flujo y desbloquea el siguiente step. El dueño
//! durable del estado es el backend; este crate sólo mantiene el espejo en
//! memoria y sus invariantes.

pub mod controller;
pub mod definition;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod step;
pub mod store;

pub use controller::FlowController;
pub use definition::{FlowDefinition, FlowDefinitionBuilder};
pub use errors::FlowError;
pub use event::{FlowEvent, FlowEventKind};
pub use model::{EntityRefs, FlowSnapshot, FlowState, RemoteStatus, StepSlot};
pub use step::{StatusProbe, StepDefinition, StepOutcome, StepStatus};
pub use store::{FlowStore, InMemoryFlowStore};
