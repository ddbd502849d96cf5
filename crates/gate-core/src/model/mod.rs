//! Modelo de estado del flujo: `FlowState`, slots de step y el snapshot
//! persistido por el backend.

mod snapshot;
mod state;

pub use snapshot::FlowSnapshot;
pub use state::{EntityRefs, FlowState, RemoteStatus, StepSlot};
