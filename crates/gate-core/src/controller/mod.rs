//! Controlador de flujo: el motor que lleva al usuario a través de la
//! secuencia ordenada de steps de un wizard.

mod core;

pub use core::FlowController;
