//! Wizards concretos: cada módulo arma la `FlowDefinition` de su flujo y
//! define los steps con su esquema de input y su única operación remota.

pub mod certificate;
mod forms;
pub mod registration;
pub mod subscription;
