//! gate-wizards: catálogo de wizards del panel de administración.
//!
//! Cada wizard es una `FlowDefinition` de gate-core: registro de cuenta,
//! alta de suscripción (facturación) y emisión de certificados (con sus dos
//! variantes). Este crate declara además los contratos de backend que cada
//! step invoca (`RegistrationApi`, `SubscriptionApi`, `CertificateApi`) y un
//! gateway simulado determinista (`MockGateway`) para tests y demos.

pub mod api;
pub mod flows;
pub mod mock;

pub use api::{CertificateApi, RegistrationApi, SubscriptionApi};
pub use flows::certificate::{certificate_flow, CertificateVariant, InstallMode};
pub use flows::registration::registration_flow;
pub use flows::subscription::subscription_flow;
pub use mock::MockGateway;
