//! gate-client: adaptador JSON-sobre-HTTPS al backend del gateway.
//!
//! Implementa los contratos de `gate-wizards` (`RegistrationApi`,
//! `SubscriptionApi`, `CertificateApi`) y el `FlowStore` de gate-core
//! contra la API real. La autenticación viaja ambientalmente (cookie de
//! sesión en el jar del cliente); cualquier respuesta no-2xx o con
//! `{"success": false}` se trata como el mismo fallo remoto.

pub mod config;
pub mod error;
pub mod http;

pub use config::GatewayConfig;
pub use error::ClientError;
pub use http::GatewayClient;
