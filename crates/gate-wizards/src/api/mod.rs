//! Contratos de backend por wizard.
//!
//! La API real es JSON sobre HTTPS y no es de este repositorio; aquí sólo
//! viven los traits que los steps invocan y las formas de respuesta que el
//! backend garantiza (ids opacos + enums de estado). La autenticación viaja
//! ambientalmente (cookie de sesión) y queda fuera de estos contratos.

pub mod certificate;
pub mod registration;
pub mod subscription;

pub use certificate::CertificateApi;
pub use registration::RegistrationApi;
pub use subscription::SubscriptionApi;
