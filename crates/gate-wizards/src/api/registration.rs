use async_trait::async_trait;
use gate_core::FlowError;
use serde::{Deserialize, Serialize};

/// Mensaje único para "código OTP inválido" y "no se pudo reenviar el
/// código". Es deliberado (prevención de enumeración de cuentas): el
/// backend no distingue los dos casos y este cliente tampoco debe hacerlo.
pub const GENERIC_OTP_ERROR: &str = "could not verify the code; request a new one and try again";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationStarted {
    pub registration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerified {
    pub registration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreated {
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteResolved {
    pub accepted: bool,
    pub organization_id: Option<String>,
}

/// Operaciones remotas del wizard de registro.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// Registra el email y dispara el envío del código OTP.
    async fn start_registration(&self, email: &str) -> Result<RegistrationStarted, FlowError>;

    /// Verifica el código. Un código incorrecto es un fallo transitorio con
    /// mensaje genérico ([`GENERIC_OTP_ERROR`]).
    async fn verify_otp(&self, registration_id: &str, code: &str) -> Result<OtpVerified, FlowError>;

    /// Reenvía el código. Falla con el mismo mensaje genérico que un código
    /// inválido.
    async fn resend_otp(&self, registration_id: &str) -> Result<(), FlowError>;

    async fn set_password(&self, registration_id: &str, password: &str) -> Result<AccountCreated, FlowError>;

    /// Acepta o declina la invitación de organización pendiente.
    async fn respond_to_invite(&self, account_id: &str, accept: bool) -> Result<InviteResolved, FlowError>;

    /// Inicia el reset de contraseña. Responde éxito genérico exista o no
    /// la cuenta; nunca revela si el email está registrado.
    async fn request_password_reset(&self, email: &str) -> Result<(), FlowError>;
}
