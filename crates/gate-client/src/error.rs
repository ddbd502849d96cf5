use gate_core::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Fallo de transporte (DNS, TLS, timeout). Transitorio.
    #[error("http transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// El gateway rechazó la operación: status no-2xx o `success: false`.
    /// Ambos casos son indistinguibles a propósito.
    #[error("gateway rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

// Hacia el controlador todo fallo del cliente es un fallo remoto
// transitorio: el estado del flujo no cambia y el usuario puede reintentar.
impl From<ClientError> for FlowError {
    fn from(e: ClientError) -> Self {
        FlowError::Remote(e.to_string())
    }
}
