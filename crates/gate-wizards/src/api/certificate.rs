use async_trait::async_trait;
use gate_core::FlowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRequestCreated {
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrAccepted {
    pub csr_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateIssued {
    pub certificate_id: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallScheduled {
    pub job_id: String,
}

/// Operaciones remotas del wizard de certificados. La criptografía ocurre
/// del lado del gateway; aquí sólo se mueven formularios e ids.
#[async_trait]
pub trait CertificateApi: Send + Sync {
    async fn submit_details(&self, details: &Value) -> Result<CertificateRequestCreated, FlowError>;

    /// Variante self-signed: el gateway genera y firma.
    async fn generate_self_signed(&self, request_id: &str) -> Result<CertificateIssued, FlowError>;

    /// Variante enterprise: el operador sube un CSR emitido por su CA.
    async fn upload_csr(&self, request_id: &str, csr_pem: &str) -> Result<CsrAccepted, FlowError>;

    async fn submit_to_authority(&self, request_id: &str, csr_id: &str) -> Result<CertificateIssued, FlowError>;

    /// Programa la instalación del certificado en la flota de instancias.
    async fn push_to_fleet(&self, certificate_id: &str) -> Result<InstallScheduled, FlowError>;
}
