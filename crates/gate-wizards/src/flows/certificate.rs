//! Wizard de certificados con bifurcación por variante.
//!
//! La rama se elige una sola vez, con un selector explícito del usuario
//! (`CertificateVariant`), y cada variante tiene su propia lista ordenada
//! de steps; el controlador nunca ve la bifurcación. `InstallMode::Manual`
//! deshabilita el step de instalación en flota (rama "instalación manual").

use std::sync::Arc;

use async_trait::async_trait;
use gate_core::{EntityRefs, FlowDefinition, FlowError, StepDefinition, StepOutcome};
use serde_json::{json, Value};

use super::forms::{require_ref, require_str};
use crate::api::CertificateApi;

/// Selector de rama, elegido por el usuario antes de montar el wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateVariant {
    /// El gateway genera y firma el certificado.
    SelfSigned,
    /// El operador trae un CSR de su propia CA.
    EnterpriseCa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    Automatic,
    /// El operador instala a mano: el step de flota queda deshabilitado.
    Manual,
}

pub fn certificate_flow(api: Arc<dyn CertificateApi>,
                        variant: CertificateVariant,
                        install: InstallMode)
                        -> FlowDefinition {
    let kind = match variant {
        CertificateVariant::SelfSigned => "certificate:self_signed",
        CertificateVariant::EnterpriseCa => "certificate:enterprise_ca",
    };
    let builder = FlowDefinition::builder(kind).step(DetailsStep { api: api.clone() });
    let builder = match variant {
        CertificateVariant::SelfSigned => builder.step(GenerateSelfSignedStep { api: api.clone() }),
        CertificateVariant::EnterpriseCa => {
            builder.step(UploadCsrStep { api: api.clone() })
                   .step(SubmitToAuthorityStep { api: api.clone() })
        }
    };
    let builder = builder.step(InstallFleetStep { api });
    match install {
        InstallMode::Automatic => builder.build(),
        InstallMode::Manual => builder.disable("install-fleet").build(),
    }
}

struct DetailsStep {
    api: Arc<dyn CertificateApi>,
}

#[async_trait]
impl StepDefinition for DetailsStep {
    fn id(&self) -> &str {
        "details"
    }

    fn title(&self) -> &str {
        "Certificate details"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        let cn = require_str(input, "commonName")?;
        if !cn.contains('.') || cn.contains(char::is_whitespace) {
            return Err(FlowError::Validation("'commonName' must be a hostname".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, _refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let created = self.api.submit_details(input).await?;
        Ok(StepOutcome::new(json!({ "details": input })).with_ref("requestId", created.request_id))
    }
}

struct GenerateSelfSignedStep {
    api: Arc<dyn CertificateApi>,
}

#[async_trait]
impl StepDefinition for GenerateSelfSignedStep {
    fn id(&self) -> &str {
        "generate-certificate"
    }

    fn title(&self) -> &str {
        "Generate certificate"
    }

    fn validate(&self, _input: &Value) -> Result<(), FlowError> {
        Ok(())
    }

    async fn submit(&self, _input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let request_id = require_ref(refs, "requestId")?;
        let issued = self.api.generate_self_signed(request_id).await?;
        Ok(StepOutcome::new(json!({
               "downloadUrl": issued.download_url,
           })).with_ref("certificateId", issued.certificate_id))
    }
}

struct UploadCsrStep {
    api: Arc<dyn CertificateApi>,
}

#[async_trait]
impl StepDefinition for UploadCsrStep {
    fn id(&self) -> &str {
        "upload-csr"
    }

    fn title(&self) -> &str {
        "Upload CSR"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        let pem = require_str(input, "csrPem")?;
        if !pem.trim_start().starts_with("-----BEGIN CERTIFICATE REQUEST-----") {
            return Err(FlowError::Validation("'csrPem' is not a PEM certificate request".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let request_id = require_ref(refs, "requestId")?;
        let pem = require_str(input, "csrPem")?;
        let accepted = self.api.upload_csr(request_id, pem).await?;
        Ok(StepOutcome::new(json!({ "csrUploaded": true })).with_ref("csrId", accepted.csr_id))
    }
}

struct SubmitToAuthorityStep {
    api: Arc<dyn CertificateApi>,
}

#[async_trait]
impl StepDefinition for SubmitToAuthorityStep {
    fn id(&self) -> &str {
        "submit-to-authority"
    }

    fn title(&self) -> &str {
        "Submit to CA"
    }

    fn validate(&self, _input: &Value) -> Result<(), FlowError> {
        Ok(())
    }

    async fn submit(&self, _input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let request_id = require_ref(refs, "requestId")?;
        let csr_id = require_ref(refs, "csrId")?;
        let issued = self.api.submit_to_authority(request_id, csr_id).await?;
        Ok(StepOutcome::new(json!({
               "downloadUrl": issued.download_url,
           })).with_ref("certificateId", issued.certificate_id))
    }
}

struct InstallFleetStep {
    api: Arc<dyn CertificateApi>,
}

#[async_trait]
impl StepDefinition for InstallFleetStep {
    fn id(&self) -> &str {
        "install-fleet"
    }

    fn title(&self) -> &str {
        "Install on fleet"
    }

    fn validate(&self, _input: &Value) -> Result<(), FlowError> {
        Ok(())
    }

    async fn submit(&self, _input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let certificate_id = require_ref(refs, "certificateId")?;
        let scheduled = self.api.push_to_fleet(certificate_id).await?;
        Ok(StepOutcome::new(json!({ "jobId": scheduled.job_id })))
    }
}
