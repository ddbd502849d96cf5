//! Wizard de registro: email -> otp -> password -> invite.
//!
//! El step de email exige aceptar los términos (regla cruzada, falla
//! cerrado). Un OTP incorrecto es un fallo remoto transitorio con mensaje
//! genérico; el step sigue activo y la UI limpia el campo y permite
//! reintentar o reenviar.

use std::sync::Arc;

use async_trait::async_trait;
use gate_core::{EntityRefs, FlowDefinition, FlowError, StepDefinition, StepOutcome};
use serde_json::{json, Value};

use super::forms::{require_bool, require_email, require_ref, require_str};
use crate::api::RegistrationApi;

pub const FLOW_KIND: &str = "registration";

pub fn registration_flow(api: Arc<dyn RegistrationApi>) -> FlowDefinition {
    FlowDefinition::builder(FLOW_KIND)
        .step(EmailStep { api: api.clone() })
        .step(OtpStep { api: api.clone() })
        .step(PasswordStep { api: api.clone() })
        .step(InviteStep { api })
        .build()
}

struct EmailStep {
    api: Arc<dyn RegistrationApi>,
}

#[async_trait]
impl StepDefinition for EmailStep {
    fn id(&self) -> &str {
        "email"
    }

    fn title(&self) -> &str {
        "Your email"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        require_email(input, "email")?;
        if !require_bool(input, "terms")? {
            return Err(FlowError::Validation("terms must be accepted".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, _refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let email = require_email(input, "email")?;
        let started = self.api.start_registration(email).await?;
        Ok(StepOutcome::new(json!({
               "email": email,
               "termsAccepted": true,
           })).with_ref("registrationId", started.registration_id))
    }
}

struct OtpStep {
    api: Arc<dyn RegistrationApi>,
}

#[async_trait]
impl StepDefinition for OtpStep {
    fn id(&self) -> &str {
        "otp"
    }

    fn title(&self) -> &str {
        "Verify code"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        let code = require_str(input, "code")?;
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FlowError::Validation("'code' must be six digits".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let registration_id = require_ref(refs, "registrationId")?;
        let code = require_str(input, "code")?;
        self.api.verify_otp(registration_id, code).await?;
        // El código nunca se guarda en collected_data.
        Ok(StepOutcome::new(json!({ "verified": true })))
    }
}

struct PasswordStep {
    api: Arc<dyn RegistrationApi>,
}

#[async_trait]
impl StepDefinition for PasswordStep {
    fn id(&self) -> &str {
        "password"
    }

    fn title(&self) -> &str {
        "Choose a password"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        let password = require_str(input, "password")?;
        if password.len() < 8 {
            return Err(FlowError::Validation("'password' must be at least 8 characters".into()));
        }
        // Regla cruzada clásica: la confirmación debe coincidir.
        if require_str(input, "confirm")? != password {
            return Err(FlowError::Validation("'confirm' must match 'password'".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let registration_id = require_ref(refs, "registrationId")?;
        let password = require_str(input, "password")?;
        let created = self.api.set_password(registration_id, password).await?;
        // La contraseña (hasheada por el backend) jamás queda en el estado.
        Ok(StepOutcome::new(json!({ "passwordSet": true })).with_ref("accountId", created.account_id))
    }
}

/// Resolución de la invitación de organización pendiente. Una invitación
/// declinada también se registra en collected_data: se retiene, no se purga.
struct InviteStep {
    api: Arc<dyn RegistrationApi>,
}

#[async_trait]
impl StepDefinition for InviteStep {
    fn id(&self) -> &str {
        "invite"
    }

    fn title(&self) -> &str {
        "Organization invite"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        require_bool(input, "accept")?;
        Ok(())
    }

    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let account_id = require_ref(refs, "accountId")?;
        let accept = require_bool(input, "accept")?;
        let resolved = self.api.respond_to_invite(account_id, accept).await?;
        let mut outcome = StepOutcome::new(json!({
            "accepted": resolved.accepted,
            "organizationId": resolved.organization_id.clone(),
        }));
        if let Some(org) = resolved.organization_id {
            outcome = outcome.with_ref("organizationId", org);
        }
        Ok(outcome)
    }
}
