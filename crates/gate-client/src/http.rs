//! Cliente HTTP del gateway.
//!
//! Toda respuesta viaja en un sobre `{"success": bool, "message": ...,
//! "data": ...}`; un status no-2xx y un `success: false` colapsan en el
//! mismo `ClientError::Api`. El jar de cookies transporta la sesión; este
//! módulo no sabe nada de credenciales.

use std::time::Duration;

use async_trait::async_trait;
use gate_core::{FlowError, FlowSnapshot, FlowStore, RemoteStatus};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use gate_wizards::api::certificate::{CertificateIssued, CertificateRequestCreated, CsrAccepted,
                                     InstallScheduled};
use gate_wizards::api::registration::{AccountCreated, InviteResolved, OtpVerified,
                                      RegistrationStarted};
use gate_wizards::api::subscription::{InvoiceGenerated, PaymentRecorded, ProposalCreated,
                                      PurchaseOrderIssued};
use gate_wizards::{CertificateApi, RegistrationApi, SubscriptionApi};

use crate::config::GatewayConfig;
use crate::error::ClientError;

pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn from_env() -> Self {
        Self::new(GatewayConfig::from_env())
    }

    pub fn new(config: GatewayConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .cookie_store(true) // sesión ambiental
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http,
               base_url: config.base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ClientError> {
        log::debug!("POST {path}");
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let data = interpret(status, &text)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Variante para operaciones sin payload de respuesta útil.
    async fn post_unit(&self, path: &str, body: &Value) -> Result<(), ClientError> {
        let _: Value = self.post(path, body).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        log::debug!("GET {path}");
        let resp = self.http.get(self.url(path)).send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let data = interpret(status, &text)?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Aplica la política de sobre: no-2xx o `success: false` son el mismo
/// fallo; en éxito devuelve `data` (o el cuerpo entero si no hay sobre).
fn interpret(status: u16, body: &str) -> Result<Value, ClientError> {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let success_flag = parsed.get("success").and_then(Value::as_bool).unwrap_or(true);
    if !(200..300).contains(&status) || !success_flag {
        let message = parsed.get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("request failed")
                            .to_string();
        return Err(ClientError::Api { status, message });
    }
    Ok(parsed.get("data").cloned().unwrap_or(parsed))
}

#[derive(Deserialize)]
struct StatusBody {
    status: RemoteStatus,
}

#[async_trait]
impl SubscriptionApi for GatewayClient {
    async fn generate_proposal(&self, proposal: &Value) -> Result<ProposalCreated, FlowError> {
        Ok(self.post("/api/v1/subscriptions/proposals", proposal).await?)
    }

    async fn issue_purchase_order(&self,
                                  subscription_id: &str,
                                  order: &Value)
                                  -> Result<PurchaseOrderIssued, FlowError> {
        Ok(self.post(&format!("/api/v1/subscriptions/{subscription_id}/purchase-orders"), order)
               .await?)
    }

    async fn generate_invoice(&self,
                              subscription_id: &str,
                              purchase_order_id: &str)
                              -> Result<InvoiceGenerated, FlowError> {
        Ok(self.post("/api/v1/invoices",
                     &json!({ "subscriptionId": subscription_id, "purchaseOrderId": purchase_order_id }))
               .await?)
    }

    async fn process_payment(&self, invoice_id: &str, payment: &Value) -> Result<PaymentRecorded, FlowError> {
        Ok(self.post(&format!("/api/v1/invoices/{invoice_id}/payments"), payment).await?)
    }

    async fn payment_status(&self, transaction_id: &str) -> Result<RemoteStatus, FlowError> {
        let body: StatusBody = self.get(&format!("/api/v1/payments/{transaction_id}/status")).await?;
        Ok(body.status)
    }
}

#[async_trait]
impl RegistrationApi for GatewayClient {
    async fn start_registration(&self, email: &str) -> Result<RegistrationStarted, FlowError> {
        Ok(self.post("/api/v1/registrations", &json!({ "email": email })).await?)
    }

    async fn verify_otp(&self, registration_id: &str, code: &str) -> Result<OtpVerified, FlowError> {
        // El backend responde con un mensaje genérico para código inválido
        // y para fallo de reenvío; se propaga tal cual, sin refinar.
        Ok(self.post(&format!("/api/v1/registrations/{registration_id}/verify-otp"),
                     &json!({ "code": code }))
               .await?)
    }

    async fn resend_otp(&self, registration_id: &str) -> Result<(), FlowError> {
        Ok(self.post_unit(&format!("/api/v1/registrations/{registration_id}/resend-otp"), &json!({}))
               .await?)
    }

    async fn set_password(&self, registration_id: &str, password: &str) -> Result<AccountCreated, FlowError> {
        Ok(self.post(&format!("/api/v1/registrations/{registration_id}/password"),
                     &json!({ "password": password }))
               .await?)
    }

    async fn respond_to_invite(&self, account_id: &str, accept: bool) -> Result<InviteResolved, FlowError> {
        Ok(self.post(&format!("/api/v1/accounts/{account_id}/invite"), &json!({ "accept": accept }))
               .await?)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), FlowError> {
        // El backend siempre responde éxito genérico; no hay nada que
        // interpretar más allá del transporte.
        Ok(self.post_unit("/api/v1/password-resets", &json!({ "email": email })).await?)
    }
}

#[async_trait]
impl CertificateApi for GatewayClient {
    async fn submit_details(&self, details: &Value) -> Result<CertificateRequestCreated, FlowError> {
        Ok(self.post("/api/v1/certificates/requests", details).await?)
    }

    async fn generate_self_signed(&self, request_id: &str) -> Result<CertificateIssued, FlowError> {
        Ok(self.post(&format!("/api/v1/certificates/requests/{request_id}/self-signed"), &json!({}))
               .await?)
    }

    async fn upload_csr(&self, request_id: &str, csr_pem: &str) -> Result<CsrAccepted, FlowError> {
        Ok(self.post(&format!("/api/v1/certificates/requests/{request_id}/csr"),
                     &json!({ "csrPem": csr_pem }))
               .await?)
    }

    async fn submit_to_authority(&self, request_id: &str, csr_id: &str) -> Result<CertificateIssued, FlowError> {
        Ok(self.post(&format!("/api/v1/certificates/requests/{request_id}/authority"),
                     &json!({ "csrId": csr_id }))
               .await?)
    }

    async fn push_to_fleet(&self, certificate_id: &str) -> Result<InstallScheduled, FlowError> {
        Ok(self.post(&format!("/api/v1/certificates/{certificate_id}/install"), &json!({}))
               .await?)
    }
}

#[async_trait]
impl FlowStore for GatewayClient {
    async fn fetch(&self, flow_kind: &str) -> Result<Option<FlowSnapshot>, FlowError> {
        let path = format!("/api/v1/flows/{flow_kind}/current");
        let resp = self.http
                       .get(self.url(&path))
                       .send()
                       .await
                       .map_err(ClientError::from)?;
        // 404 significa "no hay flujo en curso", no un error.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(ClientError::from)?;
        let data = interpret(status, &text).map_err(ClientError::from)?;
        let snapshot: FlowSnapshot = serde_json::from_value(data).map_err(ClientError::from)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_yields_data() {
        let data = interpret(200, r#"{"success": true, "data": {"subscription_id": "sub-1"}}"#).unwrap();
        assert_eq!(data["subscription_id"], "sub-1");
    }

    #[test]
    fn bare_body_without_envelope_passes_through() {
        let data = interpret(200, r#"{"subscription_id": "sub-1"}"#).unwrap();
        assert_eq!(data["subscription_id"], "sub-1");
    }

    #[test]
    fn non_2xx_and_success_false_collapse_into_the_same_failure() {
        let from_status = interpret(502, r#"{"message": "upstream down"}"#).unwrap_err();
        let from_flag = interpret(200, r#"{"success": false, "message": "upstream down"}"#).unwrap_err();
        let (ClientError::Api { message: a, .. }, ClientError::Api { message: b, .. }) =
            (from_status, from_flag)
        else {
            panic!("both must be Api errors");
        };
        assert_eq!(a, b);
    }

    #[test]
    fn non_json_error_page_still_maps_to_api_error() {
        let err = interpret(500, "<html>Internal Server Error</html>").unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
    }

    #[test]
    fn client_errors_become_transient_flow_errors() {
        let e: FlowError = ClientError::Api { status: 401,
                                              message: "session expired".into() }.into();
        assert!(matches!(e, FlowError::Remote(_)));
    }
}
