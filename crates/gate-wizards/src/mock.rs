//! Gateway simulado en memoria, determinista.
//!
//! Implementa los tres contratos de backend y `FlowStore` con ids
//! secuenciales, de modo que tests y demos puedan ejecutar wizards
//! completos sin red. Los fallos se inyectan por operación (`fail_next`) y
//! la liquidación de pagos se controla con `settle_payment`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use gate_core::{FlowError, FlowSnapshot, FlowStore, RemoteStatus};
use serde_json::Value;

use crate::api::certificate::{CertificateIssued, CertificateRequestCreated, CsrAccepted,
                              InstallScheduled};
use crate::api::registration::{AccountCreated, InviteResolved, OtpVerified, RegistrationStarted,
                               GENERIC_OTP_ERROR};
use crate::api::subscription::{InvoiceGenerated, PaymentRecorded, ProposalCreated,
                               PurchaseOrderIssued};
use crate::api::{CertificateApi, RegistrationApi, SubscriptionApi};

const MOCK_OTP: &str = "424242";

#[derive(Default)]
struct Inner {
    counter: u64,
    fail_next: HashSet<String>,
    registrations: HashSet<String>,
    subscriptions: HashSet<String>,
    payments: HashMap<String, RemoteStatus>,
    snapshots: HashMap<String, FlowSnapshot>,
}

#[derive(Default)]
pub struct MockGateway {
    inner: Mutex<Inner>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hace fallar la próxima invocación de `op` (nombre del método del
    /// trait) con un error remoto transitorio.
    pub fn fail_next(&self, op: &str) {
        self.lock().fail_next.insert(op.to_string());
    }

    /// Liquida (o rechaza) un pago en curso; lo observará el sondeo.
    pub fn settle_payment(&self, transaction_id: &str, status: RemoteStatus) {
        log::debug!("settling payment '{transaction_id}' as {status:?}");
        self.lock().payments.insert(transaction_id.to_string(), status);
    }

    /// Siembra un flujo en curso que `FlowStore::fetch` devolverá.
    pub fn seed_snapshot(&self, flow_kind: impl Into<String>, snapshot: FlowSnapshot) {
        self.lock().snapshots.insert(flow_kind.into(), snapshot);
    }

    /// El código que el gateway "envió por correo".
    pub fn issued_otp(&self) -> &'static str {
        MOCK_OTP
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock gateway mutex poisoned")
    }

    fn next_id(inner: &mut Inner, prefix: &str) -> String {
        inner.counter += 1;
        format!("{prefix}-{:04}", inner.counter)
    }

    fn gate(inner: &mut Inner, op: &str) -> Result<(), FlowError> {
        if inner.fail_next.remove(op) {
            log::debug!("injected failure for '{op}'");
            return Err(FlowError::Remote(format!("{op}: gateway unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionApi for MockGateway {
    async fn generate_proposal(&self, _proposal: &Value) -> Result<ProposalCreated, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "generate_proposal")?;
        let id = Self::next_id(&mut inner, "sub");
        inner.subscriptions.insert(id.clone());
        Ok(ProposalCreated { subscription_id: id,
                             status: "proposed".into() })
    }

    async fn issue_purchase_order(&self,
                                  subscription_id: &str,
                                  _order: &Value)
                                  -> Result<PurchaseOrderIssued, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "issue_purchase_order")?;
        if !inner.subscriptions.contains(subscription_id) {
            return Err(FlowError::Remote(format!("unknown subscription '{subscription_id}'")));
        }
        let id = Self::next_id(&mut inner, "po");
        Ok(PurchaseOrderIssued { purchase_order_id: id,
                                 verification: "verified".into() })
    }

    async fn generate_invoice(&self,
                              subscription_id: &str,
                              _purchase_order_id: &str)
                              -> Result<InvoiceGenerated, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "generate_invoice")?;
        if !inner.subscriptions.contains(subscription_id) {
            return Err(FlowError::Remote(format!("unknown subscription '{subscription_id}'")));
        }
        let id = Self::next_id(&mut inner, "inv");
        Ok(InvoiceGenerated { document_url: format!("https://gateway.local/invoices/{id}.pdf"),
                              invoice_id: id })
    }

    async fn process_payment(&self, _invoice_id: &str, _payment: &Value) -> Result<PaymentRecorded, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "process_payment")?;
        let id = Self::next_id(&mut inner, "tx");
        inner.payments.insert(id.clone(), RemoteStatus::Processing);
        Ok(PaymentRecorded { transaction_id: id,
                             status: RemoteStatus::Processing })
    }

    async fn payment_status(&self, transaction_id: &str) -> Result<RemoteStatus, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "payment_status")?;
        inner.payments
             .get(transaction_id)
             .copied()
             .ok_or_else(|| FlowError::Remote(format!("unknown transaction '{transaction_id}'")))
    }
}

#[async_trait]
impl RegistrationApi for MockGateway {
    async fn start_registration(&self, _email: &str) -> Result<RegistrationStarted, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "start_registration")?;
        let id = Self::next_id(&mut inner, "reg");
        inner.registrations.insert(id.clone());
        Ok(RegistrationStarted { registration_id: id })
    }

    async fn verify_otp(&self, registration_id: &str, code: &str) -> Result<OtpVerified, FlowError> {
        let mut inner = self.lock();
        // Registro desconocido y código incorrecto responden igual: el
        // mensaje no debe filtrar cuál de los dos pasó.
        if !inner.registrations.contains(registration_id) || code != MOCK_OTP {
            return Err(FlowError::Remote(GENERIC_OTP_ERROR.into()));
        }
        Self::gate(&mut inner, "verify_otp")
            .map_err(|_| FlowError::Remote(GENERIC_OTP_ERROR.into()))?;
        Ok(OtpVerified { registration_id: registration_id.to_string() })
    }

    async fn resend_otp(&self, _registration_id: &str) -> Result<(), FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "resend_otp").map_err(|_| FlowError::Remote(GENERIC_OTP_ERROR.into()))
    }

    async fn set_password(&self, registration_id: &str, _password: &str) -> Result<AccountCreated, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "set_password")?;
        if !inner.registrations.contains(registration_id) {
            return Err(FlowError::Remote(format!("unknown registration '{registration_id}'")));
        }
        let id = Self::next_id(&mut inner, "acct");
        Ok(AccountCreated { account_id: id })
    }

    async fn respond_to_invite(&self, _account_id: &str, accept: bool) -> Result<InviteResolved, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "respond_to_invite")?;
        Ok(InviteResolved { accepted: accept,
                            organization_id: accept.then(|| Self::next_id(&mut inner, "org")) })
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), FlowError> {
        // Siempre éxito genérico, exista o no la cuenta.
        Ok(())
    }
}

#[async_trait]
impl CertificateApi for MockGateway {
    async fn submit_details(&self, _details: &Value) -> Result<CertificateRequestCreated, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "submit_details")?;
        let id = Self::next_id(&mut inner, "req");
        Ok(CertificateRequestCreated { request_id: id })
    }

    async fn generate_self_signed(&self, _request_id: &str) -> Result<CertificateIssued, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "generate_self_signed")?;
        let id = Self::next_id(&mut inner, "cert");
        Ok(CertificateIssued { download_url: format!("https://gateway.local/certs/{id}.pem"),
                               certificate_id: id })
    }

    async fn upload_csr(&self, _request_id: &str, _csr_pem: &str) -> Result<CsrAccepted, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "upload_csr")?;
        let id = Self::next_id(&mut inner, "csr");
        Ok(CsrAccepted { csr_id: id })
    }

    async fn submit_to_authority(&self, _request_id: &str, _csr_id: &str) -> Result<CertificateIssued, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "submit_to_authority")?;
        let id = Self::next_id(&mut inner, "cert");
        Ok(CertificateIssued { download_url: format!("https://gateway.local/certs/{id}.pem"),
                               certificate_id: id })
    }

    async fn push_to_fleet(&self, _certificate_id: &str) -> Result<InstallScheduled, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "push_to_fleet")?;
        let id = Self::next_id(&mut inner, "job");
        Ok(InstallScheduled { job_id: id })
    }
}

#[async_trait]
impl FlowStore for MockGateway {
    async fn fetch(&self, flow_kind: &str) -> Result<Option<FlowSnapshot>, FlowError> {
        let mut inner = self.lock();
        Self::gate(&mut inner, "fetch_flow")?;
        Ok(inner.snapshots.get(flow_kind).cloned())
    }
}
