use async_trait::async_trait;
use gate_core::{FlowError, RemoteStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCreated {
    pub subscription_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderIssued {
    pub purchase_order_id: String,
    pub verification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceGenerated {
    pub invoice_id: String,
    /// URL recuperable del documento generado.
    pub document_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub transaction_id: String,
    pub status: RemoteStatus,
}

/// Operaciones remotas del wizard de suscripción. Cada step consume el id
/// producido por el anterior: subscriptionId -> purchaseOrderId ->
/// invoiceId -> transactionId.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn generate_proposal(&self, proposal: &Value) -> Result<ProposalCreated, FlowError>;

    async fn issue_purchase_order(&self,
                                  subscription_id: &str,
                                  order: &Value)
                                  -> Result<PurchaseOrderIssued, FlowError>;

    async fn generate_invoice(&self,
                              subscription_id: &str,
                              purchase_order_id: &str)
                              -> Result<InvoiceGenerated, FlowError>;

    async fn process_payment(&self, invoice_id: &str, payment: &Value) -> Result<PaymentRecorded, FlowError>;

    /// Estado actual del pago; lo consume el sondeo (`StatusProbe`).
    async fn payment_status(&self, transaction_id: &str) -> Result<RemoteStatus, FlowError>;
}
