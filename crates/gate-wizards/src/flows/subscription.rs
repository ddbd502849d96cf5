//! Wizard de suscripción: generate-proposal -> issue-purchase-order ->
//! generate-invoice -> process-payment -> payment-status.
//!
//! Los ids opacos se encadenan vía `entity_refs`: cada step necesita el que
//! produjo el anterior. El último step no tiene operación propia de
//! escritura: observa el desenlace del pago, que liquida fuera de banda
//! (de ahí la `PaymentStatusProbe`).

use std::sync::Arc;

use async_trait::async_trait;
use gate_core::{EntityRefs, FlowDefinition, FlowError, RemoteStatus, StatusProbe, StepDefinition,
                StepOutcome};
use serde_json::{json, Value};

use super::forms::{require_ref, require_str, require_u64};
use crate::api::SubscriptionApi;

pub const FLOW_KIND: &str = "subscription";

/// Arma la definición del wizard de suscripción sobre el backend dado.
pub fn subscription_flow(api: Arc<dyn SubscriptionApi>) -> FlowDefinition {
    FlowDefinition::builder(FLOW_KIND)
        .step(GenerateProposalStep { api: api.clone() })
        .step(IssuePurchaseOrderStep { api: api.clone() })
        .step(GenerateInvoiceStep { api: api.clone() })
        .step(ProcessPaymentStep { api: api.clone() })
        .step(PaymentStatusStep { api: api.clone() })
        .status_probe(PaymentStatusProbe { api })
        .build()
}

struct GenerateProposalStep {
    api: Arc<dyn SubscriptionApi>,
}

#[async_trait]
impl StepDefinition for GenerateProposalStep {
    fn id(&self) -> &str {
        "generate-proposal"
    }

    fn title(&self) -> &str {
        "Generate proposal"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        require_str(input, "company")?;
        require_str(input, "plan")?;
        if require_u64(input, "seats")? == 0 {
            return Err(FlowError::Validation("'seats' must be at least 1".into()));
        }
        Ok(())
    }

    async fn submit(&self, input: &Value, _refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let created = self.api.generate_proposal(input).await?;
        Ok(StepOutcome::new(json!({
               "proposal": input,
               "status": created.status,
           })).with_ref("subscriptionId", created.subscription_id))
    }
}

struct IssuePurchaseOrderStep {
    api: Arc<dyn SubscriptionApi>,
}

#[async_trait]
impl StepDefinition for IssuePurchaseOrderStep {
    fn id(&self) -> &str {
        "issue-purchase-order"
    }

    fn title(&self) -> &str {
        "Issue purchase order"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        require_str(input, "poNumber")?;
        Ok(())
    }

    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let subscription_id = require_ref(refs, "subscriptionId")?;
        let issued = self.api.issue_purchase_order(subscription_id, input).await?;
        Ok(StepOutcome::new(json!({
               "order": input,
               "verification": issued.verification,
           })).with_ref("purchaseOrderId", issued.purchase_order_id))
    }
}

struct GenerateInvoiceStep {
    api: Arc<dyn SubscriptionApi>,
}

#[async_trait]
impl StepDefinition for GenerateInvoiceStep {
    fn id(&self) -> &str {
        "generate-invoice"
    }

    fn title(&self) -> &str {
        "Generate invoice"
    }

    // La factura se deriva por completo de la suscripción: el formulario va
    // vacío a propósito.
    fn validate(&self, _input: &Value) -> Result<(), FlowError> {
        Ok(())
    }

    async fn submit(&self, _input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let subscription_id = require_ref(refs, "subscriptionId")?;
        let purchase_order_id = require_ref(refs, "purchaseOrderId")?;
        let invoice = self.api.generate_invoice(subscription_id, purchase_order_id).await?;
        Ok(StepOutcome::new(json!({
               "documentUrl": invoice.document_url,
           })).with_ref("invoiceId", invoice.invoice_id))
    }
}

struct ProcessPaymentStep {
    api: Arc<dyn SubscriptionApi>,
}

#[async_trait]
impl StepDefinition for ProcessPaymentStep {
    fn id(&self) -> &str {
        "process-payment"
    }

    fn title(&self) -> &str {
        "Process payment"
    }

    fn validate(&self, input: &Value) -> Result<(), FlowError> {
        require_str(input, "method")?;
        Ok(())
    }

    async fn submit(&self, input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let invoice_id = require_ref(refs, "invoiceId")?;
        let recorded = self.api.process_payment(invoice_id, input).await?;
        Ok(StepOutcome::new(json!({
               "method": input["method"],
               "status": recorded.status,
           })).with_ref("transactionId", recorded.transaction_id)
              .with_remote_status(recorded.status))
    }
}

/// Step terminal de observación: sólo puede completarse cuando el pago ya
/// liquidó. Un pago rechazado queda como estado terminal visible para que
/// el usuario remedie (reintentar, soporte); no avanza solo.
struct PaymentStatusStep {
    api: Arc<dyn SubscriptionApi>,
}

#[async_trait]
impl StepDefinition for PaymentStatusStep {
    fn id(&self) -> &str {
        "payment-status"
    }

    fn title(&self) -> &str {
        "Payment status"
    }

    fn validate(&self, _input: &Value) -> Result<(), FlowError> {
        Ok(())
    }

    async fn submit(&self, _input: &Value, refs: &EntityRefs) -> Result<StepOutcome, FlowError> {
        let transaction_id = require_ref(refs, "transactionId")?;
        match self.api.payment_status(transaction_id).await? {
            RemoteStatus::Succeeded => {
                Ok(StepOutcome::new(json!({"status": RemoteStatus::Succeeded}))
                    .with_remote_status(RemoteStatus::Succeeded))
            }
            RemoteStatus::Processing => Err(FlowError::Remote("payment is still processing".into())),
            RemoteStatus::Failed => Err(FlowError::Remote("payment was rejected".into())),
        }
    }
}

struct PaymentStatusProbe {
    api: Arc<dyn SubscriptionApi>,
}

#[async_trait]
impl StatusProbe for PaymentStatusProbe {
    fn entity_key(&self) -> &str {
        "transactionId"
    }

    async fn poll(&self, entity_id: &str) -> Result<RemoteStatus, FlowError> {
        self.api.payment_status(entity_id).await
    }
}
