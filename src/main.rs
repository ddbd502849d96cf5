//! Demo del controlador de flujos: recorre el wizard de suscripción de
//! punta a punta e imprime cada transición.
//!
//! Con `GATEWAY_API_URL` definido usa el backend real vía
//! `gate_client::GatewayClient`; sin él, el gateway simulado (y la demo
//! liquida el pago a mano para poder terminar sin red).

use std::sync::Arc;
use std::time::Duration;

use gate_core::{FlowController, FlowStore, RemoteStatus};
use gate_wizards::{subscription_flow, MockGateway, SubscriptionApi};
use serde_json::json;

fn print_state(state: &gate_core::FlowState) {
    let stepper: Vec<String> = state.steps
                                    .iter()
                                    .map(|s| format!("{} [{:?}]", s.step_id, s.status))
                                    .collect();
    println!("  -> current: {} | {}", state.current_step_id, stepper.join("  "));
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut mock: Option<Arc<MockGateway>> = None;
    let (api, store): (Arc<dyn SubscriptionApi>, Arc<dyn FlowStore>) =
        match std::env::var("GATEWAY_API_URL") {
            Ok(_) => {
                let client = Arc::new(gate_client::GatewayClient::from_env());
                (client.clone(), client)
            }
            Err(_) => {
                let gw = Arc::new(MockGateway::new());
                mock = Some(gw.clone());
                (gw.clone(), gw)
            }
        };
    let mut ctl = FlowController::new(subscription_flow(api), store);

    println!("== subscription wizard ==");
    print_state(ctl.initialize().await);

    let steps: Vec<(&str, serde_json::Value)> =
        vec![("generate-proposal", json!({ "company": "Acme GmbH", "plan": "enterprise", "seats": 250 })),
             ("issue-purchase-order", json!({ "poNumber": "PO-2026-031" })),
             ("generate-invoice", json!({})),
             ("process-payment", json!({ "method": "card" }))];

    for (step_id, input) in steps {
        match ctl.complete_step(step_id, input).await {
            Ok(state) => print_state(state),
            Err(e) => {
                eprintln!("step '{step_id}' failed: {e}");
                return;
            }
        }
    }

    // El pago liquida fuera de banda. Contra el mock se liquida a mano;
    // contra el backend real se sondea hasta observar un estado terminal.
    if let Some(gw) = &mock {
        let tx = ctl.state().entity_refs["transactionId"].clone();
        gw.settle_payment(&tx, RemoteStatus::Succeeded);
    }
    for _ in 0..10 {
        match ctl.refresh_remote_status().await {
            Ok(state) if state.remote_status.is_some_and(|s| s.is_terminal()) => {
                println!("  payment status: {:?}", state.remote_status);
                break;
            }
            Ok(_) => tokio::time::sleep(Duration::from_millis(500)).await,
            Err(e) => {
                eprintln!("status poll failed: {e}");
                return;
            }
        }
    }

    match ctl.complete_step("payment-status", json!({})).await {
        Ok(state) => {
            print_state(state);
            println!("flow completed: {}", state.completed);
            println!("entity refs: {:?}", state.entity_refs);
        }
        Err(e) => eprintln!("could not finish: {e}"),
    }
}
