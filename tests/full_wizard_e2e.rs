//! Prueba de integración a nivel workspace: el mismo cableado que usa la
//! demo (definición de gate-wizards + gateway compartido como store).

use std::sync::Arc;

use gate_core::{FlowController, StepStatus};
use gate_wizards::{certificate_flow, registration_flow, CertificateVariant, InstallMode, MockGateway};
use serde_json::json;

#[tokio::test]
async fn registration_then_certificate_on_one_gateway() {
    let gw = Arc::new(MockGateway::new());

    let mut reg = FlowController::new(registration_flow(gw.clone()), gw.clone());
    reg.initialize().await;
    reg.complete_step("email", json!({ "email": "admin@acme.example", "terms": true }))
       .await
       .unwrap();
    let code = gw.issued_otp().to_string();
    reg.complete_step("otp", json!({ "code": code })).await.unwrap();
    reg.complete_step("password", json!({ "password": "swordfish-9000", "confirm": "swordfish-9000" }))
       .await
       .unwrap();
    let state = reg.complete_step("invite", json!({ "accept": true })).await.unwrap();
    assert!(state.completed);

    // Con la cuenta creada, el mismo operador emite un certificado.
    let mut cert = FlowController::new(certificate_flow(gw.clone(),
                                                        CertificateVariant::SelfSigned,
                                                        InstallMode::Automatic),
                                       gw.clone());
    cert.initialize().await;
    cert.complete_step("details", json!({ "commonName": "swg.acme.example" })).await.unwrap();
    cert.complete_step("generate-certificate", json!({})).await.unwrap();
    let state = cert.complete_step("install-fleet", json!({})).await.unwrap();
    assert!(state.completed);
    assert_eq!(state.step("install-fleet").unwrap().status, StepStatus::Completed);

    // Cada página es dueña exclusiva de su FlowState: los refs no se cruzan.
    assert!(state.entity_refs.contains_key("certificateId"));
    assert!(!state.entity_refs.contains_key("accountId"));
}
