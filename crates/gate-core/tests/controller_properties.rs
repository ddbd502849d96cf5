//! Propiedades del controlador contra steps guionados y stores en memoria.

mod support;

use std::sync::atomic::Ordering;

use async_trait::async_trait;
use gate_core::{FlowController, FlowError, FlowSnapshot, FlowStore, InMemoryFlowStore,
                RemoteStatus, StepStatus};
use serde_json::json;
use support::{assert_single_in_progress, linear_definition, ScriptedProbe, ScriptedStep};
use uuid::Uuid;

fn controller(ids: &[&'static str]) -> FlowController<InMemoryFlowStore> {
    FlowController::new(linear_definition("test", ids), InMemoryFlowStore::new())
}

#[tokio::test]
async fn fresh_flow_starts_at_first_step() {
    let mut ctl = controller(&["one", "two", "three"]);
    let state = ctl.initialize().await;
    assert_eq!(state.current_step_id, "one");
    assert!(state.step("one").unwrap().accessible);
    assert_eq!(state.step("two").unwrap().status, StepStatus::Pending);
    assert!(!state.step("two").unwrap().accessible);
    assert_single_in_progress(state);
}

#[tokio::test]
async fn completing_inactive_step_never_mutates_state() {
    let mut ctl = controller(&["one", "two"]);
    ctl.initialize().await;
    let before = ctl.state().clone();

    let err = ctl.complete_step("two", json!({})).await.unwrap_err();
    assert_eq!(err, FlowError::StepNotActive("two".into()));
    assert_eq!(*ctl.state(), before);

    let err = ctl.complete_step("nope", json!({})).await.unwrap_err();
    assert_eq!(err, FlowError::UnknownStep("nope".into()));
    assert_eq!(*ctl.state(), before);
}

#[tokio::test]
async fn successful_completion_advances_and_unlocks() {
    let mut ctl = controller(&["one", "two", "three"]);
    ctl.initialize().await;

    let state = ctl.complete_step("one", json!({"plan": "pro"})).await.unwrap();
    assert_eq!(state.step("one").unwrap().status, StepStatus::Completed);
    assert_eq!(state.current_step_id, "two");
    assert!(state.step("two").unwrap().accessible);
    assert_eq!(state.entity_refs.get("primaryId").map(String::as_str), Some("ent-0001"));
    assert!(state.collected_data.contains_key("one"));
    assert_single_in_progress(state);
}

#[tokio::test]
async fn failed_completion_leaves_state_untouched_but_for_error_signal() {
    let mut ctl = controller(&["one", "two"]);
    ctl.initialize().await;
    let before = ctl.state().clone();

    let err = ctl.complete_step("one", json!({"fail_remote": true})).await.unwrap_err();
    assert!(matches!(err, FlowError::Remote(_)));

    // Bit a bit idéntico salvo la señal transitoria de error.
    let mut after = ctl.state().clone();
    assert_eq!(after.last_error.as_deref(),
               Some("remote operation failed: scripted remote failure"));
    after.last_error = None;
    assert_eq!(after, before);
    assert!(!ctl.state().is_loading);

    // El step sigue activo y el reintento funciona.
    let state = ctl.complete_step("one", json!({})).await.unwrap();
    assert_eq!(state.current_step_id, "two");
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn validation_failure_never_reaches_the_remote_boundary() {
    // Un submit que llegara a ejecutarse marcaría el step completado; que
    // el estado no cambie prueba que la red nunca se tocó.
    let mut ctl = controller(&["one", "two"]);
    ctl.initialize().await;
    let before = ctl.state().clone();

    let err = ctl.complete_step("one", json!({"invalid": true})).await.unwrap_err();
    assert_eq!(err, FlowError::Validation("scripted invalid input".into()));
    assert_eq!(*ctl.state(), before);
}

#[tokio::test]
async fn go_to_step_is_a_noop_unless_accessible() {
    let mut ctl = controller(&["one", "two", "three"]);
    ctl.initialize().await;
    let before = ctl.state().clone();

    // "three" todavía no es accesible: rehúsa en silencio.
    ctl.go_to_step("three");
    assert_eq!(*ctl.state(), before);

    ctl.complete_step("one", json!({})).await.unwrap();
    ctl.complete_step("two", json!({})).await.unwrap();
    assert_eq!(ctl.state().current_step_id, "three");

    // Atrás hacia un step completado: pasa a ser el activo de nuevo.
    let state = ctl.go_to_step("one");
    assert_eq!(state.current_step_id, "one");
    assert_eq!(state.step("one").unwrap().status, StepStatus::InProgress);
    assert_eq!(state.step("three").unwrap().status, StepStatus::Pending);
    assert!(state.step("three").unwrap().accessible, "accessibility survives back-navigation");
    assert_single_in_progress(state);

    // Los datos recolectados no se invalidan al navegar hacia atrás.
    assert!(state.collected_data.contains_key("two"));
}

#[tokio::test]
async fn recompleting_an_earlier_step_overwrites_its_data() {
    let mut ctl = controller(&["one", "two"]);
    ctl.initialize().await;
    ctl.complete_step("one", json!({"v": 1})).await.unwrap();
    ctl.go_to_step("one");

    let state = ctl.complete_step("one", json!({"v": 2})).await.unwrap();
    assert_eq!(state.collected_data["one"]["echo"]["v"], json!(2));
    assert_eq!(state.current_step_id, "two");
}

#[tokio::test]
async fn refresh_remote_status_is_idempotent_and_stops_on_terminal() {
    let (probe, statuses, polls) = ScriptedProbe::new("primaryId");
    let definition = gate_core::FlowDefinition::builder("test")
        .step(ScriptedStep::with_ref("pay", "primaryId", "tx-0001"))
        .step(ScriptedStep::new("status"))
        .status_probe(probe)
        .build();
    let mut ctl = FlowController::new(definition, InMemoryFlowStore::new());
    ctl.initialize().await;

    // Sin entity ref todavía: no va a la red.
    ctl.refresh_remote_status().await.unwrap();
    assert_eq!(polls.load(Ordering::SeqCst), 0);

    ctl.complete_step("pay", json!({})).await.unwrap();
    statuses.lock().unwrap().push_back(RemoteStatus::Processing);

    let state = ctl.refresh_remote_status().await.unwrap();
    assert_eq!(state.remote_status, Some(RemoteStatus::Processing));
    let events_after_first = ctl.events().len();

    // Segundo sondeo sin cambio: mismo estado derivado, sin mutación ni
    // evento nuevo, sin tocar is_loading.
    let state = ctl.refresh_remote_status().await.unwrap();
    assert_eq!(state.remote_status, Some(RemoteStatus::Processing));
    assert!(!state.is_loading);
    assert_eq!(ctl.events().len(), events_after_first);

    statuses.lock().unwrap().push_back(RemoteStatus::Succeeded);
    let state = ctl.refresh_remote_status().await.unwrap();
    assert_eq!(state.remote_status, Some(RemoteStatus::Succeeded));

    // Terminal observado: más llamadas no sondean.
    let polls_at_terminal = polls.load(Ordering::SeqCst);
    ctl.refresh_remote_status().await.unwrap();
    ctl.refresh_remote_status().await.unwrap();
    assert_eq!(polls.load(Ordering::SeqCst), polls_at_terminal);
}

#[tokio::test]
async fn initialize_restores_a_halfway_flow_exactly() {
    let definition = linear_definition("test", &["one", "two", "three"]);
    let hash = definition.definition_hash().to_string();

    let store = InMemoryFlowStore::new();
    let flow_id = Uuid::new_v4();
    store.seed("test",
               FlowSnapshot { flow_id,
                              definition_hash: hash,
                              current_step_id: "two".into(),
                              completed_steps: vec!["one".into()],
                              collected_data: [("one".to_string(), json!({"plan": "pro"}))].into_iter()
                                                                                          .collect(),
                              entity_refs: [("primaryId".to_string(), "ent-0001".to_string())].into_iter()
                                                                                              .collect(),
                              remote_status: None });

    let mut ctl = FlowController::new(definition, store);
    let state = ctl.initialize().await;
    assert_eq!(state.flow_id, flow_id);
    assert_eq!(state.current_step_id, "two");
    assert_eq!(state.step("one").unwrap().status, StepStatus::Completed);
    assert!(state.step("one").unwrap().accessible);
    assert_eq!(state.collected_data["one"], json!({"plan": "pro"}));
    assert_eq!(state.entity_refs["primaryId"], "ent-0001");
    assert!(!state.is_loading);
    assert_single_in_progress(state);
}

#[tokio::test]
async fn initialize_degrades_on_snapshot_mismatch_or_store_failure() {
    // Snapshot de otra versión del wizard: hash distinto.
    let definition = linear_definition("test", &["one", "two"]);
    let store = InMemoryFlowStore::new();
    store.seed("test",
               FlowSnapshot { flow_id: Uuid::new_v4(),
                              definition_hash: "stale".into(),
                              current_step_id: "two".into(),
                              completed_steps: vec!["one".into()],
                              collected_data: Default::default(),
                              entity_refs: Default::default(),
                              remote_status: None });
    let mut ctl = FlowController::new(definition, store);
    let state = ctl.initialize().await;
    assert_eq!(state.current_step_id, "one");
    assert!(state.collected_data.is_empty());

    // Backend caído: nunca falla el montaje, arranca fresco.
    struct DownStore;
    #[async_trait]
    impl FlowStore for DownStore {
        async fn fetch(&self, _kind: &str) -> Result<Option<FlowSnapshot>, FlowError> {
            Err(FlowError::Remote("connection refused".into()))
        }
    }
    let mut ctl = FlowController::new(linear_definition("test", &["one", "two"]), DownStore);
    let state = ctl.initialize().await;
    assert_eq!(state.current_step_id, "one");
    assert_single_in_progress(state);
}

#[tokio::test]
async fn refused_operations_stay_observable_in_the_event_log() {
    let mut ctl = controller(&["one", "two"]);
    ctl.initialize().await;

    let _ = ctl.complete_step("two", json!({})).await;
    ctl.go_to_step("two");

    use gate_core::FlowEventKind;
    assert!(ctl.events()
               .iter()
               .any(|e| matches!(&e.kind, FlowEventKind::StepRejected { step_id, .. } if step_id == "two")));
    assert!(ctl.events()
               .iter()
               .any(|e| matches!(&e.kind, FlowEventKind::NavigationRefused { target } if target == "two")));
}

#[tokio::test]
async fn completing_the_final_step_finishes_the_flow() {
    let mut ctl = controller(&["one", "two"]);
    ctl.initialize().await;
    ctl.complete_step("one", json!({})).await.unwrap();
    let state = ctl.complete_step("two", json!({})).await.unwrap();
    assert!(state.completed);
    assert_eq!(state.step("two").unwrap().status, StepStatus::Completed);
    assert_single_in_progress(state);

    let err = ctl.complete_step("two", json!({})).await.unwrap_err();
    assert_eq!(err, FlowError::FlowCompleted);
}
