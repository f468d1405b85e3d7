//! EVSE status synchronization end to end, through the real invoker

mod common;

use std::sync::Arc;

use wiremock::{MockServer, ResponseTemplate};

use common::*;
use oicp_cpo::domain::{Acknowledgement, EvseId, EvseStatus, StatusDiff, StatusSnapshot};
use oicp_cpo::notifications::EventMessage;
use oicp_cpo::{create_event_bus, Event, OutcomeKind, StatusSynchronizer};

fn evse(id: &str) -> EvseId {
    EvseId::new(id).unwrap()
}

async fn pushed_actions(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body = String::from_utf8_lossy(&request.body);
            ["fullLoad", "insert", "update", "delete"]
                .iter()
                .find(|action| body.contains(&format!(">{}</", action)))
                .map(|action| action.to_string())
                .unwrap_or_default()
        })
        .collect()
}

fn batch_events(messages: Vec<EventMessage>) -> Vec<Event> {
    messages
        .into_iter()
        .map(|m| m.event)
        .filter(|e| matches!(e, Event::EvseStatusBatchSending(_) | Event::EvseStatusBatchSent(_)))
        .collect()
}

#[tokio::test]
async fn test_single_insert_with_server_error_reports_failed_acknowledgement() {
    let server = MockServer::start().await;
    mount_status_push(&server, ResponseTemplate::new(500)).await;
    let bus = create_event_bus();
    let mut subscriber = bus.subscribe();
    let client = Arc::new(client_with_bus(&server, bus.clone()));
    let synchronizer = StatusSynchronizer::new(client, bus.clone());

    let diff = StatusDiff::new(operator()).added(evse("DE*ABC*E1"), EvseStatus::Available);
    let report = synchronizer.synchronize(&diff, None).await.unwrap();

    assert_eq!(pushed_actions(&server).await, vec!["insert"]);

    let messages = subscriber.drain();
    assert!(messages
        .iter()
        .any(|m| matches!(m.event, Event::TransportError(_))));
    let events = batch_events(messages);
    assert_eq!(events.len(), 2);
    match (&events[0], &events[1]) {
        (Event::EvseStatusBatchSending(sending), Event::EvseStatusBatchSent(sent)) => {
            assert_eq!(sending.records.len(), 1);
            assert_eq!(sending.tracking_id, sent.tracking_id);
            assert_eq!(sent.outcome, OutcomeKind::TransportError);
            assert!(!sent.acknowledgement.result);
            assert!(sending.endpoint.ends_with(EVSE_STATUS_PATH));
        }
        other => panic!("Unexpected events: {:?}", other),
    }

    assert_eq!(report.phases.len(), 1);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_changed_and_removed_push_update_then_delete() {
    let server = MockServer::start().await;
    mount_status_push(
        &server,
        soap_response(200, ack_body(&Acknowledgement::success("Success"))),
    )
    .await;
    let client = Arc::new(client(&server));
    let synchronizer = StatusSynchronizer::new(client, create_event_bus());

    let diff = StatusDiff::new(operator())
        .changed(evse("E1"), EvseStatus::Occupied)
        .removed(evse("E2"));
    let report = synchronizer.synchronize(&diff, None).await.unwrap();

    assert_eq!(pushed_actions(&server).await, vec!["update", "delete"]);
    assert!(report.is_success());

    let requests = server.received_requests().await.unwrap_or_default();
    let delete_body = String::from_utf8_lossy(&requests[1].body);
    assert!(delete_body.contains(">E2<"));
    assert!(delete_body.contains(">OutOfService<"));
}

#[tokio::test]
async fn test_empty_diff_sends_nothing() {
    let server = MockServer::start().await;
    mount_status_push(&server, ResponseTemplate::new(500)).await;
    let bus = create_event_bus();
    let mut subscriber = bus.subscribe();
    let synchronizer = StatusSynchronizer::new(Arc::new(client(&server)), bus.clone());

    let report = synchronizer
        .synchronize(&StatusDiff::new(operator()), None)
        .await
        .unwrap();

    assert!(report.tracking_id.is_none());
    assert!(pushed_actions(&server).await.is_empty());
    assert!(subscriber.try_recv().is_none());
}

#[tokio::test]
async fn test_snapshot_diff_runs_all_phases_in_order() {
    let server = MockServer::start().await;
    mount_status_push(
        &server,
        soap_response(200, ack_body(&Acknowledgement::success("Success"))),
    )
    .await;
    let synchronizer = StatusSynchronizer::new(Arc::new(client(&server)), create_event_bus());

    let old: StatusSnapshot = serde_json::from_str(
        r#"{"DE*ABC*E1": "Available", "DE*ABC*E2": "Available", "DE*ABC*E3": "Reserved"}"#,
    )
    .unwrap();
    let new: StatusSnapshot = serde_json::from_str(
        r#"{"DE*ABC*E2": "Occupied", "DE*ABC*E3": "Reserved", "DE*ABC*E4": "Available"}"#,
    )
    .unwrap();
    let diff = StatusDiff::from_snapshots(operator(), &old, &new);

    let report = synchronizer.synchronize(&diff, None).await.unwrap();

    assert_eq!(pushed_actions(&server).await, vec!["insert", "update", "delete"]);
    let ids: Vec<Vec<&str>> = report
        .phases
        .iter()
        .map(|p| p.evse_ids.iter().map(|id| id.as_str()).collect())
        .collect();
    assert_eq!(ids, vec![vec!["DE*ABC*E4"], vec!["DE*ABC*E2"], vec!["DE*ABC*E1"]]);
}
