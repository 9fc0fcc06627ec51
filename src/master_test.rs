use super::*;

use std::sync::Arc;

use tokio::time::{Duration, timeout};

use crate::barrier::CompletionBarrier;
use crate::listener::{ListenerControl, NetListener};

// =============================================================================
// address / body shape
// =============================================================================

#[test]
fn master_address_appends_well_known_port() {
    assert_eq!(master_address("master.local"), "master.local:8467");
    assert_eq!(master_address("10.0.0.7"), "10.0.0.7:8467");
}

#[test]
fn master_request_serializes_both_fields() {
    let request = MasterRequest { payload: "board-1".into(), command: REMOVE_BOARD_COMMAND.into() };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["payload"], "board-1");
    assert_eq!(json["command"], "RemoveBoard");
}

#[test]
fn remove_board_command_tag_is_stable() {
    assert_eq!(REMOVE_BOARD_COMMAND, "RemoveBoard");
}

// =============================================================================
// HTTP notifier
// =============================================================================

#[tokio::test]
async fn http_notifier_delivers_to_a_listening_master() {
    // Stand a listener in for the master server; the barrier records the body.
    let (barrier, signal) = CompletionBarrier::new(1);
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();
    listener.register(barrier.clone()).await;

    let notifier = HttpMasterNotifier::new().unwrap();
    notifier
        .send(&listener.local_addr().to_string(), "board-7", REMOVE_BOARD_COMMAND)
        .await
        .unwrap();

    assert!(timeout(Duration::from_secs(2), signal.wait()).await.unwrap());
    let received = barrier.received().await;
    let body: MasterRequest = serde_json::from_str(&received[0]).unwrap();
    assert_eq!(body, MasterRequest { payload: "board-7".into(), command: "RemoveBoard".into() });
}

#[tokio::test]
async fn http_notifier_surfaces_rejection_status() {
    // No handler registered: the listener answers 503.
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();

    let notifier = HttpMasterNotifier::new().unwrap();
    let err = notifier
        .send(&listener.local_addr().to_string(), "board-7", REMOVE_BOARD_COMMAND)
        .await
        .unwrap_err();

    assert!(matches!(err, MasterError::Rejected { status: 503 }));
}

#[tokio::test]
async fn http_notifier_reports_unreachable_master() {
    // Bind then drop to get an address nothing listens on.
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().to_string();
    listener.stop();
    drop(listener);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let notifier = HttpMasterNotifier::new().unwrap();
    let result = notifier.send(&address, "board-7", REMOVE_BOARD_COMMAND).await;
    assert!(result.is_err());
}
