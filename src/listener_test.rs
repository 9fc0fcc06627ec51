use super::*;

use tokio::time::{Duration, sleep, timeout};

use crate::barrier::CompletionBarrier;

async fn post_notify(addr: SocketAddr, body: &str) -> Result<reqwest::StatusCode, reqwest::Error> {
    reqwest::Client::new()
        .post(format!("http://{addr}/notify"))
        .body(body.to_owned())
        .send()
        .await
        .map(|response| response.status())
}

#[tokio::test]
async fn delivers_request_bodies_to_registered_handler() {
    let (barrier, signal) = CompletionBarrier::new(2);
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();
    listener.register(barrier.clone()).await;

    assert_eq!(post_notify(listener.local_addr(), "alice").await.unwrap(), reqwest::StatusCode::ACCEPTED);
    assert_eq!(post_notify(listener.local_addr(), "bob").await.unwrap(), reqwest::StatusCode::ACCEPTED);

    assert!(timeout(Duration::from_secs(2), signal.wait()).await.unwrap());
    assert_eq!(barrier.received().await, vec!["alice", "bob"]);
}

#[tokio::test]
async fn rejects_messages_before_registration() {
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();

    let status = post_notify(listener.local_addr(), "early").await.unwrap();
    assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn stop_halts_further_delivery() {
    let (barrier, _signal) = CompletionBarrier::new(usize::MAX);
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();
    listener.register(barrier.clone()).await;
    let addr = listener.local_addr();

    assert!(post_notify(addr, "before").await.is_ok());
    listener.stop();

    // Graceful shutdown finishes in-flight requests first; poll until the
    // socket actually refuses.
    let mut refused = false;
    for _ in 0..40 {
        if post_notify(addr, "after").await.is_err() {
            refused = true;
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }
    assert!(refused, "listener kept accepting after stop()");
    assert_eq!(barrier.received().await.first().map(String::as_str), Some("before"));
}

#[tokio::test]
async fn stop_is_idempotent() {
    let listener = NetListener::bind("127.0.0.1:0").await.unwrap();
    listener.stop();
    listener.stop();
    listener.stop();
}

#[tokio::test]
async fn bind_reports_unusable_address() {
    assert!(NetListener::bind("256.0.0.1:0").await.is_err());
}
