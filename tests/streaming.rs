//! Streaming behavior: bytes must flow through before the upstream
//! transfer completes, with memory bounded by chunk size.

use std::time::Duration;

use futures_util::StreamExt;
use paper_relay::config::RelayConfig;
use tokio::sync::oneshot;

mod common;

#[tokio::test]
async fn test_body_streams_before_upstream_completes() {
    let first = vec![b'a'; 16 * 1024];
    let rest = vec![b'b'; 16 * 1024];

    let (release, release_rx) = oneshot::channel();
    let upstream =
        common::start_two_phase_upstream(first.clone(), rest.clone(), release_rx).await;

    let (base, shutdown) = common::start_relay(RelayConfig::default()).await;
    let client = common::test_client();

    let res = client
        .get(format!("{}/pdf", base))
        .query(&[("url", format!("http://{}/big.pdf", upstream))])
        .send()
        .await
        .expect("Relay unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/pdf");

    let mut stream = res.bytes_stream();
    let mut received: Vec<u8> = Vec::new();

    // The upstream is still holding the second half back; the first half
    // must nonetheless arrive through the relay.
    while received.len() < first.len() {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("first half should arrive before the upstream finishes")
            .expect("stream ended early")
            .expect("stream errored");
        received.extend_from_slice(&chunk);
    }
    assert_eq!(&received[..first.len()], first.as_slice());

    // Let the upstream finish and drain the remainder.
    release.send(()).unwrap();
    while let Some(chunk) = stream.next().await {
        received.extend_from_slice(&chunk.expect("stream errored"));
    }

    assert_eq!(received.len(), first.len() + rest.len());
    assert_eq!(&received[first.len()..], rest.as_slice());

    shutdown.trigger();
}
