//! Transport tests for the feed WebSocket client.
//!
//! These run against an in-process server (tokio TcpListener +
//! `tokio_tungstenite::accept_async`) so they need no network access.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use xrpl_market_feed::prelude::*;
use xrpl_market_feed::ws::native::WsClient;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

async fn accept_ws(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(TEST_TIMEOUT, listener.accept())
        .await
        .expect("timed out waiting for a connection")
        .expect("accept failed");
    accept_async(stream).await.expect("ws handshake failed")
}

fn test_config(url: String, reconnect: bool, delay_ms: u64) -> WsConfig {
    WsConfig {
        url,
        reconnect,
        reconnect_delay_ms: delay_ms,
    }
}

/// Wait for the next event that matches the predicate, ignoring others.
async fn next_matching(client: &WsClient, predicate: impl Fn(&WsEvent) -> bool) -> WsEvent {
    let events = client.events();
    tokio::pin!(events);

    timeout(TEST_TIMEOUT, async {
        while let Some(ev) = events.next().await {
            if predicate(&ev) {
                return ev;
            }
        }
        panic!("event stream ended without a matching event");
    })
    .await
    .expect("timed out waiting for matching event")
}

const TRADE_JSON: &str = r#"{
    "timestamp": 1740076800000,
    "paidAmount": {"currency": "XRP", "value": "512.5"},
    "gotAmount": {"currency": "NFT", "issuer": "rIssuer", "value": "1"},
    "maker": "rMaker",
    "taker": "rTaker"
}"#;

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_and_receive_connected_event() {
    let (listener, url) = bind().await;
    let mut client = WsClient::new(test_config(url, false, 3000));
    client.connect().await.unwrap();

    let _server = accept_ws(&listener).await;
    next_matching(&client, |ev| matches!(ev, WsEvent::Connected)).await;
    assert!(client.is_connected());

    client.disconnect().await.unwrap();
    assert!(!client.is_connected());
}

#[tokio::test]
async fn incremental_and_snapshot_payloads_are_decoded() {
    let (listener, url) = bind().await;
    let mut client = WsClient::new(test_config(url, false, 3000));
    client.connect().await.unwrap();

    let mut server = accept_ws(&listener).await;
    server.send(Message::Text(TRADE_JSON.into())).await.unwrap();
    server
        .send(Message::Text(format!("[{}]", TRADE_JSON).into()))
        .await
        .unwrap();

    let first = next_matching(&client, |ev| matches!(ev, WsEvent::Message(_))).await;
    assert!(matches!(
        first,
        WsEvent::Message(FeedMessage::Trade(_))
    ));

    let second = next_matching(&client, |ev| matches!(ev, WsEvent::Message(_))).await;
    assert!(matches!(
        second,
        WsEvent::Message(FeedMessage::Snapshot(_))
    ));

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn malformed_payloads_are_dropped_silently() {
    let (listener, url) = bind().await;
    let mut client = WsClient::new(test_config(url, false, 3000));
    client.connect().await.unwrap();

    let mut server = accept_ws(&listener).await;
    server
        .send(Message::Text("definitely not json".into()))
        .await
        .unwrap();
    server
        .send(Message::Text(r#"{"no": "timestamp"}"#.into()))
        .await
        .unwrap();
    // A valid trade after the garbage proves the connection survived.
    server.send(Message::Text(TRADE_JSON.into())).await.unwrap();

    let ev = next_matching(&client, |ev| {
        matches!(ev, WsEvent::Message(_) | WsEvent::Error(_))
    })
    .await;
    assert!(
        matches!(ev, WsEvent::Message(FeedMessage::Trade(_))),
        "garbage must produce no event, got: {ev:?}"
    );

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn reconnects_once_after_unexpected_close() {
    let (listener, url) = bind().await;
    let delay = Duration::from_millis(150);
    let mut client = WsClient::new(test_config(url, true, delay.as_millis() as u64));
    client.connect().await.unwrap();

    // First connection established, then dropped by the server.
    let server = accept_ws(&listener).await;
    next_matching(&client, |ev| matches!(ev, WsEvent::Connected)).await;
    let dropped_at = Instant::now();
    drop(server);

    next_matching(&client, |ev| matches!(ev, WsEvent::Disconnected { .. })).await;

    // Exactly one reconnect attempt, scheduled after the fixed delay.
    let _server2 = accept_ws(&listener).await;
    assert!(
        dropped_at.elapsed() >= delay,
        "reconnect fired before the fixed delay"
    );
    next_matching(&client, |ev| matches!(ev, WsEvent::Connected)).await;

    // While this connection lives, no further dial arrives.
    let extra = timeout(Duration::from_millis(400), listener.accept()).await;
    assert!(extra.is_err(), "unexpected second reconnect attempt");

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn user_close_cancels_pending_reconnect() {
    let (listener, url) = bind().await;
    let mut client = WsClient::new(test_config(url, true, 200));
    client.connect().await.unwrap();

    let server = accept_ws(&listener).await;
    next_matching(&client, |ev| matches!(ev, WsEvent::Connected)).await;
    drop(server);

    next_matching(&client, |ev| matches!(ev, WsEvent::Disconnected { .. })).await;

    // Close while the reconnect timer is still pending.
    client.disconnect().await.unwrap();

    let extra = timeout(Duration::from_millis(600), listener.accept()).await;
    assert!(extra.is_err(), "reconnect fired after user close");
}

#[tokio::test]
async fn no_reconnect_after_graceful_disconnect() {
    let (listener, url) = bind().await;
    let mut client = WsClient::new(test_config(url, true, 100));
    client.connect().await.unwrap();

    let _server = accept_ws(&listener).await;
    next_matching(&client, |ev| matches!(ev, WsEvent::Connected)).await;

    client.disconnect().await.unwrap();

    let extra = timeout(Duration::from_millis(400), listener.accept()).await;
    assert!(extra.is_err(), "reconnect fired after graceful disconnect");
}
