//! End-to-end: WebSocket subscriptions, broadcast tick, and on-demand reads.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use livepath_worker::{BroadcastLoop, TickReport};

use crate::helpers::{CountingProducer, TestApp};

fn next(rx: &mut mpsc::Receiver<Arc<str>>) -> Value {
    serde_json::from_str(&rx.try_recv().expect("message queued")).expect("valid JSON")
}

#[tokio::test]
async fn test_tick_delivers_to_every_subscriber_and_refreshes_cache() {
    let counter = Arc::new(CountingProducer::default());
    let app = TestApp::with_extra(|registry| {
        registry.register("switch.interfaces", counter.clone(), "").unwrap();
    });
    let connections = &app.realtime.connections;

    let (a, mut rx_a) = connections.register();
    let (b, mut rx_b) = connections.register();
    for id in [a.id, b.id] {
        connections.handle_inbound(&id, r#"{"type":"subscribe","channel":"switch.interfaces"}"#);
    }
    assert_eq!(next(&mut rx_a)["type"], "subscribed");
    assert_eq!(next(&mut rx_b)["type"], "subscribed");

    // Prime the cache through the on-demand path.
    assert_eq!(app.get("/switch/interfaces").await.body, json!({"n": 1}));

    let broadcast = BroadcastLoop::new(
        Arc::clone(&app.realtime.channels),
        app.services.refresher.clone(),
        Arc::new(app.realtime.sink()),
        Duration::from_secs(10),
    );
    let report = broadcast.tick_once().await;
    assert_eq!(report, TickReport { topics: 1, delivered: 1, failed: 0 });

    let expected = json!({"type": "update", "channel": "switch.interfaces", "data": {"n": 2}});
    assert_eq!(next(&mut rx_a), expected);
    assert_eq!(next(&mut rx_b), expected);

    // On-demand readers now see the broadcast value.
    assert_eq!(app.get("/switch/interfaces").await.body, json!({"n": 2}));
    assert_eq!(counter.calls(), 2);
}

#[tokio::test]
async fn test_disconnect_stops_broadcasts() {
    let counter = Arc::new(CountingProducer::default());
    let app = TestApp::with_extra(|registry| {
        registry.register("dhcp.status", counter.clone(), "").unwrap();
    });
    let connections = &app.realtime.connections;

    let (a, _rx) = connections.register();
    connections.handle_inbound(&a.id, r#"{"type":"subscribe","channel":"dhcp.status"}"#);
    assert_eq!(app.realtime.channels.active_topics(), vec!["dhcp.status".to_string()]);

    connections.unregister(&a.id);

    let broadcast = BroadcastLoop::new(
        Arc::clone(&app.realtime.channels),
        app.services.refresher.clone(),
        Arc::new(app.realtime.sink()),
        Duration::from_secs(10),
    );
    assert_eq!(broadcast.tick_once().await, TickReport::default());
    assert_eq!(counter.calls(), 0);
}
