//! Event bus fan-out, listener lifecycle, and notifier behavior.

use std::time::Duration;

use tokio::sync::mpsc;
use workboard::event_bus::{
    ChannelSink, Event, EventBus, MemorySink, NoticeKind, Notifier,
};

async fn wait_for<F: Fn() -> bool>(cond: F) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 1s");
}

#[tokio::test]
async fn events_fan_out_to_a_memory_sink() {
    let capture = MemorySink::new();
    let bus = EventBus::with_sink(capture.clone());
    bus.listen_for_events();

    let notifier = Notifier::new(bus.get_sender());
    notifier.success("canvas", "item placed");
    notifier.error("canvas", "unknown template");
    notifier.info("simulator", "flow started");

    wait_for(|| capture.snapshot().len() == 3).await;
    let events = capture.snapshot();
    let kinds: Vec<NoticeKind> = events
        .iter()
        .filter_map(|e| e.as_notice().map(|n| n.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![NoticeKind::Success, NoticeKind::Error, NoticeKind::Info],
    );
    assert_eq!(events[0].scope_label(), "canvas");
    assert_eq!(events[2].message(), "flow started");

    bus.stop_listener().await;
}

#[tokio::test]
async fn listen_for_events_is_idempotent() {
    let capture = MemorySink::new();
    let bus = EventBus::with_sink(capture.clone());
    bus.listen_for_events();
    bus.listen_for_events();
    bus.listen_for_events();

    let notifier = Notifier::new(bus.get_sender());
    notifier.info("canvas", "once");
    wait_for(|| !capture.snapshot().is_empty()).await;
    // Wait a beat for any duplicate listener to double-deliver, then check.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(capture.snapshot().len(), 1);

    bus.stop_listener().await;
}

#[tokio::test]
async fn stopped_listener_delivers_nothing_further() {
    let capture = MemorySink::new();
    let bus = EventBus::with_sink(capture.clone());
    bus.listen_for_events();

    let notifier = Notifier::new(bus.get_sender());
    notifier.info("canvas", "before stop");
    wait_for(|| capture.snapshot().len() == 1).await;

    bus.stop_listener().await;
    notifier.info("canvas", "after stop");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(capture.snapshot().len(), 1);
}

#[tokio::test]
async fn added_sinks_receive_the_same_events() {
    let capture = MemorySink::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let bus = EventBus::with_sink(capture.clone());
    bus.add_sink(ChannelSink::new(tx));
    bus.listen_for_events();

    Notifier::new(bus.get_sender()).success("group", "cluster created");

    wait_for(|| capture.snapshot().len() == 1).await;
    let streamed = rx.recv().await.unwrap();
    assert_eq!(streamed.message(), "cluster created");

    bus.stop_listener().await;
}

#[tokio::test]
async fn disconnected_channel_sink_is_unregistered() {
    let capture = MemorySink::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let bus = EventBus::with_sink(capture.clone());
    bus.add_sink(ChannelSink::new(tx));
    assert_eq!(bus.sink_count(), 2);
    bus.listen_for_events();

    // Nobody is consuming the stream anymore.
    drop(rx);

    let notifier = Notifier::new(bus.get_sender());
    notifier.info("canvas", "first");
    wait_for(|| bus.sink_count() == 1).await;

    // Later events still reach the surviving sink.
    notifier.success("canvas", "second");
    wait_for(|| capture.snapshot().len() == 2).await;
    assert_eq!(capture.notices().len(), 2);

    bus.stop_listener().await;
}

#[test]
fn disconnected_notifier_never_panics() {
    let notifier = Notifier::disconnected();
    notifier.success("canvas", "nobody is listening");
    notifier.error("canvas", "still fine");
    // Explicit emit reports the closed channel instead of panicking.
    assert!(notifier.emit(Event::info("canvas", "explicit emit")).is_err());
}

#[test]
fn notice_renders_scope_and_message() {
    let event = Event::error("interaction", "cannot connect an item to itself");
    assert_eq!(event.scope_label(), "interaction");
    assert_eq!(event.message(), "cannot connect an item to itself");
    let shown = event.to_string();
    assert!(shown.contains("interaction"));
    assert!(shown.contains("cannot connect an item to itself"));
}
