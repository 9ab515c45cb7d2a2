//! Fan-out from the engine's notice channel to the registered sinks.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

use super::event::Event;
use super::sink::{EventSink, SinkError, StdOutSink};

/// Receives engine events and broadcasts them to the registered sinks.
///
/// The interaction controller and the simulator hold [`Notifier`] clones of
/// the sender side; the pump task fans every received event out to the
/// sinks (toast channel, stdout, test capture). A sink whose consumer has
/// disconnected is unregistered on the spot; other sink failures are
/// logged and the sink keeps its slot.
///
/// [`Notifier`]: super::Notifier
pub struct EventBus {
    sinks: Arc<Mutex<Vec<Box<dyn EventSink>>>>,
    sender: flume::Sender<Event>,
    receiver: flume::Receiver<Event>,
    pump: Mutex<Option<Pump>>,
}

/// The running fan-out task and its stop signal.
struct Pump {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_sink(StdOutSink::default())
    }
}

impl EventBus {
    /// A bus with a single sink.
    pub fn with_sink<T>(sink: T) -> Self
    where
        T: EventSink + 'static,
    {
        let (sender, receiver) = flume::unbounded();
        Self {
            sinks: Arc::new(Mutex::new(vec![Box::new(sink)])),
            sender,
            receiver,
            pump: Mutex::new(None),
        }
    }

    /// Register another sink (e.g. a per-session toast stream).
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        self.sinks.lock().unwrap().push(Box::new(sink));
    }

    /// How many sinks are currently registered.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    /// A clone of the sender side for producers.
    pub fn get_sender(&self) -> flume::Sender<Event> {
        self.sender.clone()
    }

    /// Spawn the fan-out task. Idempotent: calling again while the task is
    /// up has no effect.
    pub fn listen_for_events(&self) {
        let mut guard = self.pump.lock().expect("pump state poisoned");
        if guard.is_some() {
            return;
        }

        let receiver = self.receiver.clone();
        let sinks = self.sinks.clone();
        let (stop, mut stopped) = oneshot::channel();

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = &mut stopped => break,
                    recv = receiver.recv_async() => match recv {
                        Ok(event) => event,
                        Err(_) => break, // every sender dropped
                    },
                };
                Self::dispatch(&sinks, &event);
            }
        });

        *guard = Some(Pump { stop, task });
    }

    /// Offer one event to every sink, pruning the disconnected ones.
    fn dispatch(sinks: &Mutex<Vec<Box<dyn EventSink>>>, event: &Event) {
        let mut guard = sinks.lock().unwrap();
        let mut index = 0;
        while index < guard.len() {
            match guard[index].handle(event) {
                Ok(()) => index += 1,
                Err(SinkError::Disconnected) => {
                    warn!(scope = event.scope_label(), "notice sink disconnected, unregistering");
                    guard.remove(index);
                }
                Err(err) => {
                    warn!(%err, scope = event.scope_label(), "notice sink failed");
                    index += 1;
                }
            }
        }
    }

    /// Stop the fan-out task and wait for it to wind down.
    pub async fn stop_listener(&self) {
        let pump = {
            let mut guard = self.pump.lock().expect("pump state poisoned");
            guard.take()
        };
        if let Some(pump) = pump {
            let _ = pump.stop.send(());
            let _ = pump.task.await;
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.pump.lock() {
            if let Some(pump) = guard.take() {
                pump.task.abort();
            }
        }
    }
}
