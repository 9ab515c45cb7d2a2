//! Output targets for the notice stream.
//!
//! A sink consumes the events the bus fans out. Delivery failures are
//! typed: a [`SinkError::Disconnected`] tells the bus the consumer is gone
//! for good and the sink can be unregistered, anything else is transient.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use super::event::{Event, Notice};
use crate::telemetry::{PlainFormatter, TelemetryFormatter};

/// Why a sink could not take an event.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink write failed: {0}")]
    Io(#[from] io::Error),
    /// The consumer side of a streaming sink is gone. The bus drops the
    /// sink when it sees this.
    #[error("sink consumer disconnected")]
    Disconnected,
}

/// An output target for bus events.
pub trait EventSink: Send + Sync {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError>;
}

/// Stdout sink for headless sessions and demos.
///
/// Notices are rendered through the formatter; diagnostics are not toast
/// material and go to the tracing layer instead.
pub struct StdOutSink<F: TelemetryFormatter = PlainFormatter> {
    out: Stdout,
    formatter: F,
}

impl Default for StdOutSink {
    fn default() -> Self {
        Self {
            out: io::stdout(),
            formatter: PlainFormatter::new(),
        }
    }
}

impl<F: TelemetryFormatter> StdOutSink<F> {
    pub fn with_formatter(formatter: F) -> Self {
        Self {
            out: io::stdout(),
            formatter,
        }
    }
}

impl<F: TelemetryFormatter> EventSink for StdOutSink<F> {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        match event {
            Event::Notice(_) => {
                let rendered = self.formatter.render_event(event).join_lines();
                self.out.write_all(rendered.as_bytes())?;
                self.out.flush()?;
            }
            Event::Diagnostic(d) => {
                debug!(scope = %d.scope, "{}", d.message);
            }
        }
        Ok(())
    }
}

/// In-memory sink for tests and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every captured event.
    pub fn snapshot(&self) -> Vec<Event> {
        self.entries.lock().unwrap().clone()
    }

    /// Only the captured notices, in arrival order.
    pub fn notices(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.as_notice().cloned())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl EventSink for MemorySink {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        self.entries.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Channel sink streaming to an async consumer (e.g. the websocket layer
/// that feeds the dashboard's toast surface).
///
/// A dropped receiver surfaces as [`SinkError::Disconnected`], after which
/// the bus stops offering events to this sink.
///
/// # Example
/// ```no_run
/// use tokio::sync::mpsc;
/// use workboard::event_bus::{ChannelSink, EventBus};
///
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let bus = EventBus::default();
/// bus.add_sink(ChannelSink::new(tx));
///
/// tokio::spawn(async move {
///     while let Some(event) = rx.recv().await {
///         println!("toast: {event}");
///     }
/// });
/// ```
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|_| SinkError::Disconnected)
    }
}
