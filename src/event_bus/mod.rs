//! Event bus utilities providing notice fan-out and pluggable sinks.
//!
//! This is the engine's side of the dashboard's toast/notification
//! contract: producers emit [`Event`]s through a [`Notifier`], the
//! [`EventBus`] listener broadcasts them to every registered
//! [`EventSink`].

pub mod bus;
pub mod emitter;
pub mod event;
pub mod sink;

pub use bus::EventBus;
pub use emitter::{EmitterError, Notifier};
pub use event::{DiagnosticEvent, Event, Notice, NoticeKind};
pub use sink::{ChannelSink, EventSink, MemorySink, SinkError, StdOutSink};
