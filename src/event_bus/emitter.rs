use thiserror::Error;

use super::event::{Event, NoticeKind};

/// Errors that can occur when emitting an event.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("notification channel closed")]
    Closed,
}

/// Cloneable handle for emitting notices into the bus.
///
/// The controller and simulator hold one of these instead of a raw channel
/// sender; a dropped bus downgrades emission failures to an error rather
/// than a panic, so a missing toast surface can never take the canvas down.
#[derive(Clone, Debug)]
pub struct Notifier {
    sender: flume::Sender<Event>,
}

impl Notifier {
    pub fn new(sender: flume::Sender<Event>) -> Self {
        Self { sender }
    }

    /// A notifier wired to nowhere, for callers that do not care about
    /// notices (mainly tests of the stores themselves).
    pub fn disconnected() -> Self {
        let (sender, _) = flume::unbounded();
        Self { sender }
    }

    pub fn emit(&self, event: Event) -> Result<(), EmitterError> {
        self.sender.send(event).map_err(|_| EmitterError::Closed)
    }

    /// Emit a notice, ignoring a closed channel. Gesture handling never
    /// fails because nobody is listening for toasts.
    pub fn notify(&self, kind: NoticeKind, scope: &str, message: impl Into<String>) {
        let _ = self.emit(Event::notice(kind, scope, message));
    }

    pub fn success(&self, scope: &str, message: impl Into<String>) {
        self.notify(NoticeKind::Success, scope, message);
    }

    pub fn error(&self, scope: &str, message: impl Into<String>) {
        self.notify(NoticeKind::Error, scope, message);
    }

    pub fn info(&self, scope: &str, message: impl Into<String>) {
        self.notify(NoticeKind::Info, scope, message);
    }
}
