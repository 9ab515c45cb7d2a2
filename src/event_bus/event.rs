use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Severity of a user-facing notice, mirroring the dashboard's toast kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A user-facing notice: every gesture outcome produces exactly one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    /// Which part of the engine produced the notice ("canvas", "interaction",
    /// "simulator", ...).
    pub scope: String,
    pub message: String,
    pub when: DateTime<Utc>,
}

/// An internal diagnostic line, not intended for the toast surface.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub scope: String,
    pub message: String,
}

/// Events flowing through the bus to the registered sinks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    Notice(Notice),
    Diagnostic(DiagnosticEvent),
}

impl Event {
    pub fn notice(
        kind: NoticeKind,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Event::Notice(Notice {
            kind,
            scope: scope.into(),
            message: message.into(),
            when: Utc::now(),
        })
    }

    pub fn success(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(NoticeKind::Success, scope, message)
    }

    pub fn error(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(NoticeKind::Error, scope, message)
    }

    pub fn info(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::notice(NoticeKind::Info, scope, message)
    }

    pub fn diagnostic(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Diagnostic(DiagnosticEvent {
            scope: scope.into(),
            message: message.into(),
        })
    }

    pub fn scope_label(&self) -> &str {
        match self {
            Event::Notice(n) => &n.scope,
            Event::Diagnostic(d) => &d.scope,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Event::Notice(n) => &n.message,
            Event::Diagnostic(d) => &d.message,
        }
    }

    /// The notice payload, when this event is one.
    pub fn as_notice(&self) -> Option<&Notice> {
        match self {
            Event::Notice(n) => Some(n),
            Event::Diagnostic(_) => None,
        }
    }

    /// Convert to a structured JSON value with a normalized schema.
    ///
    /// ```
    /// use workboard::event_bus::Event;
    ///
    /// let event = Event::success("interaction", "group created");
    /// let json = event.to_json_value();
    /// assert_eq!(json["type"], "notice");
    /// assert_eq!(json["scope"], "interaction");
    /// assert_eq!(json["metadata"]["kind"], "success");
    /// ```
    pub fn to_json_value(&self) -> serde_json::Value {
        let (event_type, metadata, timestamp) = match self {
            Event::Notice(n) => ("notice", json!({ "kind": n.kind }), n.when),
            Event::Diagnostic(_) => ("diagnostic", json!({}), Utc::now()),
        };
        json!({
            "type": event_type,
            "scope": self.scope_label(),
            "message": self.message(),
            "timestamp": timestamp.to_rfc3339(),
            "metadata": metadata,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Notice(n) => write!(f, "[{}] {}: {}", n.kind, n.scope, n.message),
            Event::Diagnostic(d) => write!(f, "[diag] {}: {}", d.scope, d.message),
        }
    }
}
