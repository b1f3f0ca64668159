//! Protocol definitions for host events

use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Event type sent when the agent asks to run a tool that needs approval
pub const PERMISSION_UPDATED: &str = "permission.updated";
/// Event type sent when the agent has finished its current turn
pub const SESSION_IDLE: &str = "session.idle";

/// Initialization context handed over by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    /// Working directory of the OpenCode session
    pub directory: String,
}

impl HostContext {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

/// Payload of a `permission.updated` event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionProperties {
    /// Human readable description of the request (e.g. "Run ls")
    pub title: Option<String>,
    /// Tool kind tag (e.g. "bash"), sent as `type` by the host
    pub kind: Option<String>,
}

impl PermissionProperties {
    fn from_value(properties: Option<&Value>) -> Self {
        Self {
            title: string_field(properties, "title"),
            kind: string_field(properties, "type"),
        }
    }

    /// Label for the notification body: title, then kind, then "unknown"
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("unknown")
    }
}

/// Empty strings and non-string values count as missing
fn string_field(properties: Option<&Value>, key: &str) -> Option<String> {
    properties?
        .get(key)?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Events received from the host, keyed by their `type` field
///
/// Deserialization never fails on shape: anything that is not a recognized
/// event ends up in [`HostEvent::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum HostEvent {
    /// The host asks whether a tool invocation may proceed
    PermissionUpdated(PermissionProperties),
    /// The agent finished its current unit of work
    SessionIdle,
    /// Any other event kind (empty when `type` is missing)
    Other(String),
}

impl HostEvent {
    /// The `type` discriminant this event was received with
    pub fn kind(&self) -> &str {
        match self {
            HostEvent::PermissionUpdated(_) => PERMISSION_UPDATED,
            HostEvent::SessionIdle => SESSION_IDLE,
            HostEvent::Other(kind) => kind,
        }
    }
}

impl From<Value> for HostEvent {
    fn from(value: Value) -> Self {
        // Plugin hooks receive `{ "event": { ... } }`
        let event = match value.get("event") {
            Some(inner) if value.get("type").is_none() => inner,
            _ => &value,
        };

        match event.get("type").and_then(Value::as_str) {
            Some(PERMISSION_UPDATED) => HostEvent::PermissionUpdated(
                PermissionProperties::from_value(event.get("properties")),
            ),
            Some(SESSION_IDLE) => HostEvent::SessionIdle,
            Some(other) => HostEvent::Other(other.to_string()),
            None => HostEvent::Other(String::new()),
        }
    }
}

impl FromStr for HostEvent {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
