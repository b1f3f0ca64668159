//! Notification text composed from host events

use super::protocol::HostEvent;

/// Product label used in notification titles
pub const DEFAULT_PRODUCT_LABEL: &str = "OpenCode";
/// Body sent when the session becomes idle
pub const TASK_COMPLETED: &str = "Task completed";

const UNKNOWN_PROJECT: &str = "unknown";

/// A title/message pair handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Command-line arguments for the notifier, title and message kept separate
    pub fn args(&self) -> Vec<String> {
        vec![
            "-title".to_string(),
            self.title.clone(),
            "-message".to_string(),
            self.message.clone(),
        ]
    }
}

/// Last non-empty path segment of `directory`, or "unknown"
pub fn project_name(directory: &str) -> String {
    directory
        .split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .unwrap_or(UNKNOWN_PROJECT)
        .to_string()
}

/// Notification title: `<label> [<project>]`
pub fn title(product_label: &str, project_name: &str) -> String {
    format!("{} [{}]", product_label, project_name)
}

/// Notification body for an event, `None` for kinds that are not notified
pub fn body(event: &HostEvent) -> Option<String> {
    match event {
        HostEvent::PermissionUpdated(permission) => {
            Some(format!("Permission needed: {}", permission.label()))
        }
        HostEvent::SessionIdle => Some(TASK_COMPLETED.to_string()),
        HostEvent::Other(_) => None,
    }
}
