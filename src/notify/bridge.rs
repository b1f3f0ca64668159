//! Bridge from host events to desktop notifications

use super::launcher::{DetachedLauncher, Launcher};
use super::message::{self, Notification};
use super::protocol::{HostContext, HostEvent};
use crate::app::config::{Config, EventsConfig, NotifierConfig};

/// Turns host events into notifier invocations
///
/// The project name is computed once from the host context and owned by the
/// bridge, so independent bridges never share state.
pub struct NotifyBridge<L = DetachedLauncher> {
    project_name: String,
    notifier: NotifierConfig,
    events: EventsConfig,
    launcher: L,
}

impl<L: Launcher> NotifyBridge<L> {
    pub fn new(ctx: &HostContext, config: &Config, launcher: L) -> Self {
        let project_name = message::project_name(&ctx.directory);
        tracing::debug!(project = %project_name, "Notify bridge initialized");

        Self {
            project_name,
            notifier: config.notifier.clone(),
            events: config.events.clone(),
            launcher,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Title shared by every notification of this bridge
    pub fn title(&self) -> String {
        message::title(&self.notifier.product_label, &self.project_name)
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Notification for an event, `None` when the event is ignored
    pub fn notification_for(&self, event: &HostEvent) -> Option<Notification> {
        let enabled = match event {
            HostEvent::PermissionUpdated(_) => self.events.permission,
            HostEvent::SessionIdle => self.events.session_idle,
            HostEvent::Other(_) => return None,
        };
        if !enabled {
            tracing::debug!(kind = event.kind(), "Event kind muted by config");
            return None;
        }

        message::body(event).map(|body| Notification::new(self.title(), body))
    }

    /// Handle one host event
    ///
    /// Never fails and never waits on the notifier process.
    pub async fn on_event(&self, event: &HostEvent) {
        if let Some(notification) = self.notification_for(event) {
            self.send(&notification);
        }
    }

    /// Fire-and-forget notifier invocation
    pub fn notify(&self, title: &str, message: &str) {
        self.send(&Notification::new(title, message));
    }

    fn send(&self, notification: &Notification) {
        let binary = &self.notifier.binary;
        if let Err(e) = self.launcher.launch(binary, &notification.args()) {
            // The host never sees notifier failures
            tracing::debug!(error = %e, binary = %binary, "Failed to launch notifier");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::protocol::PermissionProperties;
    use crate::notify::testing::{FailingLauncher, RecordingLauncher};

    fn bridge(directory: &str) -> NotifyBridge<RecordingLauncher> {
        NotifyBridge::new(
            &HostContext::new(directory),
            &Config::default(),
            RecordingLauncher::default(),
        )
    }

    fn permission(title: Option<&str>, kind: Option<&str>) -> HostEvent {
        HostEvent::PermissionUpdated(PermissionProperties {
            title: title.map(str::to_string),
            kind: kind.map(str::to_string),
        })
    }

    #[test]
    fn test_project_name_from_context() {
        assert_eq!(bridge("/home/user/myproj").project_name(), "myproj");
        assert_eq!(bridge("").project_name(), "unknown");
    }

    #[test]
    fn test_title_uses_project() {
        assert_eq!(bridge("/home/user/myproj").title(), "OpenCode [myproj]");
    }

    #[tokio::test]
    async fn test_permission_event_launches_notifier() {
        let bridge = bridge("/home/user/myproj");
        bridge.on_event(&permission(Some("Run ls"), Some("bash"))).await;

        let calls = bridge.launcher().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "terminal-notifier");
        assert_eq!(
            calls[0].args,
            vec![
                "-title",
                "OpenCode [myproj]",
                "-message",
                "Permission needed: Run ls",
            ]
        );
    }

    #[tokio::test]
    async fn test_permission_label_fallbacks() {
        let bridge = bridge("/home/user/myproj");
        bridge.on_event(&permission(None, Some("bash"))).await;
        bridge.on_event(&permission(None, None)).await;

        let messages: Vec<String> = bridge
            .launcher()
            .calls()
            .into_iter()
            .map(|call| call.args[3].clone())
            .collect();
        assert_eq!(
            messages,
            vec!["Permission needed: bash", "Permission needed: unknown"]
        );
    }

    #[tokio::test]
    async fn test_session_idle_event() {
        let bridge = bridge("/home/user/myproj");
        let event: HostEvent = r#"{"type":"session.idle","properties":{"title":"ignored"}}"#
            .parse()
            .unwrap();
        bridge.on_event(&event).await;

        let calls = bridge.launcher().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            vec!["-title", "OpenCode [myproj]", "-message", "Task completed"]
        );
    }

    #[tokio::test]
    async fn test_other_events_launch_nothing() {
        let bridge = bridge("/home/user/myproj");
        bridge
            .on_event(&HostEvent::Other("message.updated".to_string()))
            .await;
        bridge.on_event(&HostEvent::Other(String::new())).await;

        assert!(bridge.launcher().calls().is_empty());
    }

    #[tokio::test]
    async fn test_muted_kind_launches_nothing() {
        let mut config = Config::default();
        config.events.session_idle = false;
        let bridge = NotifyBridge::new(
            &HostContext::new("/tmp/proj"),
            &config,
            RecordingLauncher::default(),
        );

        bridge.on_event(&HostEvent::SessionIdle).await;
        bridge.on_event(&permission(Some("Edit file"), None)).await;

        let calls = bridge.launcher().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args[3], "Permission needed: Edit file");
    }

    #[tokio::test]
    async fn test_configured_binary_and_label() {
        let mut config = Config::default();
        config.notifier.binary = "my-notifier".to_string();
        config.notifier.product_label = "Agent".to_string();
        let bridge = NotifyBridge::new(
            &HostContext::new("/srv/app"),
            &config,
            RecordingLauncher::default(),
        );

        bridge.on_event(&HostEvent::SessionIdle).await;

        let calls = bridge.launcher().calls();
        assert_eq!(calls[0].program, "my-notifier");
        assert_eq!(calls[0].args[1], "Agent [app]");
    }

    #[tokio::test]
    async fn test_launch_failure_is_swallowed() {
        let bridge = NotifyBridge::new(
            &HostContext::new("/tmp/proj"),
            &Config::default(),
            FailingLauncher::default(),
        );

        bridge.on_event(&HostEvent::SessionIdle).await;
        bridge.notify("title", "message");

        assert_eq!(bridge.launcher().attempts(), 2);
    }

    #[test]
    fn test_independent_bridges() {
        let a = bridge("/work/alpha");
        let b = bridge("/work/beta");
        assert_eq!(a.title(), "OpenCode [alpha]");
        assert_eq!(b.title(), "OpenCode [beta]");
    }
}
