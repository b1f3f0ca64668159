//! Notification module for OpenCode plugin events
//!
//! Host events (permission requests, idle sessions) come in as JSON and are
//! turned into invocations of an external desktop notifier.

pub mod bridge;
pub mod launcher;
pub mod listener;
pub mod message;
pub mod protocol;

pub use bridge::NotifyBridge;
pub use launcher::{DetachedLauncher, Launcher};
pub use listener::run_listener;
pub use message::Notification;
pub use protocol::{HostContext, HostEvent, PermissionProperties};
