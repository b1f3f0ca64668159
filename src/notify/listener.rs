//! Newline-delimited JSON event stream from the host

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::bridge::NotifyBridge;
use super::launcher::Launcher;
use super::protocol::HostEvent;

/// Run the event listener until the stream is closed
///
/// Each line holds one JSON event. Events are handed to the bridge in the
/// order they arrive; malformed lines are skipped.
///
/// # Returns
/// The number of events handed to the bridge
pub async fn run_listener<R, L>(mut reader: R, bridge: &NotifyBridge<L>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    L: Launcher,
{
    let mut buf = Vec::new();
    let mut handled = 0;

    tracing::info!("Event listener started for project: {}", bridge.project_name());

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read event stream")?;
        if read == 0 {
            break;
        }

        // Raw bytes: a line with invalid UTF-8 is skipped like any other bad JSON
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_slice::<HostEvent>(line) {
            Ok(event) => {
                bridge.on_event(&event).await;
                handled += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping malformed event: {}", e);
            }
        }
    }

    tracing::info!("Event stream closed after {} events", handled);
    Ok(handled)
}
