//! Launching the external notifier process

use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;

/// Starts a program without waiting for it
///
/// Implementations must return as soon as the launch was attempted. The
/// bridge never looks at the child's output or exit status.
pub trait Launcher {
    fn launch(&self, program: &str, args: &[String]) -> Result<()>;
}

/// Spawns the notifier as a detached child with null stdio
///
/// Inside a tokio runtime the child is spawned through `tokio::process`, so
/// the runtime reaps it in the background. Outside one it falls back to
/// `std::process` and the child is simply dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn launch(&self, program: &str, args: &[String]) -> Result<()> {
        let pid = if tokio::runtime::Handle::try_current().is_ok() {
            spawn_with_runtime(program, args)?
        } else {
            spawn_without_runtime(program, args)?
        };
        tracing::debug!(pid = ?pid, program, "Notifier launched");

        Ok(())
    }
}

fn spawn_with_runtime(program: &str, args: &[String]) -> Result<Option<u32>> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);

    // Detach from our process group
    #[cfg(unix)]
    command.process_group(0);

    let child = command
        .spawn()
        .with_context(|| format!("Failed to spawn notifier: {}", program))?;
    Ok(child.id())
}

fn spawn_without_runtime(program: &str, args: &[String]) -> Result<Option<u32>> {
    let mut command = std::process::Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command
        .spawn()
        .with_context(|| format!("Failed to spawn notifier: {}", program))?;
    Ok(Some(child.id()))
}
