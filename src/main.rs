use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use opencode_notify::app::Config;
use opencode_notify::notify::{self, DetachedLauncher, HostContext, HostEvent, NotifyBridge};

/// OpenCode Notify - desktop notifications for OpenCode sessions
#[derive(Parser)]
#[command(name = "opencode-notify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Project directory of the session (defaults to current directory)
    #[arg(short, long)]
    directory: Option<String>,

    /// Config file (defaults to ~/.config/opencode-notify/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read newline-delimited JSON events from stdin (default)
    Listen,
    /// Handle a single JSON event
    Event {
        /// Event JSON (read from stdin when omitted)
        json: Option<String>,
    },
    /// Send a notification directly
    Send {
        /// Notification title (defaults to the project title)
        #[arg(long)]
        title: Option<String>,
        /// Notification message
        #[arg(long)]
        message: String,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let config_path = match cli.config {
        Some(path) => Ok(path),
        None => Config::config_path(),
    };

    let command = match cli.command.unwrap_or(Commands::Listen) {
        Commands::Config { action } => {
            let config_path = config_path?;
            let config = load_config(Some(&config_path));
            return handle_config(action, &config_path, &config);
        }
        Commands::Listen => BridgeCommand::Listen,
        Commands::Event { json } => BridgeCommand::Event { json },
        Commands::Send { title, message } => BridgeCommand::Send { title, message },
    };

    // From here on nothing reaches the host: failures are logged only
    let config = load_config(config_path.as_deref().ok());
    let ctx = host_context(cli.directory);
    let bridge = NotifyBridge::new(&ctx, &config, DetachedLauncher);

    let result = tokio::runtime::Runtime::new()
        .context("Failed to start tokio runtime")
        .and_then(|runtime| runtime.block_on(run_command(command, &bridge)));
    if let Err(e) = result {
        tracing::warn!("Event handling stopped: {:#}", e);
    }
    Ok(())
}

/// Broken or unlocatable config falls back to defaults
fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        tracing::warn!("Using default config: config path unavailable");
        return Config::default();
    };
    Config::load_from(path).unwrap_or_else(|e| {
        tracing::warn!("Using default config: {}", e);
        Config::default()
    })
}

/// Commands that drive the notify bridge
enum BridgeCommand {
    Listen,
    Event { json: Option<String> },
    Send { title: Option<String>, message: String },
}

/// Unknown working directory degrades to an "unknown" project name
fn host_context(directory: Option<String>) -> HostContext {
    let directory = directory.unwrap_or_else(|| match std::env::current_dir() {
        Ok(dir) => dir.to_string_lossy().to_string(),
        Err(e) => {
            tracing::warn!("Failed to determine current directory: {}", e);
            String::new()
        }
    });
    HostContext::new(directory)
}

async fn run_command(command: BridgeCommand, bridge: &NotifyBridge) -> Result<()> {
    match command {
        BridgeCommand::Listen => {
            let stdin = BufReader::new(tokio::io::stdin());
            notify::run_listener(stdin, bridge).await?;
        }
        BridgeCommand::Event { json } => {
            let json = match json {
                Some(json) => json,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buf)
                        .await
                        .context("Failed to read event from stdin")?;
                    buf
                }
            };

            match json.trim().parse::<HostEvent>() {
                Ok(event) => bridge.on_event(&event).await,
                // Malformed input never fails the hook
                Err(e) => tracing::warn!("Ignoring malformed event: {}", e),
            }
        }
        BridgeCommand::Send { title, message } => {
            let title = title.unwrap_or_else(|| bridge.title());
            bridge.notify(&title, &message);
            info!("Notification launched: {}", title);
        }
    }
    Ok(())
}

fn handle_config(action: ConfigAction, path: &Path, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Show => {
            let content = toml::to_string_pretty(config)?;
            print!("{}", content);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to(path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Best-effort file logging; without a log file the command still runs
fn init_logging(level: &str) {
    let log_file = match open_log_file(&log_dir()) {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .init();

    info!("OpenCode Notify starting");
}

fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "opencode-notify")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("opencode-notify"))
}

fn open_log_file(log_dir: &Path) -> Result<File> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Append: hook mode starts one process per event
    let path = log_dir.join("opencode-notify.log");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_open_log_file_creates_and_appends() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        {
            let mut file = open_log_file(&log_dir).unwrap();
            std::io::Write::write_all(&mut file, b"first\n").unwrap();
        }
        {
            let mut file = open_log_file(&log_dir).unwrap();
            std::io::Write::write_all(&mut file, b"second\n").unwrap();
        }

        let content = std::fs::read_to_string(log_dir.join("opencode-notify.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_unusable_log_dir_is_an_error() {
        // A regular file cannot hold a log directory
        let blocker = NamedTempFile::new().unwrap();
        let err = open_log_file(&blocker.path().join("logs")).unwrap_err();
        assert!(err.to_string().contains("Failed to create log directory"));
    }

    #[test]
    fn test_missing_config_path_uses_defaults() {
        assert_eq!(load_config(None), Config::default());
    }

    #[test]
    fn test_broken_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notifier\n").unwrap();

        assert_eq!(load_config(Some(&path)), Config::default());
    }

    #[test]
    fn test_host_context_uses_given_directory() {
        let ctx = host_context(Some("/home/user/myproj".to_string()));
        assert_eq!(ctx.directory, "/home/user/myproj");
    }
}
