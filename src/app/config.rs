use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::notify::message::DEFAULT_PRODUCT_LABEL;

/// 通知コマンド設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// 通知コマンド（PATHから検索）
    #[serde(default = "default_binary")]
    pub binary: String,
    /// 通知タイトルでプロジェクト名の前に付けるラベル
    #[serde(default = "default_product_label")]
    pub product_label: String,
}

fn default_binary() -> String {
    "terminal-notifier".to_string()
}

fn default_product_label() -> String {
    DEFAULT_PRODUCT_LABEL.to_string()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            product_label: default_product_label(),
        }
    }
}

/// 通知対象イベント設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// 権限リクエスト時に通知するか
    #[serde(default = "default_enabled")]
    pub permission: bool,
    /// セッションがアイドルになった時に通知するか
    #[serde(default = "default_enabled")]
    pub session_idle: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            permission: default_enabled(),
            session_idle: default_enabled(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

impl Config {
    /// 指定パスから読み込み（ファイルがなければデフォルト値、ファイルは作成しない）
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// 設定ファイルパスを取得（~/.config/opencode-notify/config.toml）
    pub fn config_path() -> Result<PathBuf> {
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
        Ok(base_dirs.home_dir().join(".config/opencode-notify/config.toml"))
    }

    /// 現在の設定をファイルに保存（親ディレクトリも作成）
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }
}
