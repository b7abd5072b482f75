use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_VERSION: u32 = 1;
const MIN_CLOSE_DELAY_MS: u64 = 100;
const MAX_CLOSE_DELAY_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub support: SupportSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            support: SupportSettings::default(),
            storage: StorageSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl PortalConfig {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        self.support.sanitize();
        self.storage.sanitize();
        self.ui.sanitize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSettings {
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_recipient")]
    pub recipient: String,
    #[serde(default = "default_close_delay_ms")]
    pub close_delay_ms: u64,
}

fn default_product_name() -> String {
    "CivicDesk".to_string()
}

fn default_recipient() -> String {
    "suporte@civicdesk.cv".to_string()
}

fn default_close_delay_ms() -> u64 {
    2000
}

impl Default for SupportSettings {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            recipient: default_recipient(),
            close_delay_ms: default_close_delay_ms(),
        }
    }
}

impl SupportSettings {
    fn sanitize(&mut self) {
        if self.product_name.trim().is_empty() {
            self.product_name = default_product_name();
        }
        if !self.recipient.contains('@') {
            self.recipient = default_recipient();
        }
        if self.close_delay_ms == 0 {
            self.close_delay_ms = default_close_delay_ms();
        }
        self.close_delay_ms = self
            .close_delay_ms
            .clamp(MIN_CLOSE_DELAY_MS, MAX_CLOSE_DELAY_MS);
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// 相對於工作區的資料目錄。 / Data directory, relative paths resolve against the workspace.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".civicdesk").join("data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageSettings {
    fn sanitize(&mut self) {
        if self.data_dir.as_os_str().is_empty() {
            self.data_dir = default_data_dir();
        }
    }

    pub fn resolve(&self, workspace: &Path) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            workspace.join(&self.data_dir)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    crate::localization::DEFAULT_LOCALE_CODE.to_string()
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

impl UiSettings {
    fn sanitize(&mut self) {
        if self.locale.trim().is_empty() {
            self.locale = default_locale();
        }
    }
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: PortalConfig,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, config: PortalConfig) -> Self {
        Self {
            path: path.into(),
            data: config,
        }
    }

    /// 載入設定；檔案不存在時使用預設值。 / Loads the config, using defaults when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = PortalConfig::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: PortalConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn update<F>(&mut self, op: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut PortalConfig),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload =
            serde_json::to_string_pretty(&self.data).map_err(|source| ConfigError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| ConfigError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
