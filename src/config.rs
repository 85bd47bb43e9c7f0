use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Notify;

use crate::session::types::InterfaceOrientation;

const SAVE_DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(500);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parameters for the simulated session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulatedConfig {
    pub width: u32,
    pub height: u32,
    pub orientation: InterfaceOrientation,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1440,
            orientation: InterfaceOrientation::default(),
        }
    }
}

/// Top-level capture configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureConfig {
    pub depth_enabled: bool,
    pub thumbnail_max_edge: u32,
    pub simulated: SimulatedConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            depth_enabled: true,
            thumbnail_max_edge: 160,
            simulated: SimulatedConfig::default(),
        }
    }
}

/// Persistent config store with debounced saving.
pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<CaptureConfig>,
    save_notify: Notify,
    is_dirty: AtomicBool,
}

impl ConfigStore {
    /// Create a new store, loading from disk if the file exists.
    pub fn new(path: PathBuf) -> Self {
        let data = Self::load(&path).unwrap_or_default();
        Self {
            path,
            data: Mutex::new(data),
            save_notify: Notify::new(),
            is_dirty: AtomicBool::new(false),
        }
    }

    /// Load config from a JSON file, returning default on missing file.
    pub fn load(path: &Path) -> Result<CaptureConfig> {
        if !path.exists() {
            return Ok(CaptureConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Current config value.
    pub fn get(&self) -> CaptureConfig {
        self.data.lock().clone()
    }

    /// Replace the config and trigger a debounced save.
    pub fn set(&self, config: CaptureConfig) {
        *self.data.lock() = config;
        self.is_dirty.store(true, Ordering::Release);
        self.save_notify.notify_one();
    }

    /// Save the current config to disk atomically (write .tmp then rename).
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Start the debounce task — waits for a dirty notification, sleeps, then
    /// saves. Must be called from within a Tokio runtime.
    ///
    /// The `AtomicBool` dirty flag keeps notifications from being lost
    /// between `save()` completing and `notified().await` re-registering.
    pub fn start_debounce_task(self: &Arc<Self>) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                store.save_notify.notified().await;
                tokio::time::sleep(SAVE_DEBOUNCE).await;
                if store.is_dirty.swap(false, Ordering::AcqRel) {
                    if let Err(e) = store.save() {
                        tracing::warn!("Failed to save config: {e}");
                    }
                }
            }
        });
    }
}
