//! Daemon settings file

use serde::{Deserialize, Serialize};
use snipebot_core::{Error, NewSnipeConfig, Result};
use snipebot_engine::EngineConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the settings path
pub const CONFIG_ENV: &str = "SNIPEBOT_CONFIG";

/// Background loop cadences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoopIntervals {
    pub market_tick_ms: u64,
    pub queue_drain_ms: u64,
    pub retention_sweep_ms: u64,
    pub network_stats_ms: u64,
    pub status_report_ms: u64,
}

impl LoopIntervals {
    pub fn market_tick(&self) -> Duration {
        Duration::from_millis(self.market_tick_ms.max(1))
    }

    pub fn queue_drain(&self) -> Duration {
        Duration::from_millis(self.queue_drain_ms.max(1))
    }

    pub fn retention_sweep(&self) -> Duration {
        Duration::from_millis(self.retention_sweep_ms.max(1))
    }

    pub fn network_stats(&self) -> Duration {
        Duration::from_millis(self.network_stats_ms.max(1))
    }

    pub fn status_report(&self) -> Duration {
        Duration::from_millis(self.status_report_ms.max(1))
    }
}

impl Default for LoopIntervals {
    fn default() -> Self {
        Self {
            market_tick_ms: 1_000,
            queue_drain_ms: 2_000,
            retention_sweep_ms: 30_000,
            network_stats_ms: 10_000,
            status_report_ms: 15_000,
        }
    }
}

/// A snipe registered at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupSnipe {
    #[serde(flatten)]
    pub config: NewSnipeConfig,
    /// Try to enable right away
    #[serde(default)]
    pub enabled: bool,
    /// The user confirmed the risk settings
    #[serde(default)]
    pub acknowledged: bool,
}

/// Everything the daemon reads at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonSettings {
    pub engine: EngineConfig,
    pub intervals: LoopIntervals,
    /// Start trading as soon as the loops are up
    pub auto_start: bool,
    /// Seed the practice snipe and trade history
    pub demo_mode: bool,
    /// Stop after this many seconds; run until Ctrl+C when unset
    pub run_duration_secs: Option<u64>,
    /// Seed for every random source; entropy when unset
    pub seed: Option<u64>,
    pub snipes: Vec<StartupSnipe>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            intervals: LoopIntervals::default(),
            auto_start: true,
            demo_mode: false,
            run_duration_secs: None,
            seed: None,
            snipes: Vec::new(),
        }
    }
}

impl DaemonSettings {
    /// Defaults in practice mode
    pub fn demo() -> Self {
        Self {
            demo_mode: true,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Settings(e.to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Load from `SNIPEBOT_CONFIG` or the default location.
    /// Falls back to practice mode when the file is missing or unreadable.
    pub fn load() -> Self {
        let path = settings_path();
        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{} - running in demo mode with default settings", e);
                Self::demo()
            }
        }
    }
}

/// `$SNIPEBOT_CONFIG`, else `<data_local_dir>/SnipeBot/settings.json`
pub fn settings_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::data_local_dir()
        .map(|p| p.join("SnipeBot"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("settings.json")
}
