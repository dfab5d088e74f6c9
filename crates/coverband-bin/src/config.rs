use std::path::Path;

use anyhow::{Context, Result};
use coverband_chart::{InstrumentKind, JudgeConfig, LayoutConfig};
use coverband_input::KeyMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAME_MS: i64 = 16;
pub const DEFAULT_GRACE_MS: i64 = 1_000;

/// Session settings read from `--config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SessionConfig {
    pub judge: JudgeConfig,
    pub layout: LayoutConfig,
    /// Falls back to the chart instrument's default bindings.
    pub key_map: Option<KeyMap>,
    /// Length of one update/draw cycle.
    pub frame_ms: i64,
    /// Extra time after the last note before the run stops.
    pub grace_ms: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            judge: JudgeConfig::default(),
            layout: LayoutConfig::default(),
            key_map: None,
            frame_ms: DEFAULT_FRAME_MS,
            grace_ms: DEFAULT_GRACE_MS,
        }
    }
}

impl SessionConfig {
    pub fn validate(&mut self) {
        self.judge.validate();
        self.layout.validate();
        if let Some(key_map) = &mut self.key_map {
            key_map.validate();
        }
        self.frame_ms = self.frame_ms.clamp(1, 1_000);
        self.grace_ms = self.grace_ms.clamp(0, 60_000);
    }

    /// Bindings for `instrument`: the configured map when it targets that
    /// instrument, its defaults otherwise.
    pub fn key_map_for(&self, instrument: InstrumentKind) -> KeyMap {
        match &self.key_map {
            Some(map) if map.instrument == instrument => map.clone(),
            _ => KeyMap::defaults(instrument),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: SessionConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }
}
