use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chart::NoteId;

pub const DEFAULT_MISS_THRESHOLD_MS: i64 = 200;
pub const DEFAULT_HIT_THRESHOLD_MS: i64 = 100;
pub const THRESHOLD_MIN_MS: i64 = 1;
pub const THRESHOLD_MAX_MS: i64 = 10_000;

/// Tolerance windows for hit/miss judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct JudgeConfig {
    /// A note unresolved for longer than this after its tick becomes Missed.
    pub miss_threshold_ms: i64,
    /// A press counts only when strictly closer than this to the note's tick.
    pub hit_threshold_ms: i64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            miss_threshold_ms: DEFAULT_MISS_THRESHOLD_MS,
            hit_threshold_ms: DEFAULT_HIT_THRESHOLD_MS,
        }
    }
}

impl JudgeConfig {
    pub fn new(miss_threshold_ms: i64, hit_threshold_ms: i64) -> Self {
        let mut config = Self {
            miss_threshold_ms,
            hit_threshold_ms,
        };
        config.validate();
        config
    }

    pub fn validate(&mut self) {
        self.miss_threshold_ms = self
            .miss_threshold_ms
            .clamp(THRESHOLD_MIN_MS, THRESHOLD_MAX_MS);
        self.hit_threshold_ms = self
            .hit_threshold_ms
            .clamp(THRESHOLD_MIN_MS, THRESHOLD_MAX_MS);
    }

    /// True once `tick` is more than the miss threshold past `note_tick`.
    pub fn is_late_miss(&self, tick: i64, note_tick: i64) -> bool {
        tick - note_tick > self.miss_threshold_ms
    }

    pub fn in_hit_window(&self, tick: i64, note_tick: i64) -> bool {
        (note_tick - tick).abs() < self.hit_threshold_ms
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading judge config {}", path.display()))?;
        let mut config: JudgeConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing judge config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Timing direction of a hit, for FAST/SLOW feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDirection {
    Fast,
    Exact,
    Slow,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: i64 = 1;

    /// `offset_ms` is press tick minus note tick.
    pub fn from_offset(offset_ms: i64) -> Self {
        if offset_ms < -Self::EXACT_THRESHOLD_MS {
            TimingDirection::Fast
        } else if offset_ms > Self::EXACT_THRESHOLD_MS {
            TimingDirection::Slow
        } else {
            TimingDirection::Exact
        }
    }
}

/// A note resolved as hit by one input call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub note: NoteId,
    pub note_tick: i64,
    pub press_tick: i64,
}

impl HitReport {
    pub fn offset_ms(&self) -> i64 {
        self.press_tick - self.note_tick
    }

    pub fn direction(&self) -> TimingDirection {
        TimingDirection::from_offset(self.offset_ms())
    }
}

/// Running judgment counts for one chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JudgeStats {
    pub total: usize,
    pub hits: usize,
    pub misses: usize,
    pub fast: usize,
    pub slow: usize,
}

impl JudgeStats {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_hit(&mut self, report: &HitReport) {
        self.hits += 1;
        match report.direction() {
            TimingDirection::Fast => self.fast += 1,
            TimingDirection::Slow => self.slow += 1,
            TimingDirection::Exact => {}
        }
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn resolved(&self) -> usize {
        self.hits + self.misses
    }

    pub fn unresolved(&self) -> usize {
        self.total.saturating_sub(self.resolved())
    }

    /// Hit percentage of all notes, 0.0 for an empty chart.
    pub fn hit_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 * 100.0 / self.total as f64
        }
    }
}
