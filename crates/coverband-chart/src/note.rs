use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Lane colour tag. Doubles as the abstract input symbol a press resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneColor {
    Red,
    Yellow,
    Blue,
    Green,
    Orange,
}

impl LaneColor {
    /// Returns all colours in order.
    pub fn all() -> &'static [LaneColor] {
        &[
            LaneColor::Red,
            LaneColor::Yellow,
            LaneColor::Blue,
            LaneColor::Green,
            LaneColor::Orange,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            LaneColor::Red => "red",
            LaneColor::Yellow => "yellow",
            LaneColor::Blue => "blue",
            LaneColor::Green => "green",
            LaneColor::Orange => "orange",
        }
    }
}

impl fmt::Display for LaneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LaneColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(LaneColor::Red),
            "yellow" => Ok(LaneColor::Yellow),
            "blue" => Ok(LaneColor::Blue),
            "green" => Ok(LaneColor::Green),
            "orange" => Ok(LaneColor::Orange),
            other => bail!("unknown lane color: {other}"),
        }
    }
}

/// Resolution state of a note. `Hit` and `Missed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteState {
    #[default]
    Unresolved,
    Hit,
    Missed,
}

/// Anything scheduled at an absolute tick.
pub trait Timed {
    /// Absolute tick in milliseconds, `None` until the owner has been placed in a chart.
    fn absolute_tick(&self) -> Option<i64>;
}

/// A single timed input target.
#[derive(Debug, Clone)]
pub struct Note {
    lane_color: LaneColor,
    /// Fraction of the owning beat, clamped to [0.0, 1.0].
    position: f64,
    /// Requested sustain in milliseconds.
    sustain_ms: i64,
    absolute_tick: Option<i64>,
    state: NoteState,
    /// Sustain actually laid out across beats (clipped at the chart end).
    sustain_rendered_ms: i64,
    /// Sustain length measured in beats of the beats it spans.
    sustain_beats: f64,
}

impl Note {
    /// Create a note without sustain.
    pub fn new(lane_color: LaneColor, position: f64) -> Self {
        Self::with_sustain(lane_color, position, 0)
    }

    /// Create a note held for `sustain_ms` milliseconds. Negative sustain is treated as none.
    pub fn with_sustain(lane_color: LaneColor, position: f64, sustain_ms: i64) -> Self {
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        Self {
            lane_color,
            position,
            sustain_ms: sustain_ms.max(0),
            absolute_tick: None,
            state: NoteState::Unresolved,
            sustain_rendered_ms: 0,
            sustain_beats: 0.0,
        }
    }

    pub fn lane_color(&self) -> LaneColor {
        self.lane_color
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn sustain_duration(&self) -> i64 {
        self.sustain_ms
    }

    pub fn has_sustain(&self) -> bool {
        self.sustain_ms > 0
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        self.state != NoteState::Unresolved
    }

    pub fn is_hit(&self) -> bool {
        self.state == NoteState::Hit
    }

    pub fn is_missed(&self) -> bool {
        self.state == NoteState::Missed
    }

    /// Resolve as hit. Returns true if the state changed.
    pub fn mark_hit(&mut self) -> bool {
        if self.state != NoteState::Unresolved {
            return false;
        }
        self.state = NoteState::Hit;
        true
    }

    /// Resolve as missed. Returns true if the state changed; presenters pick the
    /// change up through `state()` and recolour the note.
    pub fn mark_missed(&mut self) -> bool {
        if self.state != NoteState::Unresolved {
            return false;
        }
        self.state = NoteState::Missed;
        true
    }

    /// Sustain milliseconds laid out on the chart. Less than `sustain_duration()`
    /// when the hold runs past the last beat.
    pub fn sustain_rendered_ms(&self) -> i64 {
        self.sustain_rendered_ms
    }

    pub fn sustain_beats(&self) -> f64 {
        self.sustain_beats
    }

    /// Set once by the owning beat. Later calls are ignored.
    pub(crate) fn assign_tick(&mut self, tick: i64) {
        if self.absolute_tick.is_none() {
            self.absolute_tick = Some(tick);
        }
    }

    pub(crate) fn add_sustain_portion(&mut self, portion_ms: i64, beat_duration_ms: i64) {
        if portion_ms <= 0 || beat_duration_ms <= 0 {
            return;
        }
        self.sustain_rendered_ms += portion_ms;
        self.sustain_beats += portion_ms as f64 / beat_duration_ms as f64;
    }
}

impl Timed for Note {
    fn absolute_tick(&self) -> Option<i64> {
        self.absolute_tick
    }
}
