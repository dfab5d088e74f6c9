use serde::{Deserialize, Serialize};

use crate::beat::Beat;
use crate::lane::{InstrumentKind, WHOLE_CHART_LANE};
use crate::note::Note;

/// Chart geometry in world units. Presentation only; judgment never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct LayoutConfig {
    pub chart_width: f32,
    pub line_width: f32,
    /// Scroll speed in units per second.
    pub scroll_speed: f32,
    pub fat_note_height: f32,
    pub skinny_note_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            chart_width: 10.0,
            line_width: 0.1,
            scroll_speed: 8.0,
            fat_note_height: 0.4,
            skinny_note_height: 0.15,
        }
    }
}

/// Placement of one note relative to the bottom of its beat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Spans every lane (the drum kick).
    pub whole_chart: bool,
}

impl LayoutConfig {
    pub fn validate(&mut self) {
        let default = Self::default();
        if !(self.chart_width > 0.0) {
            self.chart_width = default.chart_width;
        }
        self.line_width = self.line_width.clamp(0.0, self.chart_width / 10.0);
        if !(self.scroll_speed > 0.0) {
            self.scroll_speed = default.scroll_speed;
        }
        self.fat_note_height = self.fat_note_height.max(0.0);
        self.skinny_note_height = self.skinny_note_height.max(0.0);
    }

    pub fn lane_width(&self, kind: InstrumentKind) -> f32 {
        let lanes = kind.lane_count() as f32;
        (self.chart_width - (lanes + 1.0) * self.line_width) / lanes
    }

    /// Length of `ms` milliseconds along the scroll axis.
    pub fn ms_to_units(&self, ms: i64) -> f32 {
        self.scroll_speed * ms as f32 / 1000.0
    }

    pub fn beat_height(&self, beat: &Beat) -> f32 {
        self.ms_to_units(beat.duration_ticks())
    }

    pub fn note_rect(&self, kind: InstrumentKind, note: &Note, beat_height: f32) -> NoteRect {
        let lane = kind
            .lane_index(note.lane_color())
            .unwrap_or(WHOLE_CHART_LANE);
        let (x, width, height, whole_chart) = if lane == WHOLE_CHART_LANE {
            (0.0, self.chart_width, self.skinny_note_height, true)
        } else {
            let lane_width = self.lane_width(kind);
            let x = (lane - 1) as f32 * lane_width + lane as f32 * self.line_width;
            (x, lane_width, self.fat_note_height, false)
        };
        NoteRect {
            x,
            y: note.position() as f32 * beat_height - height / 2.0,
            width,
            height,
            whole_chart,
        }
    }

    pub fn sustain_length(&self, note: &Note) -> f32 {
        self.ms_to_units(note.sustain_rendered_ms())
    }
}
