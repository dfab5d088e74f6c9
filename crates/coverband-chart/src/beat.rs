use anyhow::{Result, ensure};

use crate::note::{Note, Timed};

pub const MS_PER_MINUTE: i64 = 60_000;

/// Highest tempo that still leaves a beat at least 1 ms long.
pub const MAX_BPM: u32 = MS_PER_MINUTE as u32;

/// Milliseconds per beat at `bpm`, truncated.
pub fn ms_per_beat(bpm: u32) -> i64 {
    MS_PER_MINUTE / i64::from(bpm.max(1))
}

/// Offset of `position` within a beat of `duration` ms.
///
/// Rounds half up (position is never negative, so `f64::round` is exact here):
/// 0.5 × 3 ms lands on 2 ms, not 1 ms.
pub fn position_to_offset(position: f64, duration: i64) -> i64 {
    (position * duration as f64).round() as i64
}

/// Fixed-tempo span holding its notes in insertion order.
#[derive(Debug, Clone)]
pub struct Beat {
    bpm: u32,
    duration_ticks: i64,
    start_tick: Option<i64>,
    notes: Vec<Note>,
}

impl Beat {
    pub fn new(bpm: u32, notes: Vec<Note>) -> Result<Self> {
        ensure!(bpm > 0, "beat tempo must be positive");
        ensure!(
            bpm <= MAX_BPM,
            "beat tempo {bpm} BPM is shorter than one millisecond"
        );
        Ok(Self {
            bpm,
            duration_ticks: ms_per_beat(bpm),
            start_tick: None,
            notes,
        })
    }

    /// Beat with no notes.
    pub fn empty(bpm: u32) -> Result<Self> {
        Self::new(bpm, Vec::new())
    }

    /// Append a note. Only valid before the beat is placed in a chart.
    pub fn push(&mut self, note: Note) -> Result<()> {
        ensure!(
            self.start_tick.is_none(),
            "cannot add notes to a beat already placed in a chart"
        );
        self.notes.push(note);
        Ok(())
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn duration_ticks(&self) -> i64 {
        self.duration_ticks
    }

    pub fn start_tick(&self) -> Option<i64> {
        self.start_tick
    }

    /// First tick after this beat.
    pub fn end_tick(&self) -> Option<i64> {
        self.start_tick.map(|t| t + self.duration_ticks)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn notes_mut(&mut self) -> &mut [Note] {
        &mut self.notes
    }

    /// Place the beat at `tick` and schedule every note at
    /// `tick + round(position × duration)`.
    pub fn assign_start_tick(&mut self, tick: i64) -> Result<()> {
        ensure!(
            self.start_tick.is_none(),
            "beat start tick already assigned"
        );
        self.start_tick = Some(tick);
        let duration = self.duration_ticks;
        for note in &mut self.notes {
            note.assign_tick(tick + position_to_offset(note.position(), duration));
        }
        Ok(())
    }

    /// Milliseconds left in this beat after `note`'s tick.
    pub(crate) fn remaining_after(&self, note: &Note) -> i64 {
        match (self.end_tick(), note.absolute_tick()) {
            (Some(end), Some(tick)) => (end - tick).max(0),
            _ => 0,
        }
    }
}

impl Timed for Beat {
    fn absolute_tick(&self) -> Option<i64> {
        self.start_tick
    }
}
