//! Helpers for building charts in tests.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for sibling crates.

use crate::beat::Beat;
use crate::chart::Chart;
use crate::clock::Clock;
use crate::judge::JudgeConfig;
use crate::lane::InstrumentKind;
use crate::note::{LaneColor, Note};

/// Fluent builder for test charts.
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    kind: InstrumentKind,
    judge: JudgeConfig,
    beats: Vec<(u32, Vec<Note>)>,
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self::new(InstrumentKind::Drums)
    }
}

impl ChartBuilder {
    pub fn new(kind: InstrumentKind) -> Self {
        Self {
            kind,
            judge: JudgeConfig::default(),
            beats: Vec::new(),
        }
    }

    pub fn judge(mut self, judge: JudgeConfig) -> Self {
        self.judge = judge;
        self
    }

    /// Append a beat with one note per `(color, position)` pair.
    pub fn beat(mut self, bpm: u32, notes: &[(LaneColor, f64)]) -> Self {
        let notes = notes
            .iter()
            .map(|&(color, position)| Note::new(color, position))
            .collect();
        self.beats.push((bpm, notes));
        self
    }

    /// Append a beat holding prebuilt notes.
    pub fn beat_with(mut self, bpm: u32, notes: Vec<Note>) -> Self {
        self.beats.push((bpm, notes));
        self
    }

    /// Append `count` beats without notes.
    pub fn rest(mut self, bpm: u32, count: usize) -> Self {
        for _ in 0..count {
            self.beats.push((bpm, Vec::new()));
        }
        self
    }

    /// Unplaced beats. Panics on an invalid tempo.
    pub fn beats(&self) -> Vec<Beat> {
        self.beats
            .iter()
            .map(|(bpm, notes)| Beat::new(*bpm, notes.clone()).expect("valid test tempo"))
            .collect()
    }

    /// Chart starting at the clock's current reading. Panics on an empty builder.
    pub fn build<C: Clock>(&self, clock: C) -> Chart<C> {
        Chart::with_judge(clock, self.kind.instrument(), self.beats(), self.judge)
            .expect("valid test chart")
    }
}

/// `beats` beats at `bpm`, each with a red note on the beat.
pub fn steady_chart(bpm: u32, beats: usize) -> ChartBuilder {
    (0..beats).fold(ChartBuilder::default(), |builder, _| {
        builder.beat(bpm, &[(LaneColor::Red, 0.0)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::note::Timed;

    #[test]
    fn builder_places_notes() {
        let clock = ManualClock::starting_at(100);
        let chart = ChartBuilder::new(InstrumentKind::Guitar)
            .beat(120, &[(LaneColor::Green, 0.5)])
            .rest(60, 2)
            .build(&clock);
        assert_eq!(chart.beats().len(), 3);
        assert_eq!(chart.end_tick(), 100 + 500 + 2_000);
        assert_eq!(chart.instrument().kind(), InstrumentKind::Guitar);
        assert_eq!(chart.notes().next().unwrap().1.absolute_tick(), Some(350));
    }

    #[test]
    fn steady_chart_has_one_note_per_beat() {
        let clock = ManualClock::new();
        let chart = steady_chart(60, 4).build(&clock);
        let ticks: Vec<_> = chart.notes().map(|(_, n)| n.absolute_tick()).collect();
        assert_eq!(ticks, vec![Some(0), Some(1_000), Some(2_000), Some(3_000)]);
    }
}
