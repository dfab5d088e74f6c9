use std::ops::RangeInclusive;

use anyhow::{Result, ensure};
use log::{debug, info, warn};

use crate::beat::Beat;
use crate::clock::Clock;
use crate::instrument::Instrument;
use crate::judge::{HitReport, JudgeConfig, JudgeStats};
use crate::note::{LaneColor, Note, Timed};

/// Position of a note inside a chart: beat index, then index within the beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId {
    pub beat: usize,
    pub index: usize,
}

/// What one `update` call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub newly_missed: usize,
    pub beats_advanced: usize,
    pub finished: bool,
}

/// Scrolling chart: ordered beats, a beat cursor driven by the clock, miss
/// detection and input resolution over a three-beat focus window.
///
/// `update` and `handle_input` take `&mut self`; hosts that poll input on a
/// different thread must serialize both behind one lock per chart.
pub struct Chart<C> {
    beats: Vec<Beat>,
    current_beat: usize,
    ticks_remaining: i64,
    last_tick: i64,
    start_tick: i64,
    instrument: Box<dyn Instrument>,
    judge: JudgeConfig,
    clock: C,
    stats: JudgeStats,
}

impl<C: Clock> Chart<C> {
    /// Build a chart with default judge windows. See [`Chart::with_judge`].
    pub fn new(clock: C, instrument: Box<dyn Instrument>, beats: Vec<Beat>) -> Result<Self> {
        Self::with_judge(clock, instrument, beats, JudgeConfig::default())
    }

    /// Build a chart starting at the clock's current reading.
    ///
    /// Beats are laid end to end from that tick, which schedules every note.
    /// Fails on an empty beat list or a beat that already belongs to a chart.
    pub fn with_judge(
        clock: C,
        instrument: Box<dyn Instrument>,
        mut beats: Vec<Beat>,
        mut judge: JudgeConfig,
    ) -> Result<Self> {
        ensure!(!beats.is_empty(), "chart needs at least one beat");
        judge.validate();

        let start_tick = clock.ticks();
        let mut tick = start_tick;
        for beat in &mut beats {
            beat.assign_start_tick(tick)?;
            tick += beat.duration_ticks();
        }
        lay_out_sustains(&mut beats);

        let total = beats.iter().map(|b| b.notes().len()).sum();
        info!(
            "chart built: {} beats, {} notes, {} instrument, ticks {}..{}",
            beats.len(),
            total,
            instrument.name(),
            start_tick,
            tick
        );

        Ok(Self {
            ticks_remaining: beats[0].duration_ticks(),
            beats,
            current_beat: 0,
            last_tick: start_tick,
            start_tick,
            instrument,
            judge,
            clock,
            stats: JudgeStats::with_total(total),
        })
    }

    /// Beat indices examined for misses and hits: previous, current, next.
    pub fn focus_range(&self) -> RangeInclusive<usize> {
        let lo = self.current_beat.saturating_sub(1);
        let hi = (self.current_beat + 1).min(self.beats.len() - 1);
        lo..=hi
    }

    /// Notes of the focus window, earliest beat first, insertion order within a beat.
    pub fn notes_in_focus(&self) -> impl Iterator<Item = (NoteId, &Note)> + '_ {
        self.focus_range().flat_map(move |beat| {
            self.beats[beat]
                .notes()
                .iter()
                .enumerate()
                .map(move |(index, note)| (NoteId { beat, index }, note))
        })
    }

    /// Advance to `tick`: mark overdue notes missed, then move the beat cursor.
    ///
    /// A tick earlier than the last one observed is treated as no elapsed time.
    pub fn update(&mut self, tick: i64) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();

        for beat in self.focus_range() {
            for (index, note) in self.beats[beat].notes_mut().iter_mut().enumerate() {
                if note.is_resolved() {
                    continue;
                }
                let Some(note_tick) = note.absolute_tick() else {
                    continue;
                };
                if self.judge.is_late_miss(tick, note_tick) && note.mark_missed() {
                    self.stats.record_miss();
                    outcome.newly_missed += 1;
                    debug!(
                        "miss: beat {beat} note {index} ({}) at {note_tick}, now {tick}",
                        note.lane_color()
                    );
                }
            }
        }

        let mut dt = tick - self.last_tick;
        if dt < 0 {
            warn!(
                "tick went backwards ({} -> {}), ignoring elapsed time",
                self.last_tick, tick
            );
            dt = 0;
        } else {
            self.last_tick = tick;
        }

        // Overshoot past a beat boundary is charged to the next beat, so a
        // long stall can cross several beats in one call without drifting.
        self.ticks_remaining -= dt;
        while self.ticks_remaining <= 0 && self.current_beat + 1 < self.beats.len() {
            self.current_beat += 1;
            self.ticks_remaining += self.beats[self.current_beat].duration_ticks();
            outcome.beats_advanced += 1;
        }
        if outcome.beats_advanced > 0 {
            debug!(
                "cursor at beat {} ({} ms left)",
                self.current_beat, self.ticks_remaining
            );
        }

        outcome.finished = self.is_finished();
        outcome
    }

    /// [`Chart::update`] at the clock's current reading.
    pub fn update_now(&mut self) -> UpdateOutcome {
        let tick = self.clock.ticks();
        self.update(tick)
    }

    /// Resolve one press batch at the clock's current reading.
    ///
    /// Walks the focus window in order and hits the first unresolved note
    /// within the hit window that the instrument accepts. At most one note is
    /// resolved per call; the earliest registered note wins ties.
    pub fn handle_input(&mut self, pressed: &[LaneColor]) -> Option<HitReport> {
        let tick = self.clock.ticks();

        for beat in self.focus_range() {
            for index in 0..self.beats[beat].notes().len() {
                let note = &self.beats[beat].notes()[index];
                if note.is_resolved() {
                    continue;
                }
                let Some(note_tick) = note.absolute_tick() else {
                    continue;
                };
                if !self.judge.in_hit_window(tick, note_tick)
                    || !self.instrument.can_hit(note, pressed)
                {
                    continue;
                }

                self.beats[beat].notes_mut()[index].mark_hit();
                let report = HitReport {
                    note: NoteId { beat, index },
                    note_tick,
                    press_tick: tick,
                };
                self.stats.record_hit(&report);
                debug!(
                    "hit: beat {beat} note {index} at {note_tick}, offset {} ms",
                    report.offset_ms()
                );
                return Some(report);
            }
        }
        None
    }

    /// True once the cursor sits on the last beat and its time has run out.
    pub fn is_finished(&self) -> bool {
        self.current_beat + 1 == self.beats.len() && self.ticks_remaining <= 0
    }

    pub fn current_beat_index(&self) -> usize {
        self.current_beat
    }

    pub fn ticks_remaining(&self) -> i64 {
        self.ticks_remaining
    }

    pub fn last_observed_tick(&self) -> i64 {
        self.last_tick
    }

    /// Tick the first beat starts at.
    pub fn start_tick(&self) -> i64 {
        self.start_tick
    }

    /// Tick the last beat ends at.
    pub fn end_tick(&self) -> i64 {
        self.beats
            .last()
            .and_then(Beat::end_tick)
            .unwrap_or(self.start_tick)
    }

    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    pub fn beat(&self, index: usize) -> Option<&Beat> {
        self.beats.get(index)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.beats.get(id.beat)?.notes().get(id.index)
    }

    /// Every note with its id, in chart order.
    pub fn notes(&self) -> impl Iterator<Item = (NoteId, &Note)> + '_ {
        self.beats.iter().enumerate().flat_map(|(beat, b)| {
            b.notes()
                .iter()
                .enumerate()
                .map(move |(index, note)| (NoteId { beat, index }, note))
        })
    }

    pub fn instrument(&self) -> &dyn Instrument {
        self.instrument.as_ref()
    }

    pub fn judge(&self) -> &JudgeConfig {
        &self.judge
    }

    pub fn stats(&self) -> &JudgeStats {
        &self.stats
    }
}

/// Spread each sustain over the beats it covers. The first portion is
/// limited to what is left of the note's own beat; the rest carries forward
/// one beat at a time and is cut off at the end of the chart.
fn lay_out_sustains(beats: &mut [Beat]) {
    let mut carried: Vec<(NoteId, i64)> = Vec::new();

    for beat in 0..beats.len() {
        let duration = beats[beat].duration_ticks();

        for (id, left) in carried.iter_mut() {
            let portion = (*left).min(duration);
            beats[id.beat].notes_mut()[id.index].add_sustain_portion(portion, duration);
            *left -= portion;
        }
        carried.retain(|(_, left)| *left > 0);

        for index in 0..beats[beat].notes().len() {
            let note = &beats[beat].notes()[index];
            if !note.has_sustain() {
                continue;
            }
            let sustain = note.sustain_duration();
            let portion = sustain.min(beats[beat].remaining_after(note));
            beats[beat].notes_mut()[index].add_sustain_portion(portion, duration);
            if sustain > portion {
                carried.push((NoteId { beat, index }, sustain - portion));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::instrument::Drums;
    use crate::note::NoteState;

    fn two_beat_chart(clock: &ManualClock) -> Chart<&ManualClock> {
        let beats = vec![
            Beat::new(120, vec![Note::new(LaneColor::Red, 0.5)]).unwrap(),
            Beat::empty(120).unwrap(),
        ];
        Chart::new(clock, Box::new(Drums), beats).unwrap()
    }

    const FIRST: NoteId = NoteId { beat: 0, index: 0 };

    #[test]
    fn empty_chart_is_rejected() {
        let clock = ManualClock::new();
        assert!(Chart::new(&clock, Box::new(Drums), Vec::new()).is_err());
    }

    #[test]
    fn construction_places_beats_from_clock() {
        let clock = ManualClock::starting_at(1_000);
        let beats = vec![
            Beat::empty(120).unwrap(),
            Beat::empty(60).unwrap(),
            Beat::new(240, vec![Note::new(LaneColor::Blue, 0.5)]).unwrap(),
        ];
        let chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();

        let starts: Vec<_> = chart.beats().iter().map(|b| b.start_tick()).collect();
        assert_eq!(starts, vec![Some(1_000), Some(1_500), Some(2_500)]);
        assert_eq!(chart.end_tick(), 2_750);
        assert_eq!(
            chart.note(NoteId { beat: 2, index: 0 }).unwrap().absolute_tick(),
            Some(2_625)
        );
        assert_eq!(chart.current_beat_index(), 0);
        assert_eq!(chart.ticks_remaining(), 500);
        assert_eq!(chart.last_observed_tick(), 1_000);
    }

    #[test]
    fn cursor_follows_ticks() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);

        let outcome = chart.update(260);
        assert_eq!(chart.current_beat_index(), 0);
        assert_eq!(chart.ticks_remaining(), 240);
        assert_eq!(outcome.beats_advanced, 0);

        let outcome = chart.update(1_100);
        assert_eq!(chart.current_beat_index(), 1);
        assert_eq!(outcome.beats_advanced, 1);
        assert!(outcome.finished);
        assert!(chart.is_finished());
    }

    #[test]
    fn boundary_tick_advances() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);
        chart.update(500);
        assert_eq!(chart.current_beat_index(), 1);
        assert_eq!(chart.ticks_remaining(), 500);
    }

    #[test]
    fn hit_then_repeat_is_noop() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);

        clock.set(270);
        let report = chart.handle_input(&[LaneColor::Red]).unwrap();
        assert_eq!(report.note, FIRST);
        assert_eq!(report.offset_ms(), 20);
        assert_eq!(chart.note(FIRST).unwrap().state(), NoteState::Hit);

        clock.set(800);
        assert!(chart.handle_input(&[LaneColor::Red]).is_none());
        assert_eq!(chart.stats().hits, 1);
    }

    #[test]
    fn wrong_pad_does_not_hit() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);
        clock.set(250);
        assert!(chart.handle_input(&[LaneColor::Green]).is_none());
        assert!(!chart.note(FIRST).unwrap().is_resolved());
    }

    #[test]
    fn press_outside_window_does_nothing() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);
        clock.set(150);
        assert!(chart.handle_input(&[LaneColor::Red]).is_none());
        clock.set(151);
        assert!(chart.handle_input(&[LaneColor::Red]).is_some());
    }

    #[test]
    fn unhit_note_is_missed() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);

        let outcome = chart.update(450);
        assert_eq!(outcome.newly_missed, 0);

        let outcome = chart.update(480);
        assert_eq!(outcome.newly_missed, 1);
        assert!(chart.note(FIRST).unwrap().is_missed());

        let outcome = chart.update(490);
        assert_eq!(outcome.newly_missed, 0);
        assert_eq!(chart.stats().misses, 1);
    }

    #[test]
    fn missed_note_cannot_be_hit() {
        let clock = ManualClock::new();
        let mut chart = Chart::with_judge(
            &clock,
            Box::new(Drums),
            vec![Beat::new(120, vec![Note::new(LaneColor::Red, 0.5)]).unwrap()],
            JudgeConfig::new(10, 100),
        )
        .unwrap();
        chart.update(300);
        assert!(chart.note(FIRST).unwrap().is_missed());

        clock.set(300);
        assert!(chart.handle_input(&[LaneColor::Red]).is_none());
    }

    #[test]
    fn stall_crosses_several_beats() {
        let clock = ManualClock::new();
        let beats = (0..6).map(|_| Beat::empty(120).unwrap()).collect();
        let mut chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();

        chart.update(100);
        let outcome = chart.update(1_700);
        assert_eq!(outcome.beats_advanced, 3);
        assert_eq!(chart.current_beat_index(), 3);
        assert_eq!(chart.ticks_remaining(), 300);

        let outcome = chart.update(10_000);
        assert_eq!(chart.current_beat_index(), 5);
        assert_eq!(outcome.beats_advanced, 2);
        assert!(outcome.finished);
    }

    #[test]
    fn duplicate_and_backward_ticks_keep_cursor() {
        let clock = ManualClock::new();
        let mut chart = two_beat_chart(&clock);
        chart.update(300);
        chart.update(300);
        assert_eq!(chart.ticks_remaining(), 200);
        chart.update(100);
        assert_eq!(chart.ticks_remaining(), 200);
        assert_eq!(chart.last_observed_tick(), 300);
        assert_eq!(chart.current_beat_index(), 0);
    }

    #[test]
    fn earliest_registered_note_wins() {
        let clock = ManualClock::new();
        let beats = vec![
            Beat::new(
                120,
                vec![
                    Note::new(LaneColor::Red, 0.5),
                    Note::new(LaneColor::Red, 0.5),
                ],
            )
            .unwrap(),
        ];
        let mut chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();
        clock.set(250);

        assert_eq!(chart.handle_input(&[LaneColor::Red]).unwrap().note, FIRST);
        assert_eq!(
            chart.handle_input(&[LaneColor::Red]).unwrap().note,
            NoteId { beat: 0, index: 1 }
        );
        assert!(chart.handle_input(&[LaneColor::Red]).is_none());
    }

    #[test]
    fn chord_press_resolves_one_note() {
        let clock = ManualClock::new();
        let beats = vec![
            Beat::new(
                120,
                vec![
                    Note::new(LaneColor::Red, 0.5),
                    Note::new(LaneColor::Blue, 0.5),
                ],
            )
            .unwrap(),
        ];
        let mut chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();
        clock.set(250);

        assert!(chart.handle_input(&[LaneColor::Red, LaneColor::Blue]).is_some());
        assert_eq!(chart.stats().hits, 1);
    }

    #[test]
    fn focus_window_spans_neighbours() {
        let clock = ManualClock::new();
        let beats = (0..5)
            .map(|_| Beat::new(120, vec![Note::new(LaneColor::Red, 0.0)]).unwrap())
            .collect();
        let mut chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();

        assert_eq!(chart.focus_range(), 0..=1);
        chart.update(1_000);
        assert_eq!(chart.focus_range(), 1..=3);
        let beats: Vec<_> = chart.notes_in_focus().map(|(id, _)| id.beat).collect();
        assert_eq!(beats, vec![1, 2, 3]);
        chart.update(5_000);
        assert_eq!(chart.focus_range(), 3..=4);
    }

    #[test]
    fn sustain_carries_into_following_beats() {
        let clock = ManualClock::new();
        let beats = vec![
            Beat::new(120, vec![Note::with_sustain(LaneColor::Red, 0.5, 1_000)]).unwrap(),
            Beat::empty(120).unwrap(),
            Beat::empty(60).unwrap(),
        ];
        let chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();
        let note = chart.note(FIRST).unwrap();

        // 250 ms in beat 0, 500 ms in beat 1, 250 ms of the 1000 ms beat 2
        assert_eq!(note.sustain_rendered_ms(), 1_000);
        assert!((note.sustain_beats() - 1.75).abs() < 1e-9);
    }

    #[test]
    fn sustain_is_clipped_at_chart_end() {
        let clock = ManualClock::new();
        let beats = vec![
            Beat::new(120, vec![Note::with_sustain(LaneColor::Red, 0.0, 800)]).unwrap(),
        ];
        let chart = Chart::new(&clock, Box::new(Drums), beats).unwrap();
        let note = chart.note(FIRST).unwrap();
        assert_eq!(note.sustain_duration(), 800);
        assert_eq!(note.sustain_rendered_ms(), 500);
    }
}
