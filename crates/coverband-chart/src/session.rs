use std::rc::Rc;

use anyhow::Result;
use log::{info, trace};

use crate::beat::Beat;
use crate::chart::{Chart, UpdateOutcome};
use crate::clock::{Clock, PausableClock};
use crate::instrument::Instrument;
use crate::judge::{HitReport, JudgeConfig};
use crate::layout::LayoutConfig;
use crate::note::LaneColor;
use crate::render::{Presenter, draw_chart};

pub type SessionClock<C> = Rc<PausableClock<C>>;

/// State owned by the control loop: the chart, the clock it shares with the
/// chart, and the pause/running flags.
pub struct Session<C: Clock> {
    clock: SessionClock<C>,
    chart: Chart<SessionClock<C>>,
    layout: LayoutConfig,
    paused: bool,
    running: bool,
}

impl<C: Clock> Session<C> {
    pub fn new(
        clock: C,
        instrument: Box<dyn Instrument>,
        beats: Vec<Beat>,
        judge: JudgeConfig,
        mut layout: LayoutConfig,
    ) -> Result<Self> {
        layout.validate();
        let clock = Rc::new(PausableClock::new(clock));
        let chart = Chart::with_judge(Rc::clone(&clock), instrument, beats, judge)?;
        info!("session started at tick {}", chart.start_tick());
        Ok(Self {
            clock,
            chart,
            layout,
            paused: false,
            running: true,
        })
    }

    /// One update/draw cycle. Skipped while paused or after `quit`.
    pub fn frame(&mut self, presenter: &mut dyn Presenter) -> Result<Option<UpdateOutcome>> {
        if self.paused || !self.running {
            return Ok(None);
        }
        let tick = self.clock.ticks();
        let outcome = self.chart.update(tick);
        let drawn = draw_chart(&self.chart, tick, &self.layout, presenter)?;
        trace!("frame at {tick}: {drawn} draw commands");
        Ok(Some(outcome))
    }

    /// Update without drawing.
    pub fn update(&mut self) -> Option<UpdateOutcome> {
        if self.paused || !self.running {
            return None;
        }
        Some(self.chart.update_now())
    }

    /// Forward one press event to the chart. Ignored while paused.
    pub fn press(&mut self, symbols: &[LaneColor]) -> Option<HitReport> {
        if self.paused || !self.running {
            return None;
        }
        self.chart.handle_input(symbols)
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.clock.pause();
            self.paused = true;
            info!("paused at tick {}", self.clock.ticks());
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.clock.resume();
            self.paused = false;
            info!("resumed at tick {}", self.clock.ticks());
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Milliseconds of play since the chart started, pauses excluded.
    pub fn elapsed(&self) -> i64 {
        self.clock.ticks() - self.chart.start_tick()
    }

    /// True once the chart has finished and its last notes are past the miss window.
    pub fn is_over(&self) -> bool {
        self.chart.is_finished()
            && self.chart.last_observed_tick()
                > self.chart.end_tick() + self.chart.judge().miss_threshold_ms
    }

    pub fn chart(&self) -> &Chart<SessionClock<C>> {
        &self.chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::instrument::Drums;
    use crate::note::Note;
    use crate::render::CommandRecorder;

    fn session(clock: &ManualClock) -> Session<&ManualClock> {
        let beats = vec![
            Beat::new(120, vec![Note::new(LaneColor::Red, 0.5)]).unwrap(),
            Beat::empty(120).unwrap(),
        ];
        Session::new(
            clock,
            Box::new(Drums),
            beats,
            JudgeConfig::default(),
            LayoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn frame_updates_and_draws() {
        let clock = ManualClock::new();
        let mut session = session(&clock);
        let mut recorder = CommandRecorder::new();

        clock.set(600);
        let outcome = session.frame(&mut recorder).unwrap().unwrap();
        assert_eq!(outcome.beats_advanced, 1);
        assert_eq!(outcome.newly_missed, 1);
        assert_eq!(recorder.frames(), 1);
    }

    #[test]
    fn pause_freezes_judgment() {
        let clock = ManualClock::new();
        let mut session = session(&clock);
        let mut recorder = CommandRecorder::new();

        clock.set(200);
        session.pause();
        assert!(session.frame(&mut recorder).unwrap().is_none());
        assert!(session.press(&[LaneColor::Red]).is_none());

        // A long pause must not turn into a miss.
        clock.set(5_000);
        session.resume();
        assert_eq!(session.elapsed(), 200);
        session.update();
        assert!(!session.chart().notes().any(|(_, n)| n.is_resolved()));

        clock.set(5_070);
        // 200 ms of play before the pause plus 70 ms after it.
        assert_eq!(session.elapsed(), 270);
    }

    #[test]
    fn press_after_resume_hits() {
        let clock = ManualClock::new();
        let mut session = session(&clock);

        clock.set(100);
        session.toggle_pause();
        assert!(session.is_paused());
        clock.set(1_100);
        session.toggle_pause();
        assert!(!session.is_paused());

        clock.set(1_250);
        let report = session.press(&[LaneColor::Red]).unwrap();
        assert_eq!(report.press_tick, 250);
    }

    #[test]
    fn quit_stops_the_loop() {
        let clock = ManualClock::new();
        let mut session = session(&clock);
        session.quit();
        assert!(!session.is_running());
        assert!(session.update().is_none());
    }

    #[test]
    fn over_after_last_miss_window() {
        let clock = ManualClock::new();
        let mut session = session(&clock);
        clock.set(1_000);
        session.update();
        assert!(session.chart().is_finished());
        assert!(!session.is_over());

        clock.set(1_201);
        session.update();
        assert!(session.is_over());
    }
}
