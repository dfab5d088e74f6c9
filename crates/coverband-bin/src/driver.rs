use std::fmt;

use anyhow::Result;
use coverband_chart::{Clock, CommandRecorder, JudgeStats, Session};
use coverband_input::{InputProvider, KeyRouter};
use log::{debug, info};

/// Outcome of one run, printed when the binary exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub hits: usize,
    pub misses: usize,
    pub unresolved: usize,
    pub fast: usize,
    pub slow: usize,
    /// Percentage of all notes hit.
    pub hit_rate: f64,
    pub frames: usize,
    pub elapsed_ms: i64,
}

impl RunSummary {
    fn new(stats: &JudgeStats, frames: usize, elapsed_ms: i64) -> Self {
        Self {
            total: stats.total,
            hits: stats.hits,
            misses: stats.misses,
            unresolved: stats.unresolved(),
            fast: stats.fast,
            slow: stats.slow,
            hit_rate: stats.hit_rate(),
            frames,
            elapsed_ms,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "notes:      {}", self.total)?;
        writeln!(f, "hits:       {} ({:.1}%)", self.hits, self.hit_rate)?;
        writeln!(f, "misses:     {}", self.misses)?;
        writeln!(f, "unresolved: {}", self.unresolved)?;
        writeln!(f, "fast/slow:  {}/{}", self.fast, self.slow)?;
        write!(f, "elapsed:    {} ms in {} frames", self.elapsed_ms, self.frames)
    }
}

/// Control loop. `wait` lets time pass: it steps a manual clock or sleeps
/// against the system clock.
///
/// Each frame waits up to `frame_ms`, stopping early at the tick of every
/// pending input event so each press is judged at its own tick rather than
/// at the end of the frame. Fresh presses become one `press` call each; the
/// frame then updates and draws. The loop ends once the session is over and
/// either the input has run dry or `grace_ms` has passed since the chart ended.
pub fn run<C: Clock>(
    session: &mut Session<C>,
    input: &mut dyn InputProvider,
    router: &mut KeyRouter,
    frame_ms: i64,
    grace_ms: i64,
    mut wait: impl FnMut(i64),
) -> Result<RunSummary> {
    let mut recorder = CommandRecorder::new();
    let chart_length = session.chart().end_tick() - session.chart().start_tick();

    while session.is_running() {
        let frame_end = session.elapsed() + frame_ms;

        while let Some(next) = input.next_tick().filter(|&tick| tick <= frame_end) {
            let now = session.elapsed();
            if next > now {
                wait(next - now);
            }
            dispatch(session, input, router);
        }
        let now = session.elapsed();
        if frame_end > now {
            wait(frame_end - now);
        }

        recorder.clear_commands();
        session.frame(&mut recorder)?;

        let now = session.elapsed();
        if session.is_over() && (input.is_finished() || now >= chart_length + grace_ms) {
            session.quit();
        }
    }

    let summary = RunSummary::new(
        session.chart().stats(),
        recorder.frames(),
        session.elapsed(),
    );
    info!(
        "session finished: {}/{} hit, {} missed",
        summary.hits, summary.total, summary.misses
    );
    Ok(summary)
}

/// Judge every event due at the session's current tick.
fn dispatch<C: Clock>(
    session: &mut Session<C>,
    input: &mut dyn InputProvider,
    router: &mut KeyRouter,
) {
    let now = session.elapsed();
    let events = input.poll_up_to(now);
    if events.is_empty() {
        return;
    }
    // Bring the focus window up to this tick before judging.
    session.update();
    for event in events {
        let Some(symbol) = router.route(&event) else {
            continue;
        };
        match session.press(&[symbol]) {
            Some(report) => debug!(
                "{} hit {:?} ({:?}, {} ms)",
                event.key,
                report.note,
                report.direction(),
                report.offset_ms()
            ),
            None => debug!("{} at {now}: nothing to hit", event.key),
        }
    }
}
