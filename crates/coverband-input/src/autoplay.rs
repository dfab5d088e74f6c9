//! Autoplay log generation.
//!
//! Builds the key events that play a chart perfectly: every note is pressed
//! on its tick and released once its sustain has run out.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use coverband_chart::{Chart, Clock, LaneColor, Timed};

use crate::event::KeyEvent;
use crate::key_map::KeyMap;

/// How long a note without sustain is held, in milliseconds.
pub const AUTOPLAY_HOLD_MS: i64 = 40;

/// Create the autoplay key log for `chart`. Ticks are relative to the chart start.
///
/// A key is always released before it is pressed again, so back-to-back
/// notes of one colour each get their own press.
pub fn create_autoplay_log<C: Clock>(chart: &Chart<C>, key_map: &KeyMap) -> Result<Vec<KeyEvent>> {
    let mut by_key: BTreeMap<&str, Vec<(i64, i64)>> = BTreeMap::new();
    for (id, note) in chart.notes() {
        let color = note.lane_color();
        let key = key_for(key_map, color)
            .with_context(|| format!("beat {} note {}", id.beat, id.index))?;
        let Some(tick) = note.absolute_tick() else {
            continue;
        };
        let hold = note.sustain_duration().max(AUTOPLAY_HOLD_MS);
        by_key
            .entry(key)
            .or_default()
            .push((tick - chart.start_tick(), hold));
    }

    let mut log = Vec::new();
    for (key, mut notes) in by_key {
        notes.sort_by_key(|&(tick, _)| tick);
        for (i, &(tick, hold)) in notes.iter().enumerate() {
            let mut release = tick + hold;
            if let Some(&(next, _)) = notes.get(i + 1) {
                release = release.min(next);
            }
            log.push(KeyEvent::press(key, tick));
            log.push(KeyEvent::release(key, release));
        }
    }
    // Stable: per-key press/release order survives equal ticks.
    log.sort_by_key(|e| e.tick);
    Ok(log)
}

fn key_for(key_map: &KeyMap, color: LaneColor) -> Result<&str> {
    key_map
        .key_for(color)
        .with_context(|| format!("no key bound to {color}"))
}
