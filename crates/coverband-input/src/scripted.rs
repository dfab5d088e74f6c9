use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::event::{InputProvider, KeyEvent};

/// Replays a fixed list of key events by tick.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: Vec<KeyEvent>,
    cursor: usize,
    held: BTreeSet<String>,
}

impl ScriptedInput {
    /// Events are replayed in tick order; equal ticks keep their given order.
    pub fn new(mut events: Vec<KeyEvent>) -> Self {
        events.sort_by_key(|e| e.tick);
        Self {
            events,
            cursor: 0,
            held: BTreeSet::new(),
        }
    }

    /// Load a JSON array of `{ key, pressed, tick }` events.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading input script {}", path.display()))?;
        let events: Vec<KeyEvent> = serde_json::from_str(&data)
            .with_context(|| format!("parsing input script {}", path.display()))?;
        Ok(Self::new(events))
    }

    pub fn write_events(events: &[KeyEvent], path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(events)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing input script {}", path.display()))?;
        Ok(())
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    /// Tick of the last event, 0 for an empty script.
    pub fn last_tick(&self) -> i64 {
        self.events.last().map_or(0, |e| e.tick)
    }
}

impl InputProvider for ScriptedInput {
    fn poll_up_to(&mut self, now: i64) -> Vec<KeyEvent> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].tick <= now {
            let event = &self.events[self.cursor];
            if event.pressed {
                self.held.insert(event.key.clone());
            } else {
                self.held.remove(&event.key);
            }
            self.cursor += 1;
        }
        self.events[start..self.cursor].to_vec()
    }

    fn next_tick(&self) -> Option<i64> {
        self.events.get(self.cursor).map(|e| e.tick)
    }

    fn is_pressed(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }
}
