use std::collections::BTreeMap;

use coverband_chart::LaneColor;

/// Held-symbol tracking.
///
/// Turns a stream of key state changes into discrete press events: a symbol
/// that is already held does not press again until it has been released.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    /// Held symbol and the tick it went down at.
    held: BTreeMap<LaneColor, i64>,
    presses: usize,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one state change. Returns the symbol when this is a fresh press.
    pub fn apply(&mut self, symbol: LaneColor, pressed: bool, tick: i64) -> Option<LaneColor> {
        if !pressed {
            self.held.remove(&symbol);
            return None;
        }
        if self.held.contains_key(&symbol) {
            return None;
        }
        self.held.insert(symbol, tick);
        self.presses += 1;
        Some(symbol)
    }

    pub fn is_held(&self, symbol: LaneColor) -> bool {
        self.held.contains_key(&symbol)
    }

    /// Tick at which `symbol` went down, if it is held.
    pub fn held_since(&self, symbol: LaneColor) -> Option<i64> {
        self.held.get(&symbol).copied()
    }

    /// Currently held symbols in colour order.
    pub fn held(&self) -> Vec<LaneColor> {
        self.held.keys().copied().collect()
    }

    /// Fresh presses seen so far.
    pub fn presses(&self) -> usize {
        self.presses
    }

    /// Release everything (focus loss, pause).
    pub fn reset(&mut self) {
        self.held.clear();
    }
}
