use serde::{Deserialize, Serialize};

/// Key state change at a specific point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name, as used in key maps ("a", "space", "1").
    pub key: String,
    /// true = pressed, false = released.
    pub pressed: bool,
    /// Milliseconds from session start.
    pub tick: i64,
}

impl KeyEvent {
    pub fn press(key: impl Into<String>, tick: i64) -> Self {
        Self {
            key: key.into(),
            pressed: true,
            tick,
        }
    }

    pub fn release(key: impl Into<String>, tick: i64) -> Self {
        Self {
            key: key.into(),
            pressed: false,
            tick,
        }
    }
}

/// Abstraction over input sources.
/// Implementations: ScriptedInput (recorded scripts, autoplay, testing).
pub trait InputProvider {
    /// Events with `tick <= now` not returned by an earlier call, in order.
    fn poll_up_to(&mut self, now: i64) -> Vec<KeyEvent>;

    /// Tick of the next event not yet polled, if one is known in advance.
    fn next_tick(&self) -> Option<i64>;

    /// Check if a key is currently held down.
    fn is_pressed(&self, key: &str) -> bool;

    /// True once no further events will arrive.
    fn is_finished(&self) -> bool;
}
