use std::collections::BTreeSet;

use coverband_chart::LaneColor;
use log::warn;

use crate::event::KeyEvent;
use crate::key_map::KeyMap;
use crate::key_state::KeyState;

/// Maps raw key events to fresh symbol presses.
///
/// Each returned symbol stands for one intended hit attempt and should be
/// passed to the chart exactly once.
#[derive(Debug, Clone)]
pub struct KeyRouter {
    key_map: KeyMap,
    state: KeyState,
    unknown: BTreeSet<String>,
}

impl KeyRouter {
    pub fn new(key_map: KeyMap) -> Self {
        Self {
            key_map,
            state: KeyState::new(),
            unknown: BTreeSet::new(),
        }
    }

    pub fn route(&mut self, event: &KeyEvent) -> Option<LaneColor> {
        let Some(symbol) = self.key_map.symbol(&event.key) else {
            if self.unknown.insert(event.key.clone()) {
                warn!("input: key {:?} is not bound, ignoring it", event.key);
            }
            return None;
        };
        self.state.apply(symbol, event.pressed, event.tick)
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn state(&self) -> &KeyState {
        &self.state
    }

    /// Keys seen that have no binding.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown.iter().map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_presses_once() {
        let mut router = KeyRouter::new(KeyMap::default());
        assert_eq!(
            router.route(&KeyEvent::press("a", 0)),
            Some(LaneColor::Red)
        );
        assert_eq!(router.route(&KeyEvent::press("a", 16)), None);
        assert_eq!(router.route(&KeyEvent::release("a", 32)), None);
        assert_eq!(
            router.route(&KeyEvent::press("A", 48)),
            Some(LaneColor::Red)
        );
    }

    #[test]
    fn unbound_keys_are_collected() {
        let mut router = KeyRouter::new(KeyMap::default());
        assert_eq!(router.route(&KeyEvent::press("q", 0)), None);
        assert_eq!(router.route(&KeyEvent::press("q", 5)), None);
        assert_eq!(router.unknown_keys().collect::<Vec<_>>(), vec!["q"]);
        assert!(router.state().held().is_empty());
    }
}
