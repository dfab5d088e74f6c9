use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use coverband_chart::{InstrumentKind, LaneColor};
use log::warn;
use serde::{Deserialize, Serialize};

/// Named keys accepted besides single letters and digits.
pub const NAMED_KEYS: &[&str] = &[
    "space", "enter", "tab", "left", "right", "up", "down", "lshift", "rshift", "lctrl", "rctrl",
];

/// Whether `name` is a key a keyboard can produce.
pub fn is_known_key(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_alphanumeric(),
        _ => NAMED_KEYS.contains(&name),
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Key name to lane colour bindings for one instrument family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMap {
    #[serde(default)]
    pub instrument: InstrumentKind,
    /// Empty means the instrument's defaults.
    #[serde(default)]
    pub bindings: BTreeMap<String, LaneColor>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::defaults(InstrumentKind::Drums)
    }
}

impl KeyMap {
    pub fn defaults(instrument: InstrumentKind) -> Self {
        let table: &[(&str, LaneColor)] = match instrument {
            InstrumentKind::Drums => &[
                ("a", LaneColor::Red),
                ("s", LaneColor::Yellow),
                ("d", LaneColor::Blue),
                ("f", LaneColor::Green),
                ("space", LaneColor::Orange),
            ],
            InstrumentKind::Guitar => &[
                ("1", LaneColor::Green),
                ("2", LaneColor::Red),
                ("3", LaneColor::Yellow),
                ("4", LaneColor::Blue),
                ("5", LaneColor::Orange),
            ],
        };
        Self {
            instrument,
            bindings: table
                .iter()
                .map(|&(key, color)| (key.to_string(), color))
                .collect(),
        }
    }

    /// Normalize key names and drop the ones no keyboard produces.
    /// An empty map falls back to the instrument's defaults.
    pub fn validate(&mut self) {
        if self.bindings.is_empty() {
            self.bindings = Self::defaults(self.instrument).bindings;
            return;
        }
        let bindings = std::mem::take(&mut self.bindings);
        for (key, color) in bindings {
            let name = normalize(&key);
            if is_known_key(&name) {
                self.bindings.insert(name, color);
            } else {
                warn!("key map: ignoring unknown key {key:?} (bound to {color})");
            }
        }
    }

    /// Lane colour bound to `key`, if any.
    pub fn symbol(&self, key: &str) -> Option<LaneColor> {
        self.bindings.get(&normalize(key)).copied()
    }

    /// First key, by name, bound to `color`.
    pub fn key_for(&self, color: LaneColor) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, c)| **c == color)
            .map(|(key, _)| key.as_str())
    }

    pub fn bind(&mut self, key: &str, color: LaneColor) {
        self.bindings.insert(normalize(key), color);
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading key map {}", path.display()))?;
        let mut map: KeyMap = serde_json::from_str(&data)
            .with_context(|| format!("parsing key map {}", path.display()))?;
        map.validate();
        Ok(map)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing key map {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drum_defaults() {
        let map = KeyMap::defaults(InstrumentKind::Drums);
        assert_eq!(map.symbol("a"), Some(LaneColor::Red));
        assert_eq!(map.symbol("S"), Some(LaneColor::Yellow));
        assert_eq!(map.symbol("space"), Some(LaneColor::Orange));
        assert_eq!(map.symbol("g"), None);
        assert_eq!(map.key_for(LaneColor::Green), Some("f"));
    }

    #[test]
    fn guitar_defaults() {
        let map = KeyMap::defaults(InstrumentKind::Guitar);
        let colors: Vec<_> = ["1", "2", "3", "4", "5"]
            .iter()
            .map(|k| map.symbol(k).unwrap())
            .collect();
        assert_eq!(
            colors,
            vec![
                LaneColor::Green,
                LaneColor::Red,
                LaneColor::Yellow,
                LaneColor::Blue,
                LaneColor::Orange
            ]
        );
    }

    #[test]
    fn known_keys() {
        assert!(is_known_key("a"));
        assert!(is_known_key("7"));
        assert!(is_known_key("space"));
        assert!(!is_known_key(""));
        assert!(!is_known_key("hyperdrive"));
        assert!(!is_known_key("!"));
    }

    #[test]
    fn validate_normalizes_and_drops_unknown() {
        let mut map = KeyMap {
            instrument: InstrumentKind::Drums,
            bindings: BTreeMap::new(),
        };
        map.bindings.insert(" J ".to_string(), LaneColor::Red);
        map.bindings.insert("warp".to_string(), LaneColor::Blue);
        map.validate();
        assert_eq!(map.bindings.len(), 1);
        assert_eq!(map.symbol("j"), Some(LaneColor::Red));
    }

    #[test]
    fn rebinding_overrides() {
        let mut map = KeyMap::default();
        map.bind("A", LaneColor::Blue);
        assert_eq!(map.symbol("a"), Some(LaneColor::Blue));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let map = KeyMap::defaults(InstrumentKind::Guitar);
        map.write(&path).unwrap();
        assert_eq!(KeyMap::read(&path).unwrap(), map);
    }

    #[test]
    fn missing_bindings_use_instrument_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, r#"{"instrument":"guitar"}"#).unwrap();
        let map = KeyMap::read(&path).unwrap();
        assert_eq!(map.instrument, InstrumentKind::Guitar);
        assert_eq!(map.symbol("1"), Some(LaneColor::Green));
        assert_eq!(map.symbol("a"), None);
    }
}
