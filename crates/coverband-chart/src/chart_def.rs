use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::beat::Beat;
use crate::lane::InstrumentKind;
use crate::note::{LaneColor, Note};

/// One note of a chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDef {
    pub color: LaneColor,
    #[serde(default)]
    pub position: f64,
    /// Milliseconds.
    #[serde(default)]
    pub sustain: i64,
}

impl NoteDef {
    pub fn build(&self) -> Note {
        Note::with_sustain(self.color, self.position, self.sustain)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatDef {
    pub bpm: u32,
    #[serde(default)]
    pub notes: Vec<NoteDef>,
}

impl BeatDef {
    pub fn build(&self) -> Result<Beat> {
        Beat::new(self.bpm, self.notes.iter().map(NoteDef::build).collect())
    }
}

/// Chart description: instrument family plus per-beat tempo and notes.
/// The beat list is played `repeat` times in a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ChartDef {
    pub instrument: InstrumentKind,
    pub repeat: usize,
    pub beats: Vec<BeatDef>,
}

impl Default for ChartDef {
    fn default() -> Self {
        Self {
            instrument: InstrumentKind::Drums,
            repeat: 1,
            beats: Vec::new(),
        }
    }
}

impl ChartDef {
    /// Built-in drum chart: red, green and the kick on every 120 BPM beat.
    pub fn demo() -> Self {
        Self {
            instrument: InstrumentKind::Drums,
            repeat: 8,
            beats: vec![BeatDef {
                bpm: 120,
                notes: vec![
                    NoteDef {
                        color: LaneColor::Red,
                        position: 0.25,
                        sustain: 0,
                    },
                    NoteDef {
                        color: LaneColor::Green,
                        position: 0.5,
                        sustain: 0,
                    },
                    NoteDef {
                        color: LaneColor::Orange,
                        position: 0.75,
                        sustain: 0,
                    },
                ],
            }],
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading chart {}", path.display()))?;
        let def: ChartDef = serde_json::from_str(&data)
            .with_context(|| format!("parsing chart {}", path.display()))?;
        Ok(def)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing chart {}", path.display()))?;
        Ok(())
    }

    /// Fresh, unplaced beats in play order.
    pub fn build_beats(&self) -> Result<Vec<Beat>> {
        ensure!(self.repeat > 0, "chart repeat count must be at least 1");
        ensure!(!self.beats.is_empty(), "chart description has no beats");

        let mut beats = Vec::with_capacity(self.beats.len() * self.repeat);
        for _ in 0..self.repeat {
            for (index, def) in self.beats.iter().enumerate() {
                beats.push(def.build().with_context(|| format!("beat {index}"))?);
            }
        }
        Ok(beats)
    }

    pub fn note_count(&self) -> usize {
        self.repeat * self.beats.iter().map(|b| b.notes.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_matches_the_reference_drum_beat() {
        let def = ChartDef::demo();
        let beats = def.build_beats().unwrap();
        assert_eq!(beats.len(), 8);
        assert_eq!(def.note_count(), 24);
        for beat in &beats {
            assert_eq!(beat.duration_ticks(), 500);
            let colors: Vec<_> = beat.notes().iter().map(Note::lane_color).collect();
            assert_eq!(
                colors,
                vec![LaneColor::Red, LaneColor::Green, LaneColor::Orange]
            );
        }
    }

    #[test]
    fn parses_minimal_json() {
        let json = r#"{
            "instrument": "guitar",
            "beats": [
                { "bpm": 90, "notes": [{ "color": "yellow", "position": 0.5, "sustain": 300 }] },
                { "bpm": 180 }
            ]
        }"#;
        let def: ChartDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.instrument, InstrumentKind::Guitar);
        assert_eq!(def.repeat, 1);

        let beats = def.build_beats().unwrap();
        assert_eq!(beats.len(), 2);
        assert_eq!(beats[0].notes()[0].sustain_duration(), 300);
        assert!(beats[1].notes().is_empty());
    }

    #[test]
    fn zero_bpm_is_reported_with_beat_index() {
        let def = ChartDef {
            beats: vec![
                BeatDef {
                    bpm: 100,
                    notes: Vec::new(),
                },
                BeatDef {
                    bpm: 0,
                    notes: Vec::new(),
                },
            ],
            ..Default::default()
        };
        let err = def.build_beats().unwrap_err();
        assert!(format!("{err:#}").contains("beat 1"));
    }

    #[test]
    fn empty_description_is_rejected() {
        assert!(ChartDef::default().build_beats().is_err());
        let def = ChartDef {
            repeat: 0,
            ..ChartDef::demo()
        };
        assert!(def.build_beats().is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let def = ChartDef::demo();
        def.write(&path).unwrap();
        assert_eq!(ChartDef::read(&path).unwrap(), def);
    }

    #[test]
    fn unknown_color_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"beats":[{"bpm":120,"notes":[{"color":"purple"}]}]}"#)
            .unwrap();
        assert!(ChartDef::read(&path).is_err());
    }
}
