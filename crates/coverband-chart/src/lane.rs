use serde::{Deserialize, Serialize};

use crate::note::LaneColor;

/// Lane index reserved for notes that span the whole chart (the drum kick).
pub const WHOLE_CHART_LANE: usize = 0;

/// Instrument family. Decides lane count and the colour→lane table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    #[default]
    Drums,
    Guitar,
}

const DRUMS_LANES: [(LaneColor, usize); 5] = [
    (LaneColor::Red, 1),
    (LaneColor::Yellow, 2),
    (LaneColor::Blue, 3),
    (LaneColor::Green, 4),
    (LaneColor::Orange, WHOLE_CHART_LANE),
];

const GUITAR_LANES: [(LaneColor, usize); 5] = [
    (LaneColor::Green, 1),
    (LaneColor::Red, 2),
    (LaneColor::Yellow, 3),
    (LaneColor::Blue, 4),
    (LaneColor::Orange, 5),
];

impl InstrumentKind {
    /// Number of drawn lanes, not counting the whole-chart lane.
    pub fn lane_count(self) -> usize {
        match self {
            InstrumentKind::Drums => 4,
            InstrumentKind::Guitar => 5,
        }
    }

    /// Colour→lane table for this family.
    pub fn lane_table(self) -> &'static [(LaneColor, usize)] {
        match self {
            InstrumentKind::Drums => &DRUMS_LANES,
            InstrumentKind::Guitar => &GUITAR_LANES,
        }
    }

    /// Lane for `color`: `WHOLE_CHART_LANE` or 1..=lane_count. `None` if the
    /// family has no lane for that colour.
    pub fn lane_index(self, color: LaneColor) -> Option<usize> {
        self.lane_table()
            .iter()
            .find(|(c, _)| *c == color)
            .map(|(_, lane)| *lane)
    }

    pub fn name(self) -> &'static str {
        match self {
            InstrumentKind::Drums => "drums",
            InstrumentKind::Guitar => "guitar",
        }
    }
}
