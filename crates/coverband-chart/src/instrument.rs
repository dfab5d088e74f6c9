use crate::lane::InstrumentKind;
use crate::note::{LaneColor, Note};

/// Hit policy consulted by a chart. Pure: no state beyond a static symbol table.
pub trait Instrument {
    fn kind(&self) -> InstrumentKind;

    /// Whether pressing `pressed` together hits `note`. Defaults to a lane
    /// lookup in `kind()`'s table.
    fn can_hit(&self, note: &Note, pressed: &[LaneColor]) -> bool {
        lane_matches(self.kind(), note, pressed)
    }

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// True if any pressed symbol maps to the note's lane in `kind`'s table.
fn lane_matches(kind: InstrumentKind, note: &Note, pressed: &[LaneColor]) -> bool {
    let Some(target) = kind.lane_index(note.lane_color()) else {
        return false;
    };
    pressed
        .iter()
        .filter_map(|&symbol| kind.lane_index(symbol))
        .any(|lane| lane == target)
}

/// Four pads plus the kick pedal, which covers the whole chart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Drums;

impl Instrument for Drums {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Drums
    }
}

/// Five frets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Guitar;

impl Instrument for Guitar {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Guitar
    }
}

impl InstrumentKind {
    /// Policy object for this family.
    pub fn instrument(self) -> Box<dyn Instrument> {
        match self {
            InstrumentKind::Drums => Box::new(Drums),
            InstrumentKind::Guitar => Box::new(Guitar),
        }
    }
}
