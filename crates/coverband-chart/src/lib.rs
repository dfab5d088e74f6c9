//! Scrolling note chart judged against a millisecond clock.
//!
//! A [`Chart`] owns an ordered run of [`Beat`]s, each holding [`Note`]s at
//! fractional positions. The chart advances a beat cursor as its [`Clock`]
//! moves, marks notes missed once they fall too far behind, and resolves
//! presses through an [`Instrument`] policy.

pub mod beat;
pub mod chart;
pub mod chart_def;
pub mod clock;
pub mod instrument;
pub mod judge;
pub mod lane;
pub mod layout;
pub mod note;
pub mod render;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use beat::Beat;
pub use chart::{Chart, NoteId, UpdateOutcome};
pub use chart_def::{BeatDef, ChartDef, NoteDef};
pub use clock::{Clock, ManualClock, PausableClock, SystemClock};
pub use instrument::{Drums, Guitar, Instrument};
pub use judge::{HitReport, JudgeConfig, JudgeStats, TimingDirection};
pub use lane::InstrumentKind;
pub use layout::LayoutConfig;
pub use note::{LaneColor, Note, NoteState, Timed};
pub use render::{CommandRecorder, DrawCommand, Presenter, Renderable};
pub use session::Session;
