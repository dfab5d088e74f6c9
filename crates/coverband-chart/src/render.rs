//! Presentation interface. Beats and notes turn themselves into draw commands
//! for a [`Presenter`]; nothing here mutates chart state.

use anyhow::Result;

use crate::beat::Beat;
use crate::chart::{Chart, NoteId};
use crate::clock::Clock;
use crate::lane::InstrumentKind;
use crate::layout::LayoutConfig;
use crate::note::{LaneColor, Note};

/// One primitive handed to a presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame {
        tick: i64,
        scroll: f32,
    },
    JudgeLine {
        width: f32,
    },
    Beat {
        index: usize,
        y: f32,
        width: f32,
        height: f32,
        lanes: usize,
    },
    Note {
        id: NoteId,
        color: LaneColor,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        sustain: f32,
        missed: bool,
    },
    EndFrame,
}

/// Abstraction over presentation back-ends.
/// Implementations: CommandRecorder (testing and headless runs).
pub trait Presenter {
    fn draw(&mut self, command: DrawCommand) -> Result<()>;
}

/// Where a renderable sits in the current frame.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub beat: usize,
    pub index: usize,
    /// Bottom of the owning beat, scroll already applied.
    pub y: f32,
    pub beat_height: f32,
}

/// Drawing state shared by everything rendered in one frame.
pub struct Frame<'a> {
    pub layout: &'a LayoutConfig,
    pub kind: InstrumentKind,
    presenter: &'a mut dyn Presenter,
    commands: usize,
}

impl<'a> Frame<'a> {
    pub fn new(
        layout: &'a LayoutConfig,
        kind: InstrumentKind,
        presenter: &'a mut dyn Presenter,
    ) -> Self {
        Self {
            layout,
            kind,
            presenter,
            commands: 0,
        }
    }

    pub fn emit(&mut self, command: DrawCommand) -> Result<()> {
        self.commands += 1;
        self.presenter.draw(command)
    }

    pub fn commands(&self) -> usize {
        self.commands
    }
}

/// Something that can put itself on screen.
pub trait Renderable {
    fn render(&self, frame: &mut Frame<'_>, slot: Slot) -> Result<()>;
}

impl Renderable for Note {
    fn render(&self, frame: &mut Frame<'_>, slot: Slot) -> Result<()> {
        // Hit notes disappear.
        if self.is_hit() {
            return Ok(());
        }
        let rect = frame.layout.note_rect(frame.kind, self, slot.beat_height);
        let sustain = frame.layout.sustain_length(self);
        frame.emit(DrawCommand::Note {
            id: NoteId {
                beat: slot.beat,
                index: slot.index,
            },
            color: self.lane_color(),
            x: rect.x,
            y: slot.y + rect.y,
            width: rect.width,
            height: rect.height,
            sustain,
            missed: self.is_missed(),
        })
    }
}

impl Renderable for Beat {
    fn render(&self, frame: &mut Frame<'_>, slot: Slot) -> Result<()> {
        frame.emit(DrawCommand::Beat {
            index: slot.beat,
            y: slot.y,
            width: frame.layout.chart_width,
            height: slot.beat_height,
            lanes: frame.kind.lane_count(),
        })?;
        for (index, note) in self.notes().iter().enumerate() {
            note.render(frame, Slot { index, ..slot })?;
        }
        Ok(())
    }
}

/// Scroll distance at `tick`: how far the chart has moved past the judge line.
pub fn scroll_offset<C: Clock>(chart: &Chart<C>, layout: &LayoutConfig, tick: i64) -> f32 {
    layout.ms_to_units(tick - chart.start_tick())
}

/// Draw the whole chart as seen at `tick`. Returns the number of commands emitted.
pub fn draw_chart<C: Clock>(
    chart: &Chart<C>,
    tick: i64,
    layout: &LayoutConfig,
    presenter: &mut dyn Presenter,
) -> Result<usize> {
    let scroll = scroll_offset(chart, layout, tick);
    let mut frame = Frame::new(layout, chart.instrument().kind(), presenter);

    frame.emit(DrawCommand::BeginFrame { tick, scroll })?;
    frame.emit(DrawCommand::JudgeLine {
        width: layout.chart_width,
    })?;

    let mut y_offset = 0.0;
    for (index, beat) in chart.beats().iter().enumerate() {
        let beat_height = layout.beat_height(beat);
        beat.render(
            &mut frame,
            Slot {
                beat: index,
                index: 0,
                y: y_offset - scroll,
                beat_height,
            },
        )?;
        y_offset += beat_height;
    }

    frame.emit(DrawCommand::EndFrame)?;
    Ok(frame.commands())
}

/// A presenter that records draw commands. Needs no display.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded commands.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Clear recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Frames completed so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Recorded note commands, in draw order.
    pub fn notes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Note { .. }))
    }
}

impl Presenter for CommandRecorder {
    fn draw(&mut self, command: DrawCommand) -> Result<()> {
        if command == DrawCommand::EndFrame {
            self.frames += 1;
        }
        self.commands.push(command);
        Ok(())
    }
}
