//! Vertical placement of the live note on the staff of the selected part.

use crate::clef::Clef;
use crate::ledger::{ledger_line_count, LedgerDirection, LedgerStart, LEDGER_CYCLE};
use crate::note::Note;
use serde::{Deserialize, Serialize};
use tma_ports::types::{MidiValue, Px};

/// Diatonic step above C for each chromatic step; sharps share the line below.
const DIATONIC_STEP: [i32; 12] = [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6];

/// Staff-line rects report their top edge; the stroke is drawn one pixel lower.
const LINE_STROKE_OFFSET: Px = 1.0;

/// Inclusive pitch limits beyond which ledger lines are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerThresholds {
    pub lower: MidiValue,
    pub upper: MidiValue,
}

impl LedgerThresholds {
    /// C#4 and A5.
    pub const TREBLE: LedgerThresholds = LedgerThresholds { lower: 61, upper: 81 };
    /// E2 and C4.
    pub const BASS: LedgerThresholds = LedgerThresholds { lower: 40, upper: 60 };

    pub fn for_base_octave(base_octave: i32) -> Self {
        if Clef::is_treble_like(base_octave) {
            Self::TREBLE
        } else {
            Self::BASS
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffLayout {
    pub top_line_y: Px,
    pub line_spacing: Px,
    pub base_octave: i32,
    /// Line the base octave's C sits on.
    pub first_line_y: Px,
}

impl StaffLayout {
    pub fn new(top_line_y: Px, line_spacing: Px, base_octave: i32) -> Self {
        let top_line_y = top_line_y + LINE_STROKE_OFFSET;
        // Bass-like clefs sit one line lower relative to their top line.
        let lines_to_first = if Clef::is_treble_like(base_octave) { 5.0 } else { 6.0 };
        Self {
            top_line_y,
            line_spacing,
            base_octave,
            first_line_y: top_line_y + line_spacing * lines_to_first,
        }
    }

    pub fn thresholds(&self) -> LedgerThresholds {
        LedgerThresholds::for_base_octave(self.base_octave)
    }
}

impl Default for StaffLayout {
    fn default() -> Self {
        Self::new(0.0, 0.0, Clef::Treble.base_octave())
    }
}

/// Snapshot handed to the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawState {
    pub note: Note,
    pub layout: StaffLayout,
    pub note_height_px: Px,
    /// Positive: lines above the staff, negative: below, zero: none.
    pub ledger_lines: i32,
}

#[derive(Clone, Debug)]
pub struct StaffGeometry {
    state: DrawState,
}

impl StaffGeometry {
    pub fn new(top_line_y: Px, line_spacing: Px, base_octave: i32) -> Self {
        let mut geometry = Self {
            state: DrawState {
                note: Note::SILENT,
                layout: StaffLayout::new(top_line_y, line_spacing, base_octave),
                note_height_px: 0.0,
                ledger_lines: 0,
            },
        };
        geometry.recompute();
        geometry
    }

    pub fn set_layout(&mut self, top_line_y: Px, line_spacing: Px, base_octave: i32) {
        self.state.layout = StaffLayout::new(top_line_y, line_spacing, base_octave);
        self.recompute();
    }

    pub fn set_base_octave(&mut self, base_octave: i32) {
        let layout = self.state.layout;
        self.set_layout(
            layout.top_line_y - LINE_STROKE_OFFSET,
            layout.line_spacing,
            base_octave,
        );
    }

    /// Returns whether the note changed.
    pub fn update_note(&mut self, midi: MidiValue) -> bool {
        if !self.state.note.update(midi) {
            return false;
        }
        self.recompute();
        true
    }

    pub fn note(&self) -> Note {
        self.state.note
    }

    pub fn layout(&self) -> StaffLayout {
        self.state.layout
    }

    pub fn note_height_px(&self) -> Px {
        self.state.note_height_px
    }

    pub fn ledger_lines(&self) -> i32 {
        self.state.ledger_lines
    }

    pub fn draw_state(&self) -> DrawState {
        self.state
    }

    fn recompute(&mut self) {
        let layout = self.state.layout;
        let note = self.state.note;
        self.state.note_height_px = note_height(&note, &layout);
        self.state.ledger_lines = signed_ledger_lines(&note, &layout);
    }
}

impl Default for StaffGeometry {
    fn default() -> Self {
        Self::new(0.0, 0.0, Clef::Treble.base_octave())
    }
}

pub fn note_height(note: &Note, layout: &StaffLayout) -> Px {
    let Some(octave) = note.octave() else {
        return layout.first_line_y;
    };
    let step = DIATONIC_STEP[note.midi().rem_euclid(12) as usize];
    let total_steps = step + (octave - layout.base_octave) * 7;
    // Each diatonic step is half a line spacing.
    layout.first_line_y - (total_steps as Px * layout.line_spacing) / 2.0
}

pub fn signed_ledger_lines(note: &Note, layout: &StaffLayout) -> i32 {
    if note.is_silent() {
        return 0;
    }
    let midi = note.midi();
    let thresholds = layout.thresholds();
    let treble_like = Clef::is_treble_like(layout.base_octave);

    let (direction, start, distance) = if midi >= thresholds.upper {
        let start = if treble_like { LedgerStart::A } else { LedgerStart::C };
        (LedgerDirection::Up, start, midi - thresholds.upper)
    } else if midi <= thresholds.lower {
        let start = if treble_like { LedgerStart::C } else { LedgerStart::E };
        (LedgerDirection::Down, start, thresholds.lower - midi)
    } else {
        return 0;
    };

    let wraps = distance.abs() / LEDGER_CYCLE;
    let count = ledger_line_count(midi, direction, start) as i32 + 7 * wraps;
    match direction {
        LedgerDirection::Up => count,
        LedgerDirection::Down => -count,
    }
}
