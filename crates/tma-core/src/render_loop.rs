use crate::highlight::MeasureHighlighter;
use serde::{Deserialize, Serialize};
use tma_domain_eval::Accuracy;
use tma_domain_notation::DrawState;
use tma_ports::score::ScoreSurfacePort;
use tma_ports::surface::DrawSurface;
use tma_ports::types::{MidiValue, Px, Rect, Rgb};

/// Everything above this y belongs to the score header and is never wiped.
pub const CLEAR_TOP_MARGIN: Px = 30.0;
/// Sharp glyph distance left of the note head.
pub const SHARP_OFFSET_X: Px = 14.0;
pub const SHARP_OFFSET_Y: Px = 3.5;
/// Half width of a ledger line, also the gap between the sharp and the trail anchor.
pub const LEDGER_HALF_WIDTH: Px = 7.0;
pub const TRAIL_WEIGHT: f32 = 3.0;
pub const LEDGER_WEIGHT: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameMode {
    #[default]
    NoteFeedback,
    MeasureHighlight,
}

/// Per-frame inputs gathered by the session.
pub struct FrameContext<'a> {
    pub score: &'a dyn ScoreSurfacePort,
    pub draw: DrawState,
    pub expected: MidiValue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub mode: FrameMode,
    /// Classification of the trail segment drawn this frame.
    pub accuracy: Option<Accuracy>,
    pub sections_completed: usize,
}

/// The overlay's frame procedure: live note feedback or measure highlighting,
/// never both. Switching modes wipes the overlay and all drawing bookkeeping.
#[derive(Debug)]
pub struct RenderLoop {
    mode: FrameMode,
    requested: FrameMode,
    note_head_px: Px,
    /// Trail anchor and note height of the last frame.
    previous: Option<(Px, Px)>,
    /// Same, one frame earlier.
    before_previous: Option<(Px, Px)>,
    /// Detected and expected pitch seen by the last frame.
    last_pair: Option<(MidiValue, MidiValue)>,
    clear_requested: bool,
    attached: bool,
    highlighter: MeasureHighlighter,
}

impl RenderLoop {
    pub fn new(note_head_px: Px) -> Self {
        Self {
            mode: FrameMode::NoteFeedback,
            requested: FrameMode::NoteFeedback,
            note_head_px,
            previous: None,
            before_previous: None,
            last_pair: None,
            clear_requested: false,
            attached: true,
            highlighter: MeasureHighlighter::new(),
        }
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    pub fn requested_mode(&self) -> FrameMode {
        self.requested
    }

    /// Takes effect on the next frame.
    pub fn request_mode(&mut self, mode: FrameMode) {
        self.requested = mode;
    }

    pub fn set_note_head_px(&mut self, px: Px) {
        self.note_head_px = px;
    }

    pub fn highlighter(&self) -> &MeasureHighlighter {
        &self.highlighter
    }

    /// Forget the trail and wipe the overlay on the next frame (page turns,
    /// practice restarts).
    pub fn reset_positions(&mut self) {
        self.previous = None;
        self.before_previous = None;
        self.last_pair = None;
        self.clear_requested = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Drop all ties to the surface. Later frames draw nothing.
    pub fn detach(&mut self) {
        self.attached = false;
        self.mode = FrameMode::NoteFeedback;
        self.requested = FrameMode::NoteFeedback;
        self.highlighter.reset();
        self.previous = None;
        self.before_previous = None;
        self.last_pair = None;
        self.clear_requested = false;
    }

    pub fn frame(&mut self, surface: &mut dyn DrawSurface, ctx: &FrameContext<'_>) -> FrameReport {
        let mut report = FrameReport {
            mode: self.mode,
            ..FrameReport::default()
        };
        if !self.attached {
            return report;
        }

        if self.requested != self.mode {
            self.transition(surface);
            report.mode = self.mode;
            if self.mode == FrameMode::NoteFeedback {
                return report;
            }
        }
        if self.clear_requested {
            surface.clear();
            self.clear_requested = false;
        }

        match self.mode {
            FrameMode::MeasureHighlight => {
                report.sections_completed = self.highlighter.draw(
                    surface,
                    ctx.score.first_bar(),
                    &ctx.score.measure_markers(),
                    ctx.draw.layout.line_spacing,
                );
            }
            FrameMode::NoteFeedback => {
                report.accuracy = self.draw_feedback(surface, ctx);
            }
        }
        report
    }

    fn transition(&mut self, surface: &mut dyn DrawSurface) {
        tracing::debug!(from = ?self.mode, to = ?self.requested, "frame mode transition");
        surface.clear();
        self.highlighter.reset();
        self.previous = None;
        self.before_previous = None;
        self.last_pair = None;
        self.clear_requested = false;
        self.mode = self.requested;
    }

    fn draw_feedback(&mut self, surface: &mut dyn DrawSurface, ctx: &FrameContext<'_>) -> Option<Accuracy> {
        let draw = &ctx.draw;
        let mut accuracy = None;

        if let Some(previous) = self.previous {
            let viewport = ctx.score.viewport();
            surface.clear_rect(Rect {
                x: previous.0,
                y: CLEAR_TOP_MARGIN,
                width: viewport.width - previous.0,
                height: viewport.height - CLEAR_TOP_MARGIN,
            });
            if !draw.note.is_silent() {
                if let (Some(before), Some((detected, expected))) =
                    (self.before_previous, self.last_pair)
                {
                    let judged = Accuracy::classify(detected, expected);
                    surface.stroke_line(previous, before, judged.color(), TRAIL_WEIGHT);
                    accuracy = Some(judged);
                }
            }
            self.before_previous = Some(previous);
        }

        self.last_pair = Some((draw.note.midi(), ctx.expected));

        let Some(x) = ctx.score.cursor_x() else {
            return accuracy;
        };
        let height = draw.note_height_px;
        let sharp_x = x - SHARP_OFFSET_X;
        self.previous = Some((sharp_x - LEDGER_HALF_WIDTH, height));

        if draw.note.is_silent() {
            return accuracy;
        }
        surface.fill_ellipse(x, height, self.note_head_px, self.note_head_px, Rgb::MAGENTA);
        if draw.note.is_sharp() {
            surface.text("#", sharp_x, height + SHARP_OFFSET_Y, Rgb::BLACK);
        }
        self.draw_ledger_lines(surface, draw, x);
        accuracy
    }

    fn draw_ledger_lines(&self, surface: &mut dyn DrawSurface, draw: &DrawState, x: Px) {
        if draw.ledger_lines == 0 {
            return;
        }
        let layout = draw.layout;
        let above = draw.ledger_lines > 0;
        let (mut y, step) = if above {
            (layout.top_line_y, -layout.line_spacing)
        } else {
            (layout.first_line_y - layout.line_spacing, layout.line_spacing)
        };
        for _ in 0..draw.ledger_lines.unsigned_abs() {
            y += step;
            surface.stroke_line(
                (x - LEDGER_HALF_WIDTH, y),
                (x + LEDGER_HALF_WIDTH, y),
                Rgb::BLACK,
                LEDGER_WEIGHT,
            );
        }
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(10.0)
    }
}
