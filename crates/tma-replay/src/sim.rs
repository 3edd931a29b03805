//! In-process stand-ins for the score renderer, the detector and the overlay.

use crate::script::{CursorPath, Detection};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tma_ports::pitch::{PitchError, PitchEvent, PitchEventCallback, PitchInputPort, PitchInputStream};
use tma_ports::score::{
    MeasureMarker, PlayerState, PlayerStoppedCallback, ScoreError, ScoreSurfacePort, StaffLines,
    Viewport,
};
use tma_ports::surface::DrawSurface;
use tma_ports::types::{Px, Rect, Rgb, Seconds, TrackIndex};

struct PlayerClock {
    time: Seconds,
    state: PlayerState,
}

/// A player that is always playing at whatever time the replay sets.
pub struct SimulatedScore {
    clock: Mutex<PlayerClock>,
    staff: StaffLines,
    viewport: Viewport,
    cursor: CursorPath,
}

impl SimulatedScore {
    pub fn new(staff: StaffLines, viewport: Viewport, cursor: CursorPath) -> Self {
        Self {
            clock: Mutex::new(PlayerClock {
                time: 0.0,
                state: PlayerState::Playing,
            }),
            staff,
            viewport,
            cursor,
        }
    }

    pub fn set_time(&self, time: Seconds) {
        self.clock.lock().time = time;
    }
}

impl ScoreSurfacePort for SimulatedScore {
    fn playback_time(&self) -> Seconds {
        self.clock.lock().time
    }

    fn player_state(&self) -> PlayerState {
        self.clock.lock().state
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn cursor_x(&self) -> Option<Px> {
        let x = self.cursor.x_at(self.playback_time());
        (x <= self.viewport.width).then_some(x)
    }

    fn staff_lines(&self) -> Option<StaffLines> {
        Some(self.staff)
    }

    fn first_bar(&self) -> Option<Rect> {
        None
    }

    fn measure_markers(&self) -> Vec<MeasureMarker> {
        Vec::new()
    }

    fn set_track_mute(&self, track: TrackIndex, muted: bool) -> Result<(), ScoreError> {
        tracing::debug!(%track, muted, "mute");
        Ok(())
    }

    fn set_track_solo(&self, track: TrackIndex, solo: bool) -> Result<(), ScoreError> {
        tracing::debug!(%track, solo, "solo");
        Ok(())
    }

    fn stop(&self, on_stopped: PlayerStoppedCallback) -> Result<(), ScoreError> {
        self.clock.lock().state = PlayerState::Stopped;
        on_stopped();
        Ok(())
    }
}

/// Feeds scripted readings to whoever opened the input.
#[derive(Clone, Default)]
pub struct ScriptedDetector {
    callback: Arc<Mutex<Option<PitchEventCallback>>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&self, detection: &Detection) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(PitchEvent {
                frequency_hz: detection.hz,
            });
        }
    }
}

struct DetectorStream {
    callback: Arc<Mutex<Option<PitchEventCallback>>>,
}

impl PitchInputStream for DetectorStream {
    fn close(self: Box<Self>) {
        self.callback.lock().take();
    }
}

impl PitchInputPort for ScriptedDetector {
    fn open_input(&self, cb: PitchEventCallback) -> Result<Box<dyn PitchInputStream>, PitchError> {
        *self.callback.lock() = Some(cb);
        Ok(Box::new(DetectorStream {
            callback: self.callback.clone(),
        }))
    }
}

/// Counts overlay calls instead of painting them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DrawTally {
    pub clears: u32,
    pub note_heads: u32,
    pub sharps: u32,
    pub ledger_lines: u32,
    pub trail_segments: u32,
    pub highlights: u32,
}

impl DrawSurface for DrawTally {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn clear_rect(&mut self, _rect: Rect) {}

    fn fill_rect(&mut self, _rect: Rect, _color: Rgb) {
        self.highlights += 1;
    }

    fn fill_ellipse(&mut self, _cx: Px, _cy: Px, _w: Px, _h: Px, _color: Rgb) {
        self.note_heads += 1;
    }

    fn stroke_line(&mut self, _from: (Px, Px), _to: (Px, Px), color: Rgb, _weight: f32) {
        if color == Rgb::BLACK {
            self.ledger_lines += 1;
        } else {
            self.trail_segments += 1;
        }
    }

    fn text(&mut self, _glyph: &str, _x: Px, _y: Px, _color: Rgb) {
        self.sharps += 1;
    }
}
