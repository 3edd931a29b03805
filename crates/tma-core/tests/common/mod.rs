#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tma_core::{PartDescription, ScoreDescription};
use tma_domain_eval::ExpectedNoteStream;
use tma_domain_notation::MeasureRange;
use tma_ports::pitch::{PitchError, PitchEvent, PitchEventCallback, PitchInputPort, PitchInputStream};
use tma_ports::score::{
    MeasureMarker, PlayerState, PlayerStoppedCallback, ScoreError, ScoreSurfacePort, StaffLines,
    Viewport,
};
use tma_ports::storage::{SettingsDto, StorageError, StoragePort};
use tma_ports::surface::DrawSurface;
use tma_ports::types::{Px, Rect, Rgb, Seconds, TrackIndex};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    ClearRect(Rect),
    FillRect(Rect, Rgb),
    Ellipse { x: Px, y: Px, size: Px, color: Rgb },
    Line { from: (Px, Px), to: (Px, Px), color: Rgb, weight: f32 },
    Text { glyph: String, x: Px, y: Px },
}

#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClearRect(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect(rect, color));
    }

    fn fill_ellipse(&mut self, center_x: Px, center_y: Px, width: Px, _height: Px, color: Rgb) {
        self.ops.push(DrawOp::Ellipse {
            x: center_x,
            y: center_y,
            size: width,
            color,
        });
    }

    fn stroke_line(&mut self, from: (Px, Px), to: (Px, Px), color: Rgb, weight: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color,
            weight,
        });
    }

    fn text(&mut self, glyph: &str, x: Px, y: Px, _color: Rgb) {
        self.ops.push(DrawOp::Text {
            glyph: glyph.to_string(),
            x,
            y,
        });
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopBehaviour {
    Immediate,
    /// Keep the callback until `finish_stop` is called.
    Deferred,
    Unavailable,
}

struct ScoreState {
    time: Seconds,
    player: PlayerState,
    cursor_x: Option<Px>,
    staff_lines: Option<StaffLines>,
    first_bar: Option<Rect>,
    markers: Vec<MeasureMarker>,
    mutes: Vec<(TrackIndex, bool)>,
    solos: Vec<(TrackIndex, bool)>,
    stop: StopBehaviour,
    pending_stop: Option<PlayerStoppedCallback>,
    stop_requests: usize,
}

pub struct ScriptedScore {
    state: Mutex<ScoreState>,
}

impl ScriptedScore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ScoreState {
                time: 0.0,
                player: PlayerState::Playing,
                cursor_x: Some(200.0),
                staff_lines: Some(StaffLines {
                    top_line_y: 99.0,
                    next_line_y: 109.0,
                }),
                first_bar: None,
                markers: Vec::new(),
                mutes: Vec::new(),
                solos: Vec::new(),
                stop: StopBehaviour::Immediate,
                pending_stop: None,
                stop_requests: 0,
            }),
        })
    }

    pub fn set_time(&self, time: Seconds) {
        self.state.lock().time = time;
    }

    pub fn set_player_state(&self, player: PlayerState) {
        self.state.lock().player = player;
    }

    pub fn set_cursor_x(&self, x: Option<Px>) {
        self.state.lock().cursor_x = x;
    }

    pub fn set_staff_lines(&self, lines: Option<StaffLines>) {
        self.state.lock().staff_lines = lines;
    }

    pub fn set_first_bar(&self, rect: Option<Rect>) {
        self.state.lock().first_bar = rect;
    }

    pub fn set_markers(&self, markers: Vec<MeasureMarker>) {
        self.state.lock().markers = markers;
    }

    pub fn set_stop_behaviour(&self, stop: StopBehaviour) {
        self.state.lock().stop = stop;
    }

    pub fn mutes(&self) -> Vec<(TrackIndex, bool)> {
        self.state.lock().mutes.clone()
    }

    pub fn solos(&self) -> Vec<(TrackIndex, bool)> {
        self.state.lock().solos.clone()
    }

    pub fn stop_requests(&self) -> usize {
        self.state.lock().stop_requests
    }

    pub fn finish_stop(&self) {
        let callback = {
            let mut state = self.state.lock();
            state.player = PlayerState::Stopped;
            state.pending_stop.take()
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl ScoreSurfacePort for ScriptedScore {
    fn playback_time(&self) -> Seconds {
        self.state.lock().time
    }

    fn player_state(&self) -> PlayerState {
        self.state.lock().player
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }

    fn cursor_x(&self) -> Option<Px> {
        self.state.lock().cursor_x
    }

    fn staff_lines(&self) -> Option<StaffLines> {
        self.state.lock().staff_lines
    }

    fn first_bar(&self) -> Option<Rect> {
        self.state.lock().first_bar
    }

    fn measure_markers(&self) -> Vec<MeasureMarker> {
        self.state.lock().markers.clone()
    }

    fn set_track_mute(&self, track: TrackIndex, muted: bool) -> Result<(), ScoreError> {
        self.state.lock().mutes.push((track, muted));
        Ok(())
    }

    fn set_track_solo(&self, track: TrackIndex, solo: bool) -> Result<(), ScoreError> {
        self.state.lock().solos.push((track, solo));
        Ok(())
    }

    fn stop(&self, on_stopped: PlayerStoppedCallback) -> Result<(), ScoreError> {
        let mut state = self.state.lock();
        state.stop_requests += 1;
        match state.stop {
            StopBehaviour::Immediate => {
                state.player = PlayerState::Stopped;
                drop(state);
                on_stopped();
                Ok(())
            }
            StopBehaviour::Deferred => {
                state.player = PlayerState::PendingStop;
                state.pending_stop = Some(on_stopped);
                Ok(())
            }
            StopBehaviour::Unavailable => Err(ScoreError::PlayerUnavailable("no player".into())),
        }
    }
}

#[derive(Default)]
struct PitchShared {
    callback: Mutex<Option<PitchEventCallback>>,
    opened: AtomicUsize,
    closed: AtomicBool,
}

/// Detector driven by hand from the test body.
#[derive(Clone, Default)]
pub struct ManualPitch {
    shared: Arc<PitchShared>,
    fail: bool,
}

impl ManualPitch {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn emit(&self, frequency_hz: Option<f32>) {
        let callback = self.shared.callback.lock().clone();
        if let Some(callback) = callback {
            callback(PitchEvent { frequency_hz });
        }
    }

    pub fn emit_many(&self, frequency_hz: Option<f32>, count: usize) {
        for _ in 0..count {
            self.emit(frequency_hz);
        }
    }

    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

struct ManualStream {
    shared: Arc<PitchShared>,
}

impl PitchInputStream for ManualStream {
    fn close(self: Box<Self>) {
        self.shared.callback.lock().take();
        self.shared.closed.store(true, Ordering::SeqCst);
    }
}

impl PitchInputPort for ManualPitch {
    fn open_input(&self, cb: PitchEventCallback) -> Result<Box<dyn PitchInputStream>, PitchError> {
        if self.fail {
            return Err(PitchError::MicrophoneUnavailable("denied".into()));
        }
        *self.shared.callback.lock() = Some(cb);
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ManualStream {
            shared: self.shared.clone(),
        }))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub saved: Arc<Mutex<Vec<SettingsDto>>>,
    pub initial: Option<SettingsDto>,
}

impl StoragePort for MemoryStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        self.initial
            .clone()
            .ok_or_else(|| StorageError::Io("no settings file".into()))
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        self.saved.lock().push(s.clone());
        Ok(())
    }
}

pub fn part(name: &str, clef: &str, expectation: &[f64]) -> PartDescription {
    PartDescription {
        name: name.to_string(),
        clefs: vec![clef.to_string()],
        expectation: ExpectedNoteStream::from_flat(expectation).unwrap(),
        lower_upper: None,
    }
}

pub fn score(parts: Vec<PartDescription>, measure_lengths: Vec<Seconds>) -> ScoreDescription {
    let end = measure_lengths.len().max(1) as u32;
    ScoreDescription {
        parts,
        measure_lengths,
        measures: MeasureRange { start: 1, end },
    }
}

/// Frequency of a MIDI note in equal temperament.
pub fn hz(midi: i32) -> f32 {
    (440.0 * 2f64.powf((f64::from(midi) - 69.0) / 12.0)) as f32
}
