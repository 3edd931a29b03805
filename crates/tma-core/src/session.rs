use crate::ipc::{Command, Event, ScoreDescription, SessionState};
use crate::page_watch::PageWatcher;
use crate::render_loop::{FrameContext, FrameMode, FrameReport, RenderLoop};
use crate::teardown::{ReleaseSignal, Resource, TeardownHandle, TeardownWarning};
use parking_lot::Mutex;
use rtrb::{Consumer, RingBuffer};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tma_domain_eval::{
    AccuracyStats, ExpectedNoteStream, PerformanceRecorder, PitchSample, PitchSmoother, StreamError,
};
use tma_domain_notation::{
    detection_to_midi, section_lengths, time_to_measure, DrawState, StaffGeometry, TrackSelection,
};
use tma_ports::pitch::{PitchError, PitchEvent, PitchInputPort, PitchInputStream};
use tma_ports::score::{PlayerState, ScoreError, ScoreSurfacePort, StaffLines};
use tma_ports::storage::{SettingsDto, StorageError, StoragePort};
use tma_ports::surface::DrawSurface;
use tma_ports::types::{Seconds, TrackIndex, SILENCE};

const DETECTION_QUEUE_CAPACITY: usize = 1024;
const ACCURACY_EMIT_INTERVAL: Duration = Duration::from_millis(250);

/// A detector reading stamped with the playback time it arrived at.
#[derive(Clone, Copy, Debug)]
struct Detection {
    time: Seconds,
    event: PitchEvent,
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("pitch input error: {0}")]
    Pitch(#[from] PitchError),
    #[error("score surface error: {0}")]
    Score(#[from] ScoreError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid expected notes: {0}")]
    Stream(#[from] StreamError),
    #[error("no score loaded")]
    NoScore,
    #[error("track out of range: {0}")]
    TrackOutOfRange(TrackIndex),
    #[error("session has been torn down")]
    TornDown,
}

/// External collaborators a session drives.
pub struct SessionPorts {
    pub pitch: Box<dyn PitchInputPort>,
    pub score: Arc<dyn ScoreSurfacePort>,
}

/// All state of one practice session. Every operation goes through this
/// context; nothing lives in globals.
pub struct PracticeSession {
    pitch_port: Box<dyn PitchInputPort>,
    score_port: Arc<dyn ScoreSurfacePort>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    state: SessionState,
    score: Option<ScoreDescription>,
    tracks: TrackSelection,
    expected: ExpectedNoteStream,
    smoother: PitchSmoother,
    recorder: PerformanceRecorder,
    geometry: StaffGeometry,
    staff_lines: Option<StaffLines>,
    render: RenderLoop,
    pages: PageWatcher,
    stats: AccuracyStats,
    pitch_stream: Option<Box<dyn PitchInputStream>>,
    pitch_queue_rx: Option<Consumer<Detection>>,
    dropped_detections: Arc<AtomicUsize>,
    teardown: Option<TeardownHandle>,
    events: VecDeque<Event>,
    last_accuracy_emit: Instant,
}

impl PracticeSession {
    pub fn init(ports: SessionPorts, storage: Option<Box<dyn StoragePort>>) -> Self {
        let settings = match storage.as_ref().map(|s| s.load_settings()) {
            Some(Ok(settings)) => {
                let (settings, replaced) = settings.sanitized();
                if !replaced.is_empty() {
                    tracing::warn!(?replaced, "stored settings out of range, using defaults for them");
                }
                settings
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "settings unavailable, using defaults");
                SettingsDto::default()
            }
            None => SettingsDto::default(),
        };

        let mut smoother = PitchSmoother::new(settings.smoothing_window);
        smoother.set_bounds(settings.pitch_lower_bound, settings.pitch_upper_bound);

        Self {
            pitch_port: ports.pitch,
            score_port: ports.score,
            storage,
            smoother,
            recorder: PerformanceRecorder::with_epsilon(settings.jitter_epsilon_secs),
            render: RenderLoop::new(settings.note_head_px),
            settings,
            state: SessionState::Idle,
            score: None,
            tracks: TrackSelection::default(),
            expected: ExpectedNoteStream::default(),
            geometry: StaffGeometry::default(),
            staff_lines: None,
            pages: PageWatcher::default(),
            stats: AccuracyStats::default(),
            pitch_stream: None,
            pitch_queue_rx: None,
            dropped_detections: Arc::new(AtomicUsize::new(0)),
            teardown: None,
            events: VecDeque::new(),
            last_accuracy_emit: Instant::now(),
        }
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        if self.state == SessionState::TornDown {
            return Err(AppError::TornDown);
        }
        match cmd {
            Command::LoadScore { score } => {
                self.load_score(score)?;
            }
            Command::SelectPart { track } => {
                self.select_part(track)?;
            }
            Command::SetTrackMute { track, muted } => {
                if !self.tracks.set_muted(track, muted) {
                    return Err(AppError::TrackOutOfRange(track));
                }
                self.score_port.set_track_mute(track, muted)?;
                self.emit_tracks();
            }
            Command::SetTrackSolo { track, solo } => {
                if !self.tracks.set_solo(track, solo) {
                    return Err(AppError::TrackOutOfRange(track));
                }
                self.score_port.set_track_solo(track, solo)?;
                self.emit_tracks();
            }
            Command::SetFrameMode { mode } => {
                self.render.request_mode(mode);
            }
            Command::SetFeedbackEnabled { enabled } => {
                self.settings.feedback_enabled = enabled;
                self.emit_session_state();
                self.save_settings();
            }
            Command::SetPitchBounds { lower, upper } => {
                self.settings.pitch_lower_bound = lower;
                self.settings.pitch_upper_bound = upper;
                self.smoother.set_bounds(lower, upper);
                self.emit_session_state();
                self.save_settings();
            }
            Command::SetBarsPerPage { bars } => {
                self.settings.bars_per_page = bars;
                self.rebuild_pages();
                self.emit_session_state();
                self.save_settings();
            }
            Command::StartPractice => {
                self.start_practice()?;
            }
            Command::StopPractice => {
                self.stop_practice();
            }
        }
        Ok(())
    }

    /// Drain detections from the audio side and advance everything that
    /// follows playback time except drawing.
    pub fn pump(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        self.refresh_layout();

        let now = self.score_port.playback_time();
        let pending = self.take_detections();
        if self.score_port.player_state() == PlayerState::Playing {
            for detection in pending {
                self.process_detection(detection);
            }
        } else if !pending.is_empty() {
            tracing::debug!(count = pending.len(), "player not playing, readings ignored");
        }

        let dropped = self.dropped_detections.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            tracing::debug!(dropped, "detection queue full, readings dropped");
        }

        self.watch_pages(now);
    }

    /// Per-animation-frame entry point.
    pub fn frame(&mut self, surface: &mut dyn DrawSurface) -> FrameReport {
        if self.state == SessionState::TornDown {
            return FrameReport::default();
        }
        let running = self.state == SessionState::Running;
        if running {
            self.expected.advance_to(self.score_port.playback_time());
        }

        let highlighting = self.render.mode() == FrameMode::MeasureHighlight
            || self.render.requested_mode() == FrameMode::MeasureHighlight;
        if !highlighting && !(running && self.settings.feedback_enabled) {
            return FrameReport::default();
        }
        if highlighting {
            // Highlighting also works outside a run, so pump may not have
            // picked up the rendered staff yet.
            self.refresh_layout();
        }

        let ctx = FrameContext {
            score: self.score_port.as_ref(),
            draw: self.geometry.draw_state(),
            expected: self.expected.current_expected(),
        };
        let report = self.render.frame(surface, &ctx);

        if let Some(accuracy) = report.accuracy {
            self.stats.record(accuracy);
            self.emit_accuracy(false);
        }
        if report.sections_completed > 0 {
            self.events.push_back(Event::HighlightSections {
                sections: self.render.highlighter().sections().to_vec(),
            });
        }
        report
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    /// Release microphone, overlay and player. Safe to call more than once;
    /// every call returns a handle to the same teardown.
    pub fn teardown(&mut self) -> TeardownHandle {
        if let Some(handle) = self.teardown.as_ref() {
            return handle.clone();
        }
        tracing::info!("tearing down practice session");
        self.stop_practice();

        let signal = ReleaseSignal::new(&Resource::ALL);
        let handle = TeardownHandle::new(signal.clone());
        self.teardown = Some(handle.clone());

        if let Some(stream) = self.pitch_stream.take() {
            stream.close();
        }
        self.pitch_queue_rx = None;
        signal.release(Resource::Microphone);

        self.render.detach();
        signal.release(Resource::Render);

        let player = signal.clone();
        let on_stopped = Box::new(move || player.release(Resource::Player));
        match self.score_port.stop(on_stopped) {
            Ok(()) => {}
            Err(ScoreError::PlayerUnavailable(reason)) => {
                tracing::debug!(%reason, "no player to stop");
                signal.release(Resource::Player);
            }
            Err(err) => {
                tracing::warn!(error = %err, "player stop request failed");
            }
        }

        self.recorder.clear();
        self.expected = ExpectedNoteStream::default();
        self.smoother.clear();
        self.state = SessionState::TornDown;
        self.emit_session_state();
        handle
    }

    /// Tear down and wait up to the configured timeout for every resource.
    pub fn shutdown(&mut self) -> Result<(), TeardownWarning> {
        let timeout = Duration::from_millis(self.settings.teardown_timeout_ms);
        let handle = self.teardown();
        handle.wait(timeout).map_err(|warning| {
            self.events.push_back(Event::TeardownIncomplete {
                pending: warning.pending.clone(),
            });
            warning
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn tracks(&self) -> &TrackSelection {
        &self.tracks
    }

    pub fn draw_state(&self) -> DrawState {
        self.geometry.draw_state()
    }

    pub fn expected(&self) -> &ExpectedNoteStream {
        &self.expected
    }

    pub fn stats(&self) -> AccuracyStats {
        self.stats
    }

    pub fn page_sections(&self) -> &[Seconds] {
        self.pages.sections()
    }

    pub fn performance_log(&self) -> &[PitchSample] {
        self.recorder.samples()
    }

    fn load_score(&mut self, score: ScoreDescription) -> Result<(), AppError> {
        self.stop_practice();
        let names = score.parts.iter().map(|p| p.name.clone()).collect();
        let clefs = score.parts.iter().map(|p| p.clefs.clone()).collect();
        self.tracks = TrackSelection::load(names, clefs);
        self.score = Some(score);
        self.rebuild_pages();
        self.staff_lines = None;

        self.state = SessionState::Ready;
        self.events.push_back(Event::ScoreLoaded {
            tracks: self.tracks.tracks().to_vec(),
            sections: self.pages.sections().to_vec(),
        });
        if !self.tracks.is_empty() {
            self.apply_part(TrackIndex(0));
        }
        self.emit_session_state();
        Ok(())
    }

    fn select_part(&mut self, track: TrackIndex) -> Result<(), AppError> {
        if self.score.is_none() {
            return Err(AppError::NoScore);
        }
        if track.0 >= self.tracks.len() {
            return Err(AppError::TrackOutOfRange(track));
        }
        if self.tracks.select(track) {
            self.apply_part(track);
        }
        Ok(())
    }

    fn apply_part(&mut self, track: TrackIndex) {
        self.tracks.select(track);
        let part = self
            .score
            .as_ref()
            .and_then(|score| score.parts.get(track.0))
            .cloned()
            .unwrap_or_default();

        self.expected = part.expectation;
        let (lower, upper) = part
            .lower_upper
            .unwrap_or((self.settings.pitch_lower_bound, self.settings.pitch_upper_bound));
        self.smoother.set_bounds(lower, upper);

        let clef = self.tracks.clef();
        let base_octave = self.tracks.base_octave();
        self.geometry.set_base_octave(base_octave);
        tracing::debug!(%track, %clef, base_octave, "part selected");
        self.events.push_back(Event::PartSelected {
            track,
            clef,
            base_octave,
        });
    }

    fn rebuild_pages(&mut self) {
        let Some(score) = self.score.as_ref() else {
            return;
        };
        let sections = section_lengths(
            &score.measure_lengths,
            score.measures,
            self.settings.bars_per_page,
        );
        self.pages = PageWatcher::new(sections, score.measures.start, self.settings.bars_per_page);
    }

    fn start_practice(&mut self) -> Result<(), AppError> {
        if self.score.is_none() {
            return Err(AppError::NoScore);
        }
        if self.pitch_stream.is_none() {
            self.open_pitch_input()?;
        }

        self.smoother.clear();
        self.recorder.clear();
        self.recorder.set_epsilon(self.settings.jitter_epsilon_secs);
        self.expected.restart();
        self.geometry.update_note(SILENCE);
        self.render.set_note_head_px(self.settings.note_head_px);
        self.render.attach();
        self.render.reset_positions();
        self.pages.reset();
        self.stats.reset();
        self.staff_lines = None;

        self.state = SessionState::Running;
        self.refresh_layout();
        tracing::info!(track = %self.tracks.current(), "practice started");
        self.emit_session_state();
        Ok(())
    }

    fn stop_practice(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        // Readings already queued still belong to this performance.
        for detection in self.take_detections() {
            self.process_detection(detection);
        }

        self.state = SessionState::Ready;
        tracing::info!(samples = self.recorder.len(), "practice stopped");
        self.events.push_back(Event::PerformanceRecorded {
            samples: self.recorder.samples().to_vec(),
        });
        self.emit_accuracy(true);
        self.emit_session_state();
    }

    fn open_pitch_input(&mut self) -> Result<(), AppError> {
        let (producer, consumer) = RingBuffer::new(DETECTION_QUEUE_CAPACITY);
        let producer = Arc::new(Mutex::new(producer));
        let dropped = self.dropped_detections.clone();
        let score = self.score_port.clone();
        let cb = Arc::new(move |event: PitchEvent| {
            let detection = Detection {
                time: score.playback_time(),
                event,
            };
            let pushed = producer
                .try_lock()
                .map(|mut guard| guard.push(detection).is_ok())
                .unwrap_or(false);
            if !pushed {
                dropped.fetch_add(1, Ordering::Relaxed);
            }
        });

        let stream = self.pitch_port.open_input(cb)?;
        self.pitch_stream = Some(stream);
        self.pitch_queue_rx = Some(consumer);
        tracing::debug!("pitch input opened");
        Ok(())
    }

    fn take_detections(&mut self) -> Vec<Detection> {
        let mut pending = Vec::new();
        if let Some(consumer) = self.pitch_queue_rx.as_mut() {
            while let Ok(detection) = consumer.pop() {
                pending.push(detection);
            }
        }
        pending
    }

    fn process_detection(&mut self, detection: Detection) {
        let Detection { time, event } = detection;
        let raw = detection_to_midi(event.frequency_hz.map(f64::from));
        let smoothed = self.smoother.push(raw);
        self.recorder.add_pitch(f64::from(smoothed), time);
        if self.geometry.update_note(smoothed) {
            let note = self.geometry.note();
            self.events.push_back(Event::NoteChanged {
                midi: note.midi(),
                name: note.to_string(),
                time,
            });
        }
    }

    /// Re-read the rendered staff of the selected part; layout only changes
    /// when the renderer moved it.
    fn refresh_layout(&mut self) {
        let Some(lines) = self.score_port.staff_lines() else {
            return;
        };
        if self.staff_lines == Some(lines) {
            return;
        }
        self.staff_lines = Some(lines);
        self.geometry
            .set_layout(lines.top_line_y, lines.spacing(), self.tracks.base_octave());
        let layout = self.geometry.layout();
        tracing::debug!(?layout, "staff layout changed");
        self.events.push_back(Event::LayoutChanged { layout });
    }

    fn watch_pages(&mut self, now: Seconds) {
        let Some(turn) = self.pages.observe(now) else {
            return;
        };
        self.render.reset_positions();
        let measure = self
            .score
            .as_ref()
            .map(|score| {
                // Lengths are relative to the first displayed measure.
                let relative = time_to_measure(now, 1, &score.measure_lengths);
                score.measures.start.max(1) + relative - 1
            })
            .unwrap_or(turn.start_bar);
        tracing::debug!(section = turn.section, start_bar = turn.start_bar, "page turned");
        self.events.push_back(Event::PageTurned {
            section: turn.section,
            start_bar: turn.start_bar,
            measure,
        });
    }

    fn emit_tracks(&mut self) {
        self.events.push_back(Event::TracksUpdated {
            tracks: self.tracks.tracks().to_vec(),
            audible: self.tracks.audible(),
        });
    }

    fn emit_accuracy(&mut self, force: bool) {
        let now = Instant::now();
        if !force && now.duration_since(self.last_accuracy_emit) < ACCURACY_EMIT_INTERVAL {
            return;
        }
        self.events.push_back(Event::AccuracyUpdated {
            stats: self.stats,
            ratio: self.stats.ratio(),
        });
        self.last_accuracy_emit = now;
    }

    fn emit_session_state(&mut self) {
        self.events.push_back(Event::SessionStateUpdated {
            state: self.state,
            settings: self.settings.clone(),
        });
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                tracing::warn!(error = %err, "failed to save settings");
            }
        }
    }
}
