use crate::highlight::MusicSection;
use crate::render_loop::FrameMode;
use crate::teardown::Resource;
use serde::{Deserialize, Serialize};
use tma_domain_eval::{AccuracyStats, ExpectedNoteStream, PitchSample};
use tma_domain_notation::{Clef, MeasureRange, StaffLayout, TrackState};
use tma_ports::storage::SettingsDto;
use tma_ports::types::{MidiValue, Seconds, TrackIndex};

/// One singable part of a score, as the score service describes it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartDescription {
    pub name: String,
    /// Clef names of the part's staves, top to bottom.
    #[serde(default)]
    pub clefs: Vec<String>,
    /// Flat `[midi, seconds, ...]` pairs.
    #[serde(default, rename = "performance_expectation")]
    pub expectation: ExpectedNoteStream,
    /// Singable range; smoothed pitches outside it display as silence.
    #[serde(default)]
    pub lower_upper: Option<(MidiValue, MidiValue)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreDescription {
    pub parts: Vec<PartDescription>,
    /// Length in seconds of each measure of the displayed range.
    #[serde(default)]
    pub measure_lengths: Vec<Seconds>,
    pub measures: MeasureRange,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    LoadScore { score: ScoreDescription },
    SelectPart { track: TrackIndex },
    SetTrackMute { track: TrackIndex, muted: bool },
    SetTrackSolo { track: TrackIndex, solo: bool },
    SetFrameMode { mode: FrameMode },
    SetFeedbackEnabled { enabled: bool },
    SetPitchBounds { lower: MidiValue, upper: MidiValue },
    SetBarsPerPage { bars: u32 },
    StartPractice,
    StopPractice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Ready,
    Running,
    TornDown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    SessionStateUpdated { state: SessionState, settings: SettingsDto },
    ScoreLoaded { tracks: Vec<TrackState>, sections: Vec<Seconds> },
    PartSelected { track: TrackIndex, clef: Clef, base_octave: i32 },
    TracksUpdated { tracks: Vec<TrackState>, audible: Vec<TrackIndex> },
    LayoutChanged { layout: StaffLayout },
    NoteChanged { midi: MidiValue, name: String, time: Seconds },
    /// `measure` is the first measure starting at or after the turn.
    PageTurned { section: usize, start_bar: u32, measure: u32 },
    AccuracyUpdated { stats: AccuracyStats, ratio: f64 },
    HighlightSections { sections: Vec<MusicSection> },
    PerformanceRecorded { samples: Vec<PitchSample> },
    TeardownIncomplete { pending: Vec<Resource> },
}
