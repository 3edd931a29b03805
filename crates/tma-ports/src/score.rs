use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Stopped,
    Playing,
    PendingStop,
}

/// Y positions of the first two rendered staff lines of the selected part.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffLines {
    pub top_line_y: Px,
    pub next_line_y: Px,
}

impl StaffLines {
    pub fn spacing(&self) -> Px {
        self.next_line_y - self.top_line_y
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: Px,
    pub height: Px,
}

/// A rendered barline. `row` identifies the staff system it belongs to; markers
/// on different rows restart their x coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureMarker {
    pub x: Px,
    pub y: Px,
    pub row: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("track out of range: {0}")]
    TrackOutOfRange(TrackIndex),
    #[error("player unavailable: {0}")]
    PlayerUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

pub type PlayerStoppedCallback = Box<dyn FnOnce() + Send + 'static>;

/// The score renderer/player the overlay sits on top of.
pub trait ScoreSurfacePort: Send + Sync {
    fn playback_time(&self) -> Seconds;
    fn player_state(&self) -> PlayerState;

    fn viewport(&self) -> Viewport;
    /// Horizontal position of the playback cursor in overlay coordinates.
    fn cursor_x(&self) -> Option<Px>;
    fn staff_lines(&self) -> Option<StaffLines>;
    /// Bounds of the first bar, if the renderer has placed it yet.
    fn first_bar(&self) -> Option<Rect>;
    fn measure_markers(&self) -> Vec<MeasureMarker>;

    fn set_track_mute(&self, track: TrackIndex, muted: bool) -> Result<(), ScoreError>;
    fn set_track_solo(&self, track: TrackIndex, solo: bool) -> Result<(), ScoreError>;

    /// Ask the player to stop. `on_stopped` must be invoked exactly once, when the
    /// player has actually reached `Stopped` (immediately if it already has).
    fn stop(&self, on_stopped: PlayerStoppedCallback) -> Result<(), ScoreError>;
}
