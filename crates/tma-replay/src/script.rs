//! Replay scripts: a score, the rendered staff, and timed detector readings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tma_core::ScoreDescription;
use tma_ports::score::{StaffLines, Viewport};
use tma_ports::types::{Px, Seconds, TrackIndex};

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("cannot read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("frame interval must be positive, got {0}")]
    FrameInterval(Seconds),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub time: Seconds,
    /// `null` when the detector heard nothing.
    pub hz: Option<f32>,
}

/// Playback cursor moving linearly across the page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorPath {
    pub start_x: Px,
    pub px_per_second: Px,
}

impl CursorPath {
    pub fn x_at(&self, time: Seconds) -> Px {
        self.start_x + self.px_per_second * time
    }
}

fn default_frame_interval() -> Seconds {
    1.0 / 60.0
}

fn default_staff() -> StaffLines {
    StaffLines {
        top_line_y: 99.0,
        next_line_y: 109.0,
    }
}

fn default_viewport() -> Viewport {
    Viewport {
        width: 1200.0,
        height: 800.0,
    }
}

fn default_cursor() -> CursorPath {
    CursorPath {
        start_x: 40.0,
        px_per_second: 60.0,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Script {
    pub score: ScoreDescription,
    #[serde(default)]
    pub part: TrackIndex,
    #[serde(default = "default_frame_interval")]
    pub frame_interval: Seconds,
    #[serde(default = "default_staff")]
    pub staff: StaffLines,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_cursor")]
    pub cursor: CursorPath,
    pub detections: Vec<Detection>,
    /// Defaults to the last detection.
    #[serde(default)]
    pub duration: Option<Seconds>,
}

impl Script {
    pub fn from_json(source: &str) -> Result<Self, ScriptError> {
        let mut script: Script = serde_json::from_str(source)?;
        if script.frame_interval.is_nan() || script.frame_interval <= 0.0 {
            return Err(ScriptError::FrameInterval(script.frame_interval));
        }
        script
            .detections
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn duration(&self) -> Seconds {
        self.duration
            .or_else(|| self.detections.last().map(|d| d.time))
            .unwrap_or(0.0)
    }
}
