use crate::types::*;
use serde::{Deserialize, Serialize};

pub const MAX_SMOOTHING_WINDOW: usize = 64;
pub const MAX_TEARDOWN_TIMEOUT_MS: u64 = 60_000;

fn default_pitch_lower_bound() -> MidiValue {
    21
}

fn default_pitch_upper_bound() -> MidiValue {
    127
}

fn default_smoothing_window() -> usize {
    5
}

fn default_jitter_epsilon_secs() -> Seconds {
    0.00001
}

fn default_bars_per_page() -> u32 {
    20
}

fn default_note_head_px() -> Px {
    10.0
}

fn default_teardown_timeout_ms() -> u64 {
    2000
}

fn default_feedback_enabled() -> bool {
    true
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    /// Smoothed pitches below this are shown as silence (A0 by default).
    #[serde(default = "default_pitch_lower_bound")]
    pub pitch_lower_bound: MidiValue,
    #[serde(default = "default_pitch_upper_bound")]
    pub pitch_upper_bound: MidiValue,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    #[serde(default = "default_jitter_epsilon_secs")]
    pub jitter_epsilon_secs: Seconds,
    #[serde(default = "default_bars_per_page")]
    pub bars_per_page: u32,
    #[serde(default = "default_note_head_px")]
    pub note_head_px: Px,
    #[serde(default = "default_teardown_timeout_ms")]
    pub teardown_timeout_ms: u64,
    #[serde(default = "default_feedback_enabled")]
    pub feedback_enabled: bool,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            pitch_lower_bound: default_pitch_lower_bound(),
            pitch_upper_bound: default_pitch_upper_bound(),
            smoothing_window: default_smoothing_window(),
            jitter_epsilon_secs: default_jitter_epsilon_secs(),
            bars_per_page: default_bars_per_page(),
            note_head_px: default_note_head_px(),
            teardown_timeout_ms: default_teardown_timeout_ms(),
            feedback_enabled: default_feedback_enabled(),
        }
    }
}

impl SettingsDto {
    /// Replace values a session cannot run with by their defaults. Returns the
    /// names of the fields that were replaced.
    pub fn sanitized(mut self) -> (Self, Vec<&'static str>) {
        let mut replaced = Vec::new();
        if !(1..=MAX_SMOOTHING_WINDOW).contains(&self.smoothing_window) {
            self.smoothing_window = default_smoothing_window();
            replaced.push("smoothing_window");
        }
        if self.teardown_timeout_ms > MAX_TEARDOWN_TIMEOUT_MS {
            self.teardown_timeout_ms = default_teardown_timeout_ms();
            replaced.push("teardown_timeout_ms");
        }
        if !self.jitter_epsilon_secs.is_finite() || self.jitter_epsilon_secs < 0.0 {
            self.jitter_epsilon_secs = default_jitter_epsilon_secs();
            replaced.push("jitter_epsilon_secs");
        }
        if !self.note_head_px.is_finite() || self.note_head_px <= 0.0 {
            self.note_head_px = default_note_head_px();
            replaced.push("note_head_px");
        }
        if self.bars_per_page < 2 {
            self.bars_per_page = default_bars_per_page();
            replaced.push("bars_per_page");
        }
        if self.pitch_lower_bound > self.pitch_upper_bound {
            self.pitch_lower_bound = default_pitch_lower_bound();
            self.pitch_upper_bound = default_pitch_upper_bound();
            replaced.push("pitch_bounds");
        }
        (self, replaced)
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
