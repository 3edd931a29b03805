use serde::{Deserialize, Serialize};
use std::fmt;

pub type Seconds = f64; // playback time, monotonic while the player runs
pub type Px = f64; // overlay pixels, y grows downwards
pub type MidiValue = i32; // 0..=127, or SILENCE

/// Sentinel for "no pitch": never takes part in octave or letter computation.
pub const SILENCE: MidiValue = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const YELLOW: Rgb = Rgb(0xCC, 0xCC, 0x00);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const MAGENTA: Rgb = Rgb(255, 0, 255);
    pub const BACKGROUND: Rgb = Rgb(0xF8, 0xF8, 0xF8);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIndex(pub usize);

impl fmt::Display for TrackIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}
