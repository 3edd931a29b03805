use serde::{Deserialize, Serialize};
use std::fmt;

pub const TREBLE_BASE_OCTAVE: i32 = 4;
pub const BASS_BASE_OCTAVE: i32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clef {
    #[default]
    Treble,
    Bass,
}

impl Clef {
    /// Case-insensitive; anything the renderer reports that is not a bass/F4 clef
    /// is laid out like treble.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bass" | "f4" => Clef::Bass,
            _ => Clef::Treble,
        }
    }

    pub fn base_octave(self) -> i32 {
        match self {
            Clef::Treble => TREBLE_BASE_OCTAVE,
            Clef::Bass => BASS_BASE_OCTAVE,
        }
    }

    pub fn is_treble_like(base_octave: i32) -> bool {
        base_octave == TREBLE_BASE_OCTAVE
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clef::Treble => write!(f, "treble"),
            Clef::Bass => write!(f, "bass"),
        }
    }
}
