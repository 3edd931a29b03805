use serde::{Deserialize, Serialize};
use std::fmt;
use tma_ports::types::{MidiValue, SILENCE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const CHROMATIC: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn from_midi(midi: MidiValue) -> Self {
        Self::CHROMATIC[midi.rem_euclid(12) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    pub fn is_sharp(self) -> bool {
        self.name().len() == 2
    }
}

/// Scientific octave number: MIDI 60 is C4.
pub fn octave_of(midi: MidiValue) -> i32 {
    midi.div_euclid(12) - 1
}

/// Spelling cached alongside the MIDI value; absent for silence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spelling {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    midi: MidiValue,
    spelling: Option<Spelling>,
}

impl Note {
    pub const SILENT: Note = Note {
        midi: SILENCE,
        spelling: None,
    };

    /// Any negative value is treated as the silence sentinel.
    pub fn from_midi(midi: MidiValue) -> Self {
        if midi < 0 {
            return Self::SILENT;
        }
        Self {
            midi,
            spelling: Some(Spelling {
                pitch_class: PitchClass::from_midi(midi),
                octave: octave_of(midi),
            }),
        }
    }

    /// Replace the held value. Returns false (and does nothing) when the value is
    /// unchanged.
    pub fn update(&mut self, midi: MidiValue) -> bool {
        let midi = midi.max(SILENCE);
        if midi == self.midi {
            return false;
        }
        *self = Self::from_midi(midi);
        true
    }

    pub fn midi(&self) -> MidiValue {
        self.midi
    }

    pub fn is_silent(&self) -> bool {
        self.spelling.is_none()
    }

    pub fn pitch_class(&self) -> Option<PitchClass> {
        self.spelling.map(|s| s.pitch_class)
    }

    pub fn octave(&self) -> Option<i32> {
        self.spelling.map(|s| s.octave)
    }

    pub fn letter_name(&self) -> Option<&'static str> {
        self.pitch_class().map(PitchClass::name)
    }

    pub fn is_sharp(&self) -> bool {
        self.pitch_class().is_some_and(PitchClass::is_sharp)
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::SILENT
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spelling {
            Some(s) => write!(f, "{}{}", s.pitch_class.name(), s.octave),
            None => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octave_matches_floor_formula_for_full_range() {
        for midi in 0..=127 {
            let note = Note::from_midi(midi);
            assert_eq!(note.octave(), Some(midi / 12 - 1), "midi {midi}");
        }
    }

    #[test]
    fn spelling() {
        let note = Note::from_midi(61);
        assert_eq!(note.letter_name(), Some("C#"));
        assert!(note.is_sharp());
        assert_eq!(note.to_string(), "C#4");

        let note = Note::from_midi(69);
        assert_eq!(note.letter_name(), Some("A"));
        assert!(!note.is_sharp());
        assert_eq!(note.to_string(), "A4");

        assert_eq!(Note::from_midi(0).to_string(), "C-1");
    }

    #[test]
    fn silence_has_no_spelling() {
        let note = Note::from_midi(SILENCE);
        assert!(note.is_silent());
        assert_eq!(note.octave(), None);
        assert_eq!(note.letter_name(), None);
        assert!(!note.is_sharp());
        assert_eq!(note.to_string(), "-");
    }

    #[test]
    fn update_with_same_value_is_noop() {
        let mut note = Note::from_midi(60);
        assert!(!note.update(60));
        assert!(note.update(62));
        assert_eq!(note.letter_name(), Some("D"));
        assert!(note.update(SILENCE));
        assert!(note.is_silent());
        assert!(!note.update(-5));
    }
}
