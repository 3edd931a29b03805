use serde::{Deserialize, Serialize};
use thiserror::Error;
use tma_ports::types::{MidiValue, Seconds, SILENCE};

#[derive(Debug, Error, PartialEq)]
pub enum StreamError {
    #[error("expected-note sequence has odd length {0}")]
    OddLength(usize),
    #[error("invalid duration {value} at index {index}")]
    InvalidDuration { index: usize, value: f64 },
    #[error("invalid pitch {value} at index {index}")]
    InvalidPitch { index: usize, value: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedNote {
    pub midi: MidiValue,
    pub duration: Seconds,
}

/// Run-length encoded notes of the piece, consumed as playback time moves on.
///
/// The cursor only moves forward. `restart` is the single way back to the start.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ExpectedNoteStream {
    notes: Vec<ExpectedNote>,
    cursor: usize,
    accumulated: Seconds,
}

impl ExpectedNoteStream {
    pub fn new(notes: Vec<ExpectedNote>) -> Self {
        Self {
            notes,
            cursor: 0,
            accumulated: 0.0,
        }
    }

    /// Parses `[midi, duration, midi, duration, ...]`. Negative pitches are rests.
    pub fn from_flat(flat: &[f64]) -> Result<Self, StreamError> {
        if flat.len() % 2 != 0 {
            return Err(StreamError::OddLength(flat.len()));
        }
        let mut notes = Vec::with_capacity(flat.len() / 2);
        for (pair, chunk) in flat.chunks_exact(2).enumerate() {
            let (midi, duration) = (chunk[0], chunk[1]);
            let index = pair * 2;
            if !midi.is_finite() || midi > 127.0 {
                return Err(StreamError::InvalidPitch { index, value: midi });
            }
            if !duration.is_finite() || duration < 0.0 {
                return Err(StreamError::InvalidDuration {
                    index: index + 1,
                    value: duration,
                });
            }
            let midi = if midi < 0.0 { SILENCE } else { midi.round() as MidiValue };
            notes.push(ExpectedNote { midi, duration });
        }
        Ok(Self::new(notes))
    }

    pub fn advance_to(&mut self, playback_time: Seconds) {
        while let Some(note) = self.notes.get(self.cursor) {
            if self.accumulated + note.duration > playback_time {
                break;
            }
            self.accumulated += note.duration;
            self.cursor += 1;
        }
    }

    /// Silence once the stream is exhausted.
    pub fn current_expected(&self) -> MidiValue {
        self.notes
            .get(self.cursor)
            .map(|note| note.midi)
            .unwrap_or(SILENCE)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn accumulated(&self) -> Seconds {
        self.accumulated
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.notes.len()
    }

    pub fn notes(&self) -> &[ExpectedNote] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn total_duration(&self) -> Seconds {
        self.notes.iter().map(|note| note.duration).sum()
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
        self.accumulated = 0.0;
    }
}

impl TryFrom<Vec<f64>> for ExpectedNoteStream {
    type Error = StreamError;

    fn try_from(flat: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_flat(&flat)
    }
}

impl From<ExpectedNoteStream> for Vec<f64> {
    fn from(stream: ExpectedNoteStream) -> Self {
        stream
            .notes
            .iter()
            .flat_map(|note| [f64::from(note.midi), note.duration])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_sequences() {
        assert_eq!(
            ExpectedNoteStream::from_flat(&[60.0, 1.0, 62.0]),
            Err(StreamError::OddLength(3))
        );
        assert_eq!(
            ExpectedNoteStream::from_flat(&[60.0, -1.0]),
            Err(StreamError::InvalidDuration {
                index: 1,
                value: -1.0
            })
        );
        assert!(matches!(
            ExpectedNoteStream::from_flat(&[f64::NAN, 1.0]),
            Err(StreamError::InvalidPitch { index: 0, .. })
        ));
    }

    #[test]
    fn boundary_time_advances() {
        let mut stream = ExpectedNoteStream::from_flat(&[60.0, 1.0, 62.0, 2.0]).unwrap();
        stream.advance_to(1.0);
        assert_eq!(stream.current_expected(), 62);
        assert_eq!(stream.cursor(), 1);
    }

    #[test]
    fn overrun_yields_silence() {
        let mut stream = ExpectedNoteStream::from_flat(&[60.0, 1.0]).unwrap();
        stream.advance_to(10.0);
        assert!(stream.is_finished());
        assert_eq!(stream.current_expected(), SILENCE);
        stream.advance_to(20.0);
        assert_eq!(stream.cursor(), 1);
    }

    #[test]
    fn rests_and_restart() {
        let mut stream = ExpectedNoteStream::from_flat(&[-1.0, 0.5, 64.0, 0.5]).unwrap();
        assert_eq!(stream.current_expected(), SILENCE);
        stream.advance_to(0.6);
        assert_eq!(stream.current_expected(), 64);
        stream.restart();
        assert_eq!(stream.cursor(), 0);
        assert_eq!(stream.accumulated(), 0.0);
        assert_eq!(stream.total_duration(), 1.0);
    }

    #[test]
    fn empty_stream_is_silent() {
        let stream = ExpectedNoteStream::default();
        assert!(stream.is_empty());
        assert_eq!(stream.current_expected(), SILENCE);
    }
}
