//! Frequency to pitch conversion.

use tma_ports::types::{MidiValue, SILENCE};

pub const A4_HZ: f64 = 440.0;
pub const A4_MIDI: f64 = 69.0;

/// Equal-tempered MIDI pitch for a frequency, A4 = 440 Hz = 69.
///
/// Only defined for positive frequencies; detector output should go through
/// [`detection_to_midi`] instead.
pub fn frequency_to_midi(frequency_hz: f64) -> f64 {
    A4_MIDI + 12.0 * (frequency_hz / A4_HZ).log2()
}

/// Guarded conversion for raw detector readings: missing, non-positive or
/// non-finite frequencies are silence.
pub fn detection_to_midi(frequency_hz: Option<f64>) -> Option<f64> {
    match frequency_hz {
        Some(hz) if hz.is_finite() && hz > 0.0 => Some(frequency_to_midi(hz)),
        _ => None,
    }
}

/// Nearest whole MIDI value, or [`SILENCE`].
pub fn nearest_midi(midi: Option<f64>) -> MidiValue {
    match midi {
        Some(value) if value >= 0.0 => value.round() as MidiValue,
        _ => SILENCE,
    }
}
