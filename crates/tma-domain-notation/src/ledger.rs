//! Ledger-line counts for notes beyond the staff.
//!
//! Line positions repeat every 24 semitones (two octaves of seven diatonic
//! steps), so one 24-entry cycle per direction/start line covers every pitch.
//! Entry `i` of a cycle is indexed by `parity * 12 + midi % 12`, where parity is
//! 0 for even octaves and 1 for odd ones.

use crate::note::octave_of;
use serde::{Deserialize, Serialize};
use tma_ports::types::MidiValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerDirection {
    Up,
    Down,
}

/// Reference line the cycle is counted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerStart {
    A,
    C,
    E,
}

const UP_FROM_C: [u32; 24] = [
    1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7,
];
const UP_FROM_A: [u32; 24] = [
    2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 7, 7, 7, 7, 1, 1, 1,
];
const DOWN_FROM_C: [u32; 24] = [
    1, 1, 7, 7, 7, 6, 6, 6, 6, 5, 5, 5, 4, 4, 4, 4, 3, 3, 3, 2, 2, 2, 2, 1,
];
const DOWN_FROM_E: [u32; 24] = [
    2, 2, 1, 1, 1, 7, 7, 7, 7, 6, 6, 6, 5, 5, 5, 5, 4, 4, 4, 3, 3, 3, 3, 2,
];

/// Semitones after which the cycles repeat.
pub const LEDGER_CYCLE: i32 = 24;

fn cycle(direction: LedgerDirection, start: LedgerStart) -> Option<&'static [u32; 24]> {
    match (direction, start) {
        (LedgerDirection::Up, LedgerStart::C) => Some(&UP_FROM_C),
        (LedgerDirection::Up, LedgerStart::A) => Some(&UP_FROM_A),
        (LedgerDirection::Down, LedgerStart::C) => Some(&DOWN_FROM_C),
        (LedgerDirection::Down, LedgerStart::E) => Some(&DOWN_FROM_E),
        _ => None,
    }
}

/// Raw ledger-line count within a single cycle.
///
/// Unsupported direction/start pairs (up from E, down from A) and silence yield 0.
pub fn ledger_line_count(midi: MidiValue, direction: LedgerDirection, start: LedgerStart) -> u32 {
    if midi < 0 {
        return 0;
    }
    let Some(table) = cycle(direction, start) else {
        return 0;
    };
    let parity = if octave_of(midi) % 2 == 0 { 0 } else { 12 };
    table[parity + midi.rem_euclid(12) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_pairs_are_zero() {
        for midi in 0..=127 {
            assert_eq!(ledger_line_count(midi, LedgerDirection::Up, LedgerStart::E), 0);
            assert_eq!(ledger_line_count(midi, LedgerDirection::Down, LedgerStart::A), 0);
        }
    }

    #[test]
    fn treble_neighbours() {
        // A5 sits on the first line above the treble staff, C6 on the second.
        assert_eq!(ledger_line_count(81, LedgerDirection::Up, LedgerStart::A), 1);
        assert_eq!(ledger_line_count(84, LedgerDirection::Up, LedgerStart::A), 2);
        // Middle C and C# share the first line below.
        assert_eq!(ledger_line_count(60, LedgerDirection::Down, LedgerStart::C), 1);
        assert_eq!(ledger_line_count(61, LedgerDirection::Down, LedgerStart::C), 1);
        assert_eq!(ledger_line_count(57, LedgerDirection::Down, LedgerStart::C), 2);
    }

    #[test]
    fn bass_neighbours() {
        assert_eq!(ledger_line_count(60, LedgerDirection::Up, LedgerStart::C), 1);
        assert_eq!(ledger_line_count(64, LedgerDirection::Up, LedgerStart::C), 2);
        assert_eq!(ledger_line_count(40, LedgerDirection::Down, LedgerStart::E), 1);
        assert_eq!(ledger_line_count(36, LedgerDirection::Down, LedgerStart::E), 2);
    }

    #[test]
    fn silence_has_no_lines() {
        assert_eq!(ledger_line_count(-1, LedgerDirection::Up, LedgerStart::C), 0);
    }
}
