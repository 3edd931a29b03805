//! Page sections of the rendered score, in playback seconds.

use serde::{Deserialize, Serialize};
use tma_ports::types::Seconds;

/// Remaining time below which a position counts as reaching a barline.
const MEASURE_EPSILON: Seconds = 0.01;

/// One-based, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureRange {
    pub start: u32,
    pub end: u32,
}

impl MeasureRange {
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group per-measure durations (starting at `range.start`) into page sections.
///
/// A page shows `bars_per_page` bars and the next page starts on the last bar of
/// the previous one, so each section spans `bars_per_page - 1` measures. Missing
/// or non-finite lengths end the grouping early; a partial trailing page becomes
/// its own section.
pub fn section_lengths(
    measure_lengths: &[Seconds],
    range: MeasureRange,
    bars_per_page: u32,
) -> Vec<Seconds> {
    let per_section = bars_per_page.saturating_sub(1).max(1) as usize;
    let mut sections = Vec::new();
    let mut total = 0.0;
    let mut count = 0usize;

    for length in measure_lengths.iter().take(range.len()) {
        if !length.is_finite() {
            break;
        }
        total += length;
        count += 1;
        if count == per_section {
            sections.push(total);
            total = 0.0;
            count = 0;
        }
    }
    if count > 0 {
        sections.push(total);
    }
    sections
}

/// Measure number reached after `position` seconds, counting from
/// `start_measure`. `measure_lengths[0]` is the length of measure 1.
pub fn time_to_measure(position: Seconds, start_measure: u32, measure_lengths: &[Seconds]) -> u32 {
    let mut remaining = position;
    let mut measure = start_measure.max(1);
    while remaining > MEASURE_EPSILON {
        let Some(length) = measure_lengths.get(measure as usize - 1) else {
            break;
        };
        remaining -= length;
        measure += 1;
    }
    measure
}
