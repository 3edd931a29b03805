use serde::{Deserialize, Serialize};
use tma_ports::types::{Seconds, SILENCE};

pub const DEFAULT_JITTER_EPSILON: Seconds = 0.00001;

/// Silence expressed in the recorder's float representation.
pub const SILENT_SAMPLE: f64 = SILENCE as f64;

/// A pitch onset. Field names match the exported performance format.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    #[serde(rename = "midival")]
    pub midi: f64,
    #[serde(rename = "timepos")]
    pub time: Seconds,
}

impl PitchSample {
    pub fn is_silent(&self) -> bool {
        self.midi < 0.0
    }
}

/// Onset log for one practice session.
///
/// A sample only becomes a new entry when its rounded pitch differs from the
/// last entry's. A differing sample that arrives within `epsilon` of the
/// previous one is detector jitter on the same onset: it rewrites the last
/// entry's pitch instead of appending. The onset stays open only while calls
/// keep arriving within `epsilon` of each other; after a gap the last entry is
/// settled and never rewritten.
#[derive(Clone, Debug)]
pub struct PerformanceRecorder {
    epsilon: Seconds,
    samples: Vec<PitchSample>,
    last_seen: Option<Seconds>,
    onset_open: bool,
}

impl PerformanceRecorder {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_JITTER_EPSILON)
    }

    pub fn with_epsilon(epsilon: Seconds) -> Self {
        Self {
            epsilon: epsilon.abs(),
            samples: Vec::new(),
            last_seen: None,
            onset_open: false,
        }
    }

    pub fn set_epsilon(&mut self, epsilon: Seconds) {
        self.epsilon = epsilon.abs();
    }

    pub fn add_pitch(&mut self, midi: f64, time: Seconds) {
        let previous_time = self.last_seen.replace(time);
        let within_jitter = previous_time.is_some_and(|prev| (prev - time).abs() <= self.epsilon);
        if !within_jitter {
            self.onset_open = false;
        }

        let Some(last) = self.samples.last_mut() else {
            self.samples.push(PitchSample { midi, time });
            self.onset_open = true;
            return;
        };

        if same_pitch(last.midi, midi) {
            return;
        }

        if within_jitter && self.onset_open {
            last.midi = midi;
        } else {
            self.samples.push(PitchSample { midi, time });
            self.onset_open = true;
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_seen = None;
        self.onset_open = false;
    }

    pub fn samples(&self) -> &[PitchSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for PerformanceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn same_pitch(a: f64, b: f64) -> bool {
    let silent_a = a < 0.0;
    let silent_b = b < 0.0;
    if silent_a || silent_b {
        return silent_a == silent_b;
    }
    a.round() == b.round()
}
