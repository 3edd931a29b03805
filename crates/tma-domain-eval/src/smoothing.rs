use std::collections::VecDeque;
use tma_ports::types::{MidiValue, SILENCE};

pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_LOWER_BOUND: MidiValue = 21;
pub const DEFAULT_UPPER_BOUND: MidiValue = 127;
/// Longest window a smoother keeps; larger requests are clamped.
pub const MAX_WINDOW: usize = 64;

/// Rolling mean over the last few raw detections.
///
/// Silence enters the window as 0, so the first readings after a rest average
/// out of range and stay silent until the window fills with the new pitch.
#[derive(Clone, Debug)]
pub struct PitchSmoother {
    window: VecDeque<f64>,
    capacity: usize,
    total: f64,
    lower: MidiValue,
    upper: MidiValue,
    current: MidiValue,
}

impl PitchSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_WINDOW);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total: 0.0,
            lower: DEFAULT_LOWER_BOUND,
            upper: DEFAULT_UPPER_BOUND,
            current: SILENCE,
        }
    }

    /// Smoothed values outside `[lower, upper]` are reported as silence.
    pub fn set_bounds(&mut self, lower: MidiValue, upper: MidiValue) {
        self.lower = lower.min(upper);
        self.upper = upper.max(lower);
    }

    pub fn bounds(&self) -> (MidiValue, MidiValue) {
        (self.lower, self.upper)
    }

    /// Feed one reading (`None` for silence) and get the value to display.
    pub fn push(&mut self, midi: Option<f64>) -> MidiValue {
        let value = midi.unwrap_or(0.0);
        if self.window.len() == self.capacity {
            if let Some(oldest) = self.window.pop_front() {
                self.total -= oldest;
            }
        }
        self.window.push_back(value);
        self.total += value;

        let average = (self.total / self.window.len() as f64).round() as MidiValue;
        self.current = if midi.is_none() || average < self.lower || average > self.upper {
            SILENCE
        } else {
            average
        };
        self.current
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current(&self) -> MidiValue {
        self.current
    }

    pub fn clear(&mut self) {
        self.window.clear();
        self.total = 0.0;
        self.current = SILENCE;
    }
}

impl Default for PitchSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_and_rounds() {
        let mut smoother = PitchSmoother::new(3);
        assert_eq!(smoother.push(Some(60.2)), 60);
        assert_eq!(smoother.push(Some(61.0)), 61);
        assert_eq!(smoother.push(Some(62.0)), 61);
        // 60.2 falls out of the window.
        assert_eq!(smoother.push(Some(62.0)), 62);
    }

    #[test]
    fn silence_reading_is_silent_and_drags_the_mean() {
        let mut smoother = PitchSmoother::new(5);
        for _ in 0..5 {
            smoother.push(Some(60.0));
        }
        assert_eq!(smoother.push(None), SILENCE);
        // (60 * 3 + 0 + 60) / 5 = 48: inside default bounds.
        assert_eq!(smoother.push(Some(60.0)), 48);
    }

    #[test]
    fn out_of_bounds_mean_is_silence() {
        let mut smoother = PitchSmoother::new(2);
        smoother.set_bounds(55, 82);
        assert_eq!(smoother.push(Some(50.0)), SILENCE);
        assert_eq!(smoother.push(Some(70.0)), 60);
        assert_eq!(smoother.push(Some(100.0)), SILENCE);
        assert_eq!(smoother.bounds(), (55, 82));
    }

    #[test]
    fn window_size_is_clamped() {
        assert_eq!(PitchSmoother::new(0).capacity(), 1);
        let mut smoother = PitchSmoother::new(usize::MAX);
        assert_eq!(smoother.capacity(), MAX_WINDOW);
        assert_eq!(smoother.push(Some(60.0)), 60);
    }

    #[test]
    fn clear_empties_window() {
        let mut smoother = PitchSmoother::new(5);
        smoother.push(Some(30.0));
        smoother.clear();
        assert_eq!(smoother.current(), SILENCE);
        assert_eq!(smoother.push(Some(64.0)), 64);
    }
}
