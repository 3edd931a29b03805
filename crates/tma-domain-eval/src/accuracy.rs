use serde::{Deserialize, Serialize};
use tma_ports::types::{MidiValue, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accuracy {
    Accurate,
    Close,
    Inaccurate,
}

impl Accuracy {
    /// Compares a detected pitch with the expected one. A rest on either side
    /// only matches nothing, so it always counts as inaccurate.
    pub fn classify(detected: MidiValue, expected: MidiValue) -> Self {
        if detected < 0 || expected < 0 {
            return Accuracy::Inaccurate;
        }
        let diff = (detected - expected).abs();
        if diff < 1 {
            Accuracy::Accurate
        } else if diff < 2 {
            Accuracy::Close
        } else {
            Accuracy::Inaccurate
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Accuracy::Accurate => Rgb::GREEN,
            Accuracy::Close => Rgb::YELLOW,
            Accuracy::Inaccurate => Rgb::RED,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub accurate: u32,
    pub close: u32,
    pub inaccurate: u32,
}

impl AccuracyStats {
    pub fn record(&mut self, accuracy: Accuracy) {
        match accuracy {
            Accuracy::Accurate => self.accurate += 1,
            Accuracy::Close => self.close += 1,
            Accuracy::Inaccurate => self.inaccurate += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.accurate + self.close + self.inaccurate
    }

    /// Share of accurate frames, 0.0 before anything was judged.
    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => f64::from(self.accurate) / f64::from(total),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rests_are_inaccurate() {
        assert_eq!(Accuracy::classify(-1, 60), Accuracy::Inaccurate);
        assert_eq!(Accuracy::classify(60, -1), Accuracy::Inaccurate);
        assert_eq!(Accuracy::classify(-1, -1), Accuracy::Inaccurate);
    }

    #[test]
    fn stats_ratio() {
        let mut stats = AccuracyStats::default();
        assert_eq!(stats.ratio(), 0.0);
        stats.record(Accuracy::Accurate);
        stats.record(Accuracy::Close);
        stats.record(Accuracy::Accurate);
        stats.record(Accuracy::Inaccurate);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.ratio(), 0.5);
        stats.reset();
        assert_eq!(stats.total(), 0);
    }
}
