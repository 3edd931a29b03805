use serde::{Deserialize, Serialize};
use tma_ports::types::Seconds;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageTurn {
    /// Index of the section now on screen.
    pub section: usize,
    /// First bar shown on the new page.
    pub start_bar: u32,
}

/// Follows playback through the page sections of the loaded score.
#[derive(Clone, Debug, Default)]
pub struct PageWatcher {
    sections: Vec<Seconds>,
    first_bar: u32,
    bars_per_page: u32,
    section: usize,
    elapsed: Seconds,
    start_bar: u32,
}

impl PageWatcher {
    pub fn new(sections: Vec<Seconds>, first_bar: u32, bars_per_page: u32) -> Self {
        Self {
            sections,
            first_bar,
            bars_per_page,
            section: 0,
            elapsed: 0.0,
            start_bar: first_bar,
        }
    }

    pub fn reset(&mut self) {
        self.section = 0;
        self.elapsed = 0.0;
        self.start_bar = self.first_bar;
    }

    pub fn section(&self) -> usize {
        self.section
    }

    pub fn start_bar(&self) -> u32 {
        self.start_bar
    }

    pub fn sections(&self) -> &[Seconds] {
        &self.sections
    }

    /// Turns at most one page per call and never past the last section.
    pub fn observe(&mut self, playback_time: Seconds) -> Option<PageTurn> {
        let length = *self.sections.get(self.section)?;
        if playback_time <= self.elapsed + length || self.section + 1 >= self.sections.len() {
            return None;
        }
        self.elapsed += length;
        self.section += 1;
        // The last bar of a page is repeated as the first of the next.
        self.start_bar += self.bars_per_page.saturating_sub(1).max(1);
        Some(PageTurn {
            section: self.section,
            start_bar: self.start_bar,
        })
    }
}
