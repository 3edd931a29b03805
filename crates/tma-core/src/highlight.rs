use serde::{Deserialize, Serialize};
use tma_ports::score::MeasureMarker;
use tma_ports::surface::DrawSurface;
use tma_ports::types::{Px, Rect, Rgb};

/// Measures of one rendered staff row, selectable as an exercise range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MusicSection {
    pub start_measure: u32,
    pub end_measure: u32,
    /// Horizontal offset added to the row's marker positions.
    pub base_x: Px,
}

/// Progressively shades measures as the renderer lays out their barlines.
///
/// Only bars not yet shaded are drawn on each frame.
#[derive(Clone, Debug, Default)]
pub struct MeasureHighlighter {
    latest_drawn: Option<usize>,
    base_x: Px,
    current: Option<MusicSection>,
    sections: Vec<MusicSection>,
}

impl MeasureHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed rows so far.
    pub fn sections(&self) -> &[MusicSection] {
        &self.sections
    }

    pub fn current_section(&self) -> Option<MusicSection> {
        self.current
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns how many rows were completed by this frame.
    pub fn draw(
        &mut self,
        surface: &mut dyn DrawSurface,
        first_bar: Option<Rect>,
        markers: &[MeasureMarker],
        line_spacing: Px,
    ) -> usize {
        let bar_height = line_spacing * 4.0;
        let Some(mut latest) = self.latest_drawn else {
            // Nothing can be drawn until the renderer placed both the first bar
            // and its closing barline.
            let (Some(first), Some(closing)) = (first_bar, markers.first()) else {
                return 0;
            };
            if !first.x.is_finite() {
                return 0;
            }
            surface.fill_rect(
                Rect {
                    x: first.x,
                    y: first.y + line_spacing,
                    width: closing.x - first.x,
                    height: bar_height,
                },
                Rgb::GREEN,
            );
            self.latest_drawn = Some(0);
            self.current = Some(MusicSection {
                start_measure: 1,
                end_measure: 1,
                base_x: 0.0,
            });
            return 0;
        };

        let completed_before = self.sections.len();
        while latest + 1 < markers.len() {
            let from = markers[latest];
            let x = from.x + self.base_x;
            latest += 1;
            let to = markers[latest];
            if from.row != to.row {
                let measure = latest as u32;
                if let Some(section) = self.current.as_mut() {
                    section.end_measure = measure;
                    self.sections.push(*section);
                    self.base_x += from.x + 1.0;
                    section.start_measure = measure;
                    section.base_x = self.base_x;
                }
            }
            let width = (to.x + self.base_x - x).abs();
            surface.fill_rect(
                Rect {
                    x,
                    y: from.y,
                    width,
                    height: bar_height,
                },
                Rgb::GREEN,
            );
        }
        self.latest_drawn = Some(latest);
        self.sections.len() - completed_before
    }
}
