use crate::types::*;

/// Overlay drawing primitives. The core never lays out the score itself; it only
/// issues these calls on top of whatever the score renderer produced.
///
/// Called from the frame loop only, never concurrently with itself.
pub trait DrawSurface {
    /// Wipe the whole overlay (mode transitions, page turns).
    fn clear(&mut self);

    /// Paint a rectangle with the overlay background.
    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    fn fill_ellipse(&mut self, center_x: Px, center_y: Px, width: Px, height: Px, color: Rgb);

    fn stroke_line(&mut self, from: (Px, Px), to: (Px, Px), color: Rgb, weight: f32);

    fn text(&mut self, glyph: &str, x: Px, y: Px, color: Rgb);
}
