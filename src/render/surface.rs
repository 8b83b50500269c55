//! Raster surface state: dimensions, pointer tracking, parallax backdrop.

use egui::{pos2, vec2, Color32, Painter, Rect, Stroke, Vec2};

const BACKGROUND: Color32 = Color32::from_rgb(16, 18, 24);
const GRID_SPACING: f32 = 28.0;
const MAJOR_EVERY: usize = 5;
/// Pixels of grid shift per half-surface of pointer travel.
const PARALLAX_STRENGTH: f32 = 14.0;
/// Fraction of line opacity lost at the surface edge.
const EDGE_FADE: f32 = 0.55;

/// Owns the surface dimensions and the normalized pointer position driving
/// the parallax backdrop. Redraws get a fresh background every frame.
pub struct RenderSurface {
    width: f32,
    height: f32,
    pointer: Vec2,
}

impl RenderSurface {
    pub fn new(width: f32, height: f32) -> Self {
        let mut surface = Self {
            width: 0.0,
            height: 0.0,
            pointer: vec2(0.5, 0.5),
        };
        surface.resize(width, height);
        surface
    }

    /// Update stored dimensions. Idempotent; nothing else changes.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = if width.is_finite() { width.max(1.0) } else { 1.0 };
        self.height = if height.is_finite() { height.max(1.0) } else { 1.0 };
    }

    /// Track the pointer in normalized [0, 1]^2 coordinates; `None` means no
    /// pointer signal, which recenters the parallax.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = match pointer {
            Some(p) => vec2(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0)),
            None => vec2(0.5, 0.5),
        };
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }

    /// Fill the backdrop and draw the two-tier grid, shifted by the pointer
    /// parallax, line opacity fading toward the surface edges.
    pub fn draw_background(&self, painter: &Painter, rect: Rect) {
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let offset = (self.pointer - vec2(0.5, 0.5)) * PARALLAX_STRENGTH;
        let cols = (rect.width() / GRID_SPACING).ceil() as isize + 1;
        for i in -1..cols {
            let x = rect.left() + i as f32 * GRID_SPACING + offset.x;
            if x < rect.left() || x > rect.right() {
                continue;
            }
            let fade = ((x - rect.center().x).abs() / (rect.width() * 0.5)).min(1.0);
            painter.line_segment(
                [pos2(x, rect.top()), pos2(x, rect.bottom())],
                grid_stroke(i, fade),
            );
        }
        let rows = (rect.height() / GRID_SPACING).ceil() as isize + 1;
        for i in -1..rows {
            let y = rect.top() + i as f32 * GRID_SPACING + offset.y;
            if y < rect.top() || y > rect.bottom() {
                continue;
            }
            let fade = ((y - rect.center().y).abs() / (rect.height() * 0.5)).min(1.0);
            painter.line_segment(
                [pos2(rect.left(), y), pos2(rect.right(), y)],
                grid_stroke(i, fade),
            );
        }
    }
}

fn grid_stroke(index: isize, fade: f32) -> Stroke {
    let major = index.rem_euclid(MAJOR_EVERY as isize) == 0;
    let base = if major { 64.0 } else { 30.0 };
    let alpha = (base * (1.0 - EDGE_FADE * fade)) as u8;
    Stroke::new(
        if major { 1.0 } else { 0.5 },
        Color32::from_rgba_unmultiplied(96, 112, 132, alpha),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_defaults_to_center() {
        let surface = RenderSurface::new(800.0, 600.0);
        assert_eq!(surface.pointer(), vec2(0.5, 0.5));
    }

    #[test]
    fn pointer_is_clamped_and_resettable() {
        let mut surface = RenderSurface::new(800.0, 600.0);
        surface.set_pointer(Some(vec2(1.7, -0.3)));
        assert_eq!(surface.pointer(), vec2(1.0, 0.0));
        surface.set_pointer(None);
        assert_eq!(surface.pointer(), vec2(0.5, 0.5));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut surface = RenderSurface::new(800.0, 600.0);
        surface.resize(1024.0, 768.0);
        let first = surface.size();
        surface.resize(1024.0, 768.0);
        assert_eq!(surface.size(), first);
        assert_eq!(first, vec2(1024.0, 768.0));
    }

    #[test]
    fn resize_rejects_degenerate_dimensions() {
        let mut surface = RenderSurface::new(f32::NAN, -5.0);
        assert_eq!(surface.size(), vec2(1.0, 1.0));
        surface.resize(0.0, f32::INFINITY);
        assert_eq!(surface.size(), vec2(1.0, 1.0));
    }
}
