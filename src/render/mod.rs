//! Field visualization renderer: background surface, iso-contours, flow
//! particles, and the stateless primitive layers, composed behind one facade.
//!
//! The renderer only consumes simulation data; it never mutates it. All
//! drawing happens inside the per-frame update callback, positions are in
//! surface-local pixels and translated into the canvas rect here.

pub mod colormap;
pub mod contour;
pub mod draw;
pub mod flow;
pub mod surface;

use egui::{Painter, Pos2, Rect, Vec2};
use rand::Rng;

use colormap::ColorFn;
use contour::ScalarGrid;
use flow::{FieldLine, FlowParticleSystem, FlowPoint};
use surface::RenderSurface;

/// Samples kept in the scrolling energy history.
const ENERGY_CAPACITY: usize = 240;

/// Which palette colors the contour bands.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ContourPalette {
    /// The renderer's diverging colormap.
    Diverging,
    /// Green-to-blue hue sweep.
    HueRamp,
}

/// Facade over the render components. One instance per canvas; the app
/// forwards frame time, pointer, and layer data each frame.
pub struct Renderer {
    surface: RenderSurface,
    flow: FlowParticleSystem,
    energy: Vec<f32>,
    energy_max: f32,
    pub colormap: ColorFn,
    pub palette: ContourPalette,
    /// Multiplier on flow-particle advancement.
    pub flow_speed: f32,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            surface: RenderSurface::new(width, height),
            flow: FlowParticleSystem::new(),
            energy: Vec::new(),
            energy_max: 0.0,
            colormap: colormap::diverging,
            palette: ContourPalette::Diverging,
            flow_speed: 1.0,
        }
    }

    /// Advance time-dependent visuals by the elapsed frame time.
    pub fn tick(&mut self, dt: f32) {
        self.flow.advance(dt * self.flow_speed);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface.resize(width, height);
    }

    pub fn set_pointer(&mut self, normalized: Option<Vec2>) {
        self.surface.set_pointer(normalized);
    }

    pub fn pointer(&self) -> Vec2 {
        self.surface.pointer()
    }

    /// Repaint the backdrop and parallax grid for a new frame.
    pub fn clear(&self, painter: &Painter, rect: Rect) {
        self.surface.draw_background(painter, rect);
    }

    /// Rebuild the flow-particle pool for a new field-line set.
    pub fn seed_flow<R: Rng>(&mut self, lines: Vec<FieldLine>, rng: &mut R) {
        self.flow.seed(lines, rng);
    }

    pub fn flow_particle_count(&self) -> usize {
        self.flow.particle_count()
    }

    pub fn field_line_count(&self) -> usize {
        self.flow.line_count()
    }

    /// Append one energy sample; history length is capped and the running
    /// maximum (used for chart normalization) never decays.
    pub fn push_energy(&mut self, sample: f32) {
        if !sample.is_finite() || sample < 0.0 {
            return;
        }
        self.energy_max = self.energy_max.max(sample);
        self.energy.push(sample);
        if self.energy.len() > ENERGY_CAPACITY {
            self.energy.remove(0);
        }
    }

    pub fn reset_energy(&mut self) {
        self.energy.clear();
        self.energy_max = 0.0;
    }

    /// Recorded samples, oldest first.
    pub fn energy_history(&self) -> &[f32] {
        &self.energy
    }

    pub fn draw_contours(
        &self,
        painter: &Painter,
        rect: Rect,
        grid: &ScalarGrid,
        level_count: usize,
    ) {
        let origin = rect.left_top();
        for band in contour::compute_contours(grid, level_count) {
            let base = match self.palette {
                ContourPalette::Diverging => (self.colormap)(band.normalized),
                ContourPalette::HueRamp => colormap::contour_hue(band.normalized),
            };
            let stroke = egui::Stroke::new(1.2, colormap::with_alpha(base, 165));
            for seg in &band.segments {
                painter.line_segment(
                    [origin + seg.a.to_vec2(), origin + seg.b.to_vec2()],
                    stroke,
                );
            }
        }
    }

    pub fn draw_charges(&self, painter: &Painter, rect: Rect, charges: &[(Pos2, f32)]) {
        let origin = rect.left_top();
        for &(at, q) in charges {
            draw::charge_glyph(painter, origin + at.to_vec2(), q);
        }
    }

    /// Arrows on a regular lattice, sampled through `field`.
    pub fn draw_vector_field(
        &self,
        painter: &Painter,
        rect: Rect,
        spacing: f32,
        field: &dyn Fn(Pos2) -> Vec2,
    ) {
        let spacing = if spacing.is_finite() { spacing.max(8.0) } else { 8.0 };
        let origin = rect.left_top();
        let mut y = spacing * 0.5;
        while y < rect.height() {
            let mut x = spacing * 0.5;
            while x < rect.width() {
                let local = egui::pos2(x, y);
                draw::field_arrow(painter, origin + local.to_vec2(), field(local), draw::ARROW_COLOR);
                x += spacing;
            }
            y += spacing;
        }
    }

    pub fn draw_flow_lines(&self, painter: &Painter, rect: Rect) {
        let origin = rect.left_top();
        for point in self.flow.draw_points() {
            let translated = FlowPoint {
                position: origin + point.position.to_vec2(),
                ..point
            };
            draw::flow_mark(painter, &translated);
        }
    }

    pub fn draw_wave_strip(
        &self,
        painter: &Painter,
        rect: Rect,
        ey: &[f32],
        hz: &[f32],
        material: &[f32],
        source_cell: usize,
    ) {
        draw::wave_strip(painter, rect, ey, hz, material, source_cell, self.colormap);
    }

    pub fn draw_tracer(&self, painter: &Painter, rect: Rect, trail: &[Pos2]) {
        let origin = rect.left_top();
        let translated: Vec<Pos2> = trail.iter().map(|p| origin + p.to_vec2()).collect();
        draw::particle_trail(painter, &translated, colormap::TRACER);
    }

    pub fn draw_energy_graph(&self, painter: &Painter, rect: Rect) {
        draw::energy_graph(painter, rect, &self.energy, self.energy_max, "Energy");
    }

    /// Readout box following the tracked pointer.
    pub fn draw_probe(&self, painter: &Painter, rect: Rect, potential: f32, field_mag: f32) {
        let anchor = rect.left_top() + self.pointer() * rect.size();
        draw::probe_readout(painter, rect, anchor, potential, field_mag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn energy_history_caps_and_tracks_maximum() {
        let mut r = Renderer::new(100.0, 100.0);
        for i in 0..(ENERGY_CAPACITY + 60) {
            r.push_energy(i as f32);
        }
        assert_eq!(r.energy.len(), ENERGY_CAPACITY);
        assert_eq!(r.energy_max, (ENERGY_CAPACITY + 59) as f32);

        r.reset_energy();
        assert!(r.energy.is_empty());
        assert_eq!(r.energy_max, 0.0);
    }

    #[test]
    fn energy_rejects_bad_samples() {
        let mut r = Renderer::new(100.0, 100.0);
        r.push_energy(f32::NAN);
        r.push_energy(-1.0);
        assert!(r.energy.is_empty());
    }

    #[test]
    fn facade_forwards_to_components() {
        let mut r = Renderer::new(320.0, 200.0);
        assert_eq!(r.pointer(), egui::vec2(0.5, 0.5));
        r.resize(640.0, 480.0);
        r.resize(640.0, 480.0);

        let line = FieldLine {
            points: (0..40).map(|i| egui::pos2(i as f32, 0.0)).collect(),
            from_positive: true,
        };
        r.seed_flow(vec![line], &mut StdRng::seed_from_u64(11));
        assert_eq!(r.flow_particle_count(), 3);
        assert_eq!(r.field_line_count(), 1);
        r.tick(0.016);
    }
}
