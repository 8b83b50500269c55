//! Point-charge collaborator: softened Coulomb potential and field
//! superposition, scenario presets, and field-line tracing for the flow
//! layer.

use egui::{pos2, vec2, Pos2, Vec2};
use rand::Rng;
use serde::Serialize;

use crate::render::flow::FieldLine;

/// Coulomb constant in display units (pixels, unit charges).
const COULOMB: f32 = 2.0e4;
/// Softening radius in pixels; keeps samples finite at charge centers.
const SOFTENING: f32 = 8.0;
const LINES_PER_CHARGE: usize = 12;
/// Field lines start on a ring just outside the charge glyph.
const SEED_RADIUS: f32 = 14.0;
const TRACE_STEP: f32 = 4.0;
const TRACE_MAX_STEPS: usize = 400;
/// A line entering this radius around an opposite charge terminates.
const CAPTURE_RADIUS: f32 = 10.0;
/// Lines may run this far past the surface before being cut.
const TRACE_MARGIN: f32 = 40.0;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PointCharge {
    pub x: f32,
    pub y: f32,
    pub charge: f32,
}

impl PointCharge {
    pub fn position(&self) -> Pos2 {
        pos2(self.x, self.y)
    }
}

/// Canned charge arrangements reachable from the control panel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Preset {
    Single,
    Dipole,
    Quadrupole,
    Random,
}

#[derive(Default)]
pub struct ChargeSystem {
    charges: Vec<PointCharge>,
}

impl ChargeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charges(&self) -> &[PointCharge] {
        &self.charges
    }

    pub fn len(&self) -> usize {
        self.charges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    pub fn add(&mut self, x: f32, y: f32, charge: f32) {
        self.charges.push(PointCharge { x, y, charge });
    }

    pub fn clear(&mut self) {
        self.charges.clear();
    }

    /// Electrostatic potential at a point, summed over all charges.
    pub fn potential_at(&self, x: f32, y: f32) -> f32 {
        let soft2 = SOFTENING * SOFTENING;
        self.charges
            .iter()
            .map(|c| {
                let (dx, dy) = (x - c.x, y - c.y);
                COULOMB * c.charge / (dx * dx + dy * dy + soft2).sqrt()
            })
            .sum()
    }

    /// Field vector at a point, summed over all charges.
    pub fn field_at(&self, x: f32, y: f32) -> Vec2 {
        let soft2 = SOFTENING * SOFTENING;
        let mut e = Vec2::ZERO;
        for c in &self.charges {
            let dx = x - c.x;
            let dy = y - c.y;
            let r2 = dx * dx + dy * dy + soft2;
            let s = COULOMB * c.charge / (r2 * r2.sqrt());
            e += vec2(s * dx, s * dy);
        }
        e
    }

    pub fn load_preset<R: Rng>(&mut self, preset: Preset, width: f32, height: f32, rng: &mut R) {
        let (cx, cy) = (width * 0.5, height * 0.5);
        self.charges.clear();
        match preset {
            Preset::Single => self.add(cx, cy, 1.0),
            Preset::Dipole => {
                let dx = width * 0.15;
                self.add(cx - dx, cy, 1.0);
                self.add(cx + dx, cy, -1.0);
            }
            Preset::Quadrupole => {
                let (dx, dy) = (width * 0.12, height * 0.12);
                self.add(cx - dx, cy - dy, 1.0);
                self.add(cx + dx, cy - dy, -1.0);
                self.add(cx + dx, cy + dy, 1.0);
                self.add(cx - dx, cy + dy, -1.0);
            }
            Preset::Random => {
                for _ in 0..rng.gen_range(3..=6) {
                    let x = rng.gen_range(0.15..0.85) * width;
                    let y = rng.gen_range(0.15..0.85) * height;
                    let q = rng.gen_range(0.5..1.5) * if rng.gen::<bool>() { 1.0 } else { -1.0 };
                    self.add(x, y, q);
                }
            }
        }
    }

    /// Trace field-line polylines from a seed ring around every charge,
    /// following the field out of positive sources and against it out of
    /// negative ones. A trace stops at the step cap, outside the surface
    /// margin, at a stagnation point, or inside an opposite charge.
    pub fn trace_field_lines(&self, width: f32, height: f32) -> Vec<FieldLine> {
        let mut lines = Vec::new();
        for source in &self.charges {
            if source.charge == 0.0 {
                continue;
            }
            let from_positive = source.charge > 0.0;
            let sign = if from_positive { 1.0 } else { -1.0 };
            for k in 0..LINES_PER_CHARGE {
                let angle = k as f32 / LINES_PER_CHARGE as f32 * std::f32::consts::TAU;
                let mut pos = source.position() + vec2(angle.cos(), angle.sin()) * SEED_RADIUS;
                let mut points = vec![pos];
                for _ in 0..TRACE_MAX_STEPS {
                    let e = self.field_at(pos.x, pos.y);
                    let len = e.length();
                    if len < 1e-4 {
                        break;
                    }
                    pos += e * (sign * TRACE_STEP / len);
                    points.push(pos);
                    if pos.x < -TRACE_MARGIN
                        || pos.x > width + TRACE_MARGIN
                        || pos.y < -TRACE_MARGIN
                        || pos.y > height + TRACE_MARGIN
                        || self.captured(pos, source)
                    {
                        break;
                    }
                }
                if points.len() >= 2 {
                    lines.push(FieldLine {
                        points,
                        from_positive,
                    });
                }
            }
        }
        lines
    }

    fn captured(&self, pos: Pos2, source: &PointCharge) -> bool {
        self.charges.iter().any(|c| {
            c.charge.signum() != source.charge.signum()
                && (pos - c.position()).length() < CAPTURE_RADIUS
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single(cx: f32, cy: f32, q: f32) -> ChargeSystem {
        let mut sys = ChargeSystem::new();
        sys.add(cx, cy, q);
        sys
    }

    #[test]
    fn potential_decays_with_distance() {
        let sys = single(200.0, 200.0, 1.0);
        let near = sys.potential_at(230.0, 200.0);
        let far = sys.potential_at(320.0, 200.0);
        assert!(near > far);
        assert!(far > 0.0);

        let neg = single(200.0, 200.0, -1.0);
        assert!(neg.potential_at(230.0, 200.0) < 0.0);
    }

    #[test]
    fn samples_stay_finite_at_the_center() {
        let sys = single(100.0, 100.0, 2.0);
        assert!(sys.potential_at(100.0, 100.0).is_finite());
        assert!(sys.field_at(100.0, 100.0).length().is_finite());
    }

    #[test]
    fn field_points_away_from_positive_charge() {
        let sys = single(200.0, 200.0, 1.0);
        let e = sys.field_at(240.0, 200.0);
        assert!(e.x > 0.0);
        assert!(e.y.abs() < 1e-3);

        let e_up = sys.field_at(200.0, 150.0);
        assert!(e_up.y < 0.0);
    }

    #[test]
    fn dipole_potential_vanishes_on_the_midplane() {
        let mut sys = ChargeSystem::new();
        sys.add(150.0, 200.0, 1.0);
        sys.add(250.0, 200.0, -1.0);
        assert!(sys.potential_at(200.0, 120.0).abs() < 1e-3);
    }

    #[test]
    fn empty_system_samples_to_zero() {
        let sys = ChargeSystem::new();
        assert_eq!(sys.potential_at(10.0, 10.0), 0.0);
        assert_eq!(sys.field_at(10.0, 10.0), Vec2::ZERO);
    }

    #[test]
    fn traced_lines_carry_polarity_and_length() {
        let sys = single(200.0, 200.0, 1.0);
        let lines = sys.trace_field_lines(400.0, 400.0);
        assert_eq!(lines.len(), LINES_PER_CHARGE);
        for line in &lines {
            assert!(line.from_positive);
            assert!(line.points.len() >= 2);
        }
    }

    #[test]
    fn dipole_lines_terminate_at_the_sink() {
        let mut sys = ChargeSystem::new();
        sys.add(150.0, 200.0, 1.0);
        sys.add(250.0, 200.0, -1.0);
        let lines = sys.trace_field_lines(400.0, 400.0);
        let sink = pos2(250.0, 200.0);
        let reached = lines
            .iter()
            .filter(|l| l.from_positive)
            .any(|l| (*l.points.last().unwrap() - sink).length() < CAPTURE_RADIUS + TRACE_STEP);
        assert!(reached);
    }

    #[test]
    fn presets_produce_expected_charge_counts() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sys = ChargeSystem::new();

        sys.load_preset(Preset::Single, 800.0, 600.0, &mut rng);
        assert_eq!(sys.len(), 1);

        sys.load_preset(Preset::Dipole, 800.0, 600.0, &mut rng);
        assert_eq!(sys.len(), 2);
        assert_eq!(sys.charges().iter().map(|c| c.charge).sum::<f32>(), 0.0);

        sys.load_preset(Preset::Quadrupole, 800.0, 600.0, &mut rng);
        assert_eq!(sys.len(), 4);

        sys.load_preset(Preset::Random, 800.0, 600.0, &mut rng);
        assert!((3..=6).contains(&sys.len()));
        for c in sys.charges() {
            assert!(c.x > 0.0 && c.x < 800.0);
            assert!(c.y > 0.0 && c.y < 600.0);
            assert!(c.charge != 0.0);
        }
    }
}
