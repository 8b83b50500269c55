//! Animated flow particles riding precomputed field-line polylines.
//!
//! Particles are purely visual: a particle is an index into a field line
//! plus a normalized path position, nothing more. The whole pool is thrown
//! away and regrown whenever a new set of field lines arrives.

use egui::{vec2, Pos2, Vec2};
use rand::Rng;

/// Hard cap on particles spawned per field line.
const MAX_PER_LINE: usize = 8;
/// One particle is spawned per this many polyline points.
const POINTS_PER_PARTICLE: usize = 15;
/// Particle speed range, in path lengths per second.
const SPEED_RANGE: std::ops::Range<f32> = 0.3..0.7;

/// A traced field-line polyline plus the polarity of its source.
#[derive(Clone, Debug)]
pub struct FieldLine {
    pub points: Vec<Pos2>,
    pub from_positive: bool,
}

struct FlowParticle {
    line: usize,
    path_position: f32,
    speed: f32,
}

/// Interpolated per-frame draw state for one particle.
pub struct FlowPoint {
    pub position: Pos2,
    pub direction: Vec2,
    pub from_positive: bool,
}

/// Pool of flow particles bound to the current field-line set.
#[derive(Default)]
pub struct FlowParticleSystem {
    lines: Vec<FieldLine>,
    particles: Vec<FlowParticle>,
}

impl FlowParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the particle pool wholesale for a new field-line set. Lines
    /// with fewer than 2 points get no particles.
    pub fn seed<R: Rng>(&mut self, lines: Vec<FieldLine>, rng: &mut R) {
        self.lines = lines;
        self.particles.clear();
        for (index, line) in self.lines.iter().enumerate() {
            let n = line.points.len();
            if n < 2 {
                continue;
            }
            let count = n.div_ceil(POINTS_PER_PARTICLE).min(MAX_PER_LINE);
            for _ in 0..count {
                self.particles.push(FlowParticle {
                    line: index,
                    path_position: rng.gen::<f32>(),
                    speed: rng.gen_range(SPEED_RANGE),
                });
            }
        }
    }

    /// Advance every particle by the elapsed time; positions wrap into
    /// [0, 1) so the progression restarts endlessly.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for p in &mut self.particles {
            p.path_position = (p.path_position + p.speed * dt).fract();
        }
    }

    /// Interpolated position, local tangent, and polarity per particle.
    pub fn draw_points(&self) -> Vec<FlowPoint> {
        self.particles
            .iter()
            .map(|p| {
                let line = &self.lines[p.line];
                let n = line.points.len();
                let scaled = p.path_position * (n - 1) as f32;
                let idx = (scaled.floor() as usize).min(n - 2);
                let frac = scaled - idx as f32;
                let (a, b) = (line.points[idx], line.points[idx + 1]);
                let step = b - a;
                FlowPoint {
                    position: a + step * frac,
                    direction: if step.length() > 0.0 {
                        step.normalized()
                    } else {
                        vec2(1.0, 0.0)
                    },
                    from_positive: line.from_positive,
                }
            })
            .collect()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
