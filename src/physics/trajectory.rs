//! Charged tracer particles pushed through the sampled field, each keeping
//! a bounded position history for its trail.

use egui::{Pos2, Vec2};

const MAX_HISTORY: usize = 120;
/// Acceleration per unit field on a unit charge, in px/s^2.
const MOBILITY: f32 = 60.0;
/// Speed cap; near-core fields would otherwise fling tracers off-screen in
/// a single frame.
const MAX_SPEED: f32 = 420.0;

pub struct Tracer {
    pub position: Pos2,
    pub velocity: Vec2,
    pub charge: f32,
    history: Vec<Pos2>,
}

impl Tracer {
    pub fn new(position: Pos2, velocity: Vec2, charge: f32) -> Self {
        Self {
            position,
            velocity,
            charge,
            history: vec![position],
        }
    }

    /// Semi-implicit Euler step through the local field vector.
    pub fn step(&mut self, field: Vec2, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, 0.1) } else { 0.0 };
        self.velocity += field * (self.charge * MOBILITY * dt);
        let speed = self.velocity.length();
        if speed > MAX_SPEED {
            self.velocity *= MAX_SPEED / speed;
        }
        self.position += self.velocity * dt;
        if self.history.len() >= MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(self.position);
    }

    /// Ordered positions, oldest first.
    pub fn trail(&self) -> &[Pos2] {
        &self.history
    }

    pub fn in_bounds(&self, width: f32, height: f32, margin: f32) -> bool {
        self.position.x >= -margin
            && self.position.x <= width + margin
            && self.position.y >= -margin
            && self.position.y <= height + margin
    }
}
