//! 1D FDTD wave collaborator: staggered electric/magnetic leapfrog update
//! over a material (relative permittivity) profile, driven by a sinusoidal
//! soft source at one cell. Both ends are reflecting walls.

/// Internal update step; `step(dt)` runs as many of these as the frame
/// time covers.
const BASE_DT: f32 = 1.0 / 240.0;
/// Courant number of the normalized update, kept below 1 for stability.
const COURANT: f32 = 0.5;
const SOURCE_AMPLITUDE: f32 = 0.7;
const MIN_CELLS: usize = 16;
const MAX_SUBSTEPS: usize = 16;

pub struct WaveField {
    ey: Vec<f32>,
    hz: Vec<f32>,
    eps: Vec<f32>,
    source_cell: usize,
    time: f32,
    pub frequency: f32,
}

impl WaveField {
    pub fn new(cells: usize) -> Self {
        let n = cells.max(MIN_CELLS);
        Self {
            ey: vec![0.0; n],
            hz: vec![0.0; n],
            eps: vec![1.0; n],
            source_cell: n / 5,
            time: 0.0,
            frequency: 2.0,
        }
    }

    pub fn cells(&self) -> usize {
        self.ey.len()
    }

    pub fn ey(&self) -> &[f32] {
        &self.ey
    }

    pub fn hz(&self) -> &[f32] {
        &self.hz
    }

    pub fn material(&self) -> &[f32] {
        &self.eps
    }

    pub fn source_cell(&self) -> usize {
        self.source_cell
    }

    /// Advance the leapfrog update by the elapsed frame time.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, 0.1) } else { 0.0 };
        let substeps = ((dt / BASE_DT).round() as usize).clamp(1, MAX_SUBSTEPS);
        for _ in 0..substeps {
            self.update();
        }
    }

    fn update(&mut self) {
        let n = self.ey.len();
        for i in 0..n - 1 {
            self.hz[i] += COURANT * (self.ey[i + 1] - self.ey[i]);
        }
        for i in 1..n - 1 {
            self.ey[i] += COURANT / self.eps[i] * (self.hz[i] - self.hz[i - 1]);
        }
        self.time += BASE_DT;
        let drive = std::f32::consts::TAU * self.frequency * self.time;
        self.ey[self.source_cell] += SOURCE_AMPLITUDE * drive.sin();
    }

    /// Fill one slab of the material profile with `eps` (floored at vacuum),
    /// vacuum everywhere else. Fractions are of the total cell count.
    pub fn set_slab(&mut self, start_frac: f32, end_frac: f32, eps: f32) {
        let n = self.eps.len();
        let start = ((start_frac.clamp(0.0, 1.0)) * n as f32) as usize;
        let end = ((end_frac.clamp(0.0, 1.0)) * n as f32) as usize;
        for (i, cell) in self.eps.iter_mut().enumerate() {
            *cell = if i >= start && i < end { eps.max(1.0) } else { 1.0 };
        }
    }

    /// Total field energy, for the history chart.
    pub fn energy(&self) -> f32 {
        self.ey
            .iter()
            .zip(&self.eps)
            .map(|(e, eps)| 0.5 * eps * e * e)
            .sum::<f32>()
            + self.hz.iter().map(|h| 0.5 * h * h).sum::<f32>()
    }

    pub fn reset(&mut self) {
        self.ey.fill(0.0);
        self.hz.fill(0.0);
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_stays_finite_with_a_slab() {
        let mut wave = WaveField::new(200);
        wave.set_slab(0.6, 0.8, 3.0);
        for _ in 0..500 {
            wave.step(1.0 / 60.0);
        }
        assert!(wave.ey().iter().all(|v| v.is_finite()));
        assert!(wave.hz().iter().all(|v| v.is_finite()));
        assert!(wave.energy().is_finite());
    }

    #[test]
    fn source_injects_energy() {
        let mut wave = WaveField::new(128);
        assert_eq!(wave.energy(), 0.0);
        for _ in 0..30 {
            wave.step(1.0 / 60.0);
        }
        assert!(wave.energy() > 0.0);
    }

    #[test]
    fn wave_propagates_past_the_source() {
        let mut wave = WaveField::new(128);
        let probe = wave.source_cell() + 20;
        let mut peak = 0.0f32;
        for _ in 0..240 {
            wave.step(1.0 / 60.0);
            peak = peak.max(wave.ey()[probe].abs());
        }
        assert!(peak > 0.01);
    }

    #[test]
    fn material_is_floored_at_vacuum() {
        let mut wave = WaveField::new(100);
        wave.set_slab(0.5, 0.7, 0.2);
        assert!(wave.material().iter().all(|&e| e >= 1.0));

        wave.set_slab(0.5, 0.7, 2.5);
        assert_eq!(wave.material()[55], 2.5);
        assert_eq!(wave.material()[10], 1.0);
    }

    #[test]
    fn reset_clears_the_fields() {
        let mut wave = WaveField::new(64);
        for _ in 0..20 {
            wave.step(1.0 / 60.0);
        }
        wave.reset();
        assert_eq!(wave.energy(), 0.0);
        assert!(wave.ey().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn tiny_requested_grids_are_padded() {
        let wave = WaveField::new(2);
        assert_eq!(wave.cells(), MIN_CELLS);
        assert!(wave.source_cell() < wave.cells());
    }
}
