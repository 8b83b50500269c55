//! Iso-contour extraction over a sampled scalar field (marching squares).
//!
//! The grid is rebuilt every time contours are requested; callers that know
//! their field is static may cache the `ScalarGrid` themselves.

use egui::{pos2, Pos2};
use rayon::prelude::*;

/// Samples are clamped into this range at construction; non-finite samples
/// become 0.
const SAMPLE_LIMIT: f32 = 1.0e6;

/// Default number of contour bands; the engine emits `N - 1` interior levels.
pub const DEFAULT_LEVEL_COUNT: usize = 12;

/// Row-major grid of scalar samples in surface pixel coordinates.
/// Sample `(row, col)` sits at `(col * resolution, row * resolution)`,
/// row 0 at the top of the surface.
pub struct ScalarGrid {
    values: Vec<f32>,
    rows: usize,
    cols: usize,
    resolution: f32,
}

impl ScalarGrid {
    /// Sample `field` on a lattice covering `width x height` pixels at
    /// `resolution` pixels per cell. Rows are filled in parallel.
    pub fn sample<F>(width: f32, height: f32, resolution: f32, field: F) -> Self
    where
        F: Fn(f32, f32) -> f32 + Sync,
    {
        let resolution = if resolution.is_finite() && resolution > 0.0 {
            resolution
        } else {
            1.0
        };
        let rows = (height / resolution).ceil().max(0.0) as usize;
        let cols = (width / resolution).ceil().max(0.0) as usize;
        let mut values = vec![0.0f32; rows * cols];
        values
            .par_chunks_mut(cols.max(1))
            .enumerate()
            .for_each(|(row, out)| {
                let y = row as f32 * resolution;
                for (col, v) in out.iter_mut().enumerate() {
                    *v = clamp_sample(field(col as f32 * resolution, y));
                }
            });
        Self {
            values,
            rows,
            cols,
            resolution,
        }
    }

    /// Build a grid from prepared row-major values (`values.len()` must be a
    /// multiple of `cols`; trailing leftovers are dropped).
    pub fn from_values(cols: usize, resolution: f32, mut values: Vec<f32>) -> Self {
        let rows = if cols == 0 { 0 } else { values.len() / cols };
        values.truncate(rows * cols);
        for v in &mut values {
            *v = clamp_sample(*v);
        }
        Self {
            values,
            rows,
            cols,
            resolution: if resolution.is_finite() && resolution > 0.0 {
                resolution
            } else {
                1.0
            },
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn value(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    /// Pixel position of a sample.
    pub fn point(&self, row: usize, col: usize) -> Pos2 {
        pos2(col as f32 * self.resolution, row as f32 * self.resolution)
    }

    /// Observed (min, max) over all samples, `None` for an empty grid.
    pub fn extent(&self) -> Option<(f32, f32)> {
        let first = *self.values.first()?;
        let mut min_v = first;
        let mut max_v = first;
        for &v in &self.values {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        Some((min_v, max_v))
    }
}

fn clamp_sample(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-SAMPLE_LIMIT, SAMPLE_LIMIT)
    } else {
        0.0
    }
}

/// One line segment of an iso-contour, in surface pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourSegment {
    pub a: Pos2,
    pub b: Pos2,
}

/// All segments extracted for one iso-level. `normalized` is the level's
/// position inside the grid's value range, for colormap lookup.
pub struct LevelContours {
    pub level: f32,
    pub normalized: f32,
    pub segments: Vec<ContourSegment>,
}

/// Cell corner numbering and the 4-bit topology code:
///   bit 0 (1) = bottom-left, bit 1 (2) = bottom-right,
///   bit 2 (4) = top-right,   bit 3 (8) = top-left,
/// a bit is set iff the corner value is >= the level. With row 0 at the top
/// of the surface, the "bottom" corners of cell (r, c) are the samples of
/// row r + 1. Edges: 0 = bottom, 1 = right, 2 = top, 3 = left.
///
/// Each entry lists the edge pairs to connect. Entries 5 and 10 are the
/// ambiguous saddles; their diagonals are fixed here and must not be
/// replaced by an adaptive midpoint test.
const SEGMENT_TABLE: [&[(usize, usize)]; 16] = [
    &[],                 // 0000
    &[(3, 0)],           // 0001 BL
    &[(0, 1)],           // 0010 BR
    &[(3, 1)],           // 0011 BL BR
    &[(1, 2)],           // 0100 TR
    &[(3, 2), (0, 1)],   // 0101 BL TR (saddle)
    &[(0, 2)],           // 0110 BR TR
    &[(3, 2)],           // 0111 BL BR TR
    &[(3, 2)],           // 1000 TL
    &[(0, 2)],           // 1001 BL TL
    &[(0, 1), (3, 2)],   // 1010 BR TL (saddle)
    &[(1, 2)],           // 1011 BL BR TL
    &[(3, 1)],           // 1100 TR TL
    &[(0, 1)],           // 1101 BL TR TL
    &[(3, 0)],           // 1110 BR TR TL
    &[],                 // 1111
];

/// Corner index pairs per edge, matching the numbering above.
const EDGE_CORNERS: [(usize, usize); 4] = [(0, 1), (1, 2), (2, 3), (3, 0)];

/// Extract iso-contours for `level_count - 1` evenly spaced interior levels,
/// ordered by ascending level. Degenerate inputs (grids smaller than 2x2
/// samples, flat fields) yield an empty result.
pub fn compute_contours(grid: &ScalarGrid, level_count: usize) -> Vec<LevelContours> {
    if grid.rows() < 2 || grid.cols() < 2 {
        return Vec::new();
    }
    let Some((min_v, max_v)) = grid.extent() else {
        return Vec::new();
    };
    if min_v == max_v {
        return Vec::new();
    }
    interior_levels(min_v, max_v, level_count)
        .into_iter()
        .map(|level| LevelContours {
            level,
            normalized: (level - min_v) / (max_v - min_v),
            segments: march(grid, level),
        })
        .collect()
}

/// `count - 1` levels strictly between `min_v` and `max_v`.
fn interior_levels(min_v: f32, max_v: f32, count: usize) -> Vec<f32> {
    (1..count)
        .map(|i| min_v + (max_v - min_v) * i as f32 / count as f32)
        .collect()
}

/// March all cells for one level, rows then columns, so segment order is
/// deterministic. Point-degenerate segments (a contour grazing a single
/// corner) are dropped.
fn march(grid: &ScalarGrid, level: f32) -> Vec<ContourSegment> {
    let mut out = Vec::new();
    for row in 0..grid.rows() - 1 {
        for col in 0..grid.cols() - 1 {
            let corners = [
                grid.point(row + 1, col),
                grid.point(row + 1, col + 1),
                grid.point(row, col + 1),
                grid.point(row, col),
            ];
            let values = [
                grid.value(row + 1, col),
                grid.value(row + 1, col + 1),
                grid.value(row, col + 1),
                grid.value(row, col),
            ];
            let case = (values[0] >= level) as usize
                | ((values[1] >= level) as usize) << 1
                | ((values[2] >= level) as usize) << 2
                | ((values[3] >= level) as usize) << 3;
            for &(edge_a, edge_b) in SEGMENT_TABLE[case] {
                let a = interpolate_edge(edge_a, &corners, &values, level);
                let b = interpolate_edge(edge_b, &corners, &values, level);
                if a != b {
                    out.push(ContourSegment { a, b });
                }
            }
        }
    }
    out
}

/// Crossing point on a cell edge. A zero denominator falls back to t = 1.
fn interpolate_edge(edge: usize, corners: &[Pos2; 4], values: &[f32; 4], level: f32) -> Pos2 {
    let (ai, bi) = EDGE_CORNERS[edge];
    let (a, b) = (corners[ai], corners[bi]);
    let (va, vb) = (values[ai], values[bi]);
    let denom = vb - va;
    let t = if denom == 0.0 {
        1.0
    } else {
        ((level - va) / denom).clamp(0.0, 1.0)
    };
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radial_grid(n: usize) -> ScalarGrid {
        let c = (n as f32 - 1.0) / 2.0;
        let values = (0..n * n)
            .map(|i| {
                let (row, col) = (i / n, i % n);
                let (dx, dy) = (col as f32 - c, row as f32 - c);
                -(dx * dx + dy * dy).sqrt()
            })
            .collect();
        ScalarGrid::from_values(n, 1.0, values)
    }

    #[test]
    fn table_entries_bounded() {
        assert!(SEGMENT_TABLE[0].is_empty());
        assert!(SEGMENT_TABLE[15].is_empty());
        for entry in SEGMENT_TABLE {
            assert!(entry.len() <= 2);
        }
        assert_eq!(SEGMENT_TABLE[5].len(), 2);
        assert_eq!(SEGMENT_TABLE[10].len(), 2);
    }

    #[test]
    fn flat_grid_yields_nothing() {
        let grid = ScalarGrid::from_values(4, 1.0, vec![3.5; 16]);
        for count in [1, 2, 12] {
            assert!(compute_contours(&grid, count).is_empty());
        }
    }

    #[test]
    fn undersized_grid_yields_nothing() {
        let row = ScalarGrid::from_values(5, 1.0, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(compute_contours(&row, 12).is_empty());

        let empty = ScalarGrid::from_values(0, 1.0, Vec::new());
        assert!(compute_contours(&empty, 12).is_empty());
    }

    #[test]
    fn default_count_emits_eleven_interior_levels() {
        let bands = compute_contours(&radial_grid(9), DEFAULT_LEVEL_COUNT);
        assert_eq!(bands.len(), 11);
        let (min_v, max_v) = radial_grid(9).extent().unwrap();
        for pair in bands.windows(2) {
            assert!(pair[0].level < pair[1].level);
        }
        for band in &bands {
            assert!(band.level > min_v && band.level < max_v);
            assert!(band.normalized > 0.0 && band.normalized < 1.0);
            assert!(!band.segments.is_empty());
        }
    }

    #[test]
    fn no_zero_length_segments() {
        for band in compute_contours(&radial_grid(11), 12) {
            for seg in &band.segments {
                assert_ne!(seg.a, seg.b);
            }
        }
        // A corner sitting exactly on a level would collapse both edge
        // crossings onto that corner; the survivors must still be proper
        // segments and the level must not vanish entirely.
        let grid = ScalarGrid::from_values(2, 1.0, vec![0.0, 0.0, 0.5, 0.0, 1.0, 0.0]);
        let bands = compute_contours(&grid, 2);
        assert_eq!(bands.len(), 1);
        assert!(!bands[0].segments.is_empty());
        for seg in &bands[0].segments {
            assert_ne!(seg.a, seg.b);
        }
    }

    #[test]
    fn saddle_cell_splits_into_two_segments() {
        // Opposite high corners on the diagonal: topology code 10.
        let grid = ScalarGrid::from_values(2, 1.0, vec![1.0, 0.0, 0.0, 1.0]);
        let bands = compute_contours(&grid, 2);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].segments.len(), 2);
    }

    #[test]
    fn samples_are_clamped() {
        let grid = ScalarGrid::from_values(2, 1.0, vec![f32::NAN, 1.0e9, -1.0e9, f32::INFINITY]);
        assert_eq!(grid.value(0, 0), 0.0);
        assert_eq!(grid.value(0, 1), 1.0e6);
        assert_eq!(grid.value(1, 0), -1.0e6);
        assert_eq!(grid.value(1, 1), 0.0);
    }

    #[test]
    fn sampled_grid_covers_surface() {
        let grid = ScalarGrid::sample(100.0, 50.0, 10.0, |x, y| x + y);
        assert_eq!(grid.cols(), 10);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.value(0, 0), 0.0);
        assert_eq!(grid.value(2, 3), 30.0 + 20.0);
        assert_eq!(grid.point(2, 3), pos2(30.0, 20.0));
    }
}
