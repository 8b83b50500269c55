//! End-to-end pipeline checks for the canonical scene: one positive charge
//! in the middle of a 400x400 surface. Exercises sampling, contour
//! extraction, field-line tracing, and flow seeding together, the same way
//! a frame does.

use egui::pos2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use fieldscope::physics::ChargeSystem;
use fieldscope::render::contour::{compute_contours, ScalarGrid, DEFAULT_LEVEL_COUNT};
use fieldscope::render::flow::FlowParticleSystem;

const SURFACE: f32 = 400.0;
const RESOLUTION: f32 = 8.0;

fn centered_charge() -> ChargeSystem {
    let mut sys = ChargeSystem::new();
    sys.add(SURFACE * 0.5, SURFACE * 0.5, 1.0);
    sys
}

fn mean_distance_to_center(segments: &[fieldscope::render::contour::ContourSegment]) -> f32 {
    let center = pos2(SURFACE * 0.5, SURFACE * 0.5);
    let total: f32 = segments
        .iter()
        .map(|s| {
            let mid = s.a + (s.b - s.a) * 0.5;
            (mid - center).length()
        })
        .sum();
    total / segments.len() as f32
}

#[test]
fn contour_rings_shrink_toward_the_charge() {
    let sys = centered_charge();
    let grid = ScalarGrid::sample(SURFACE, SURFACE, RESOLUTION, |x, y| sys.potential_at(x, y));
    let bands = compute_contours(&grid, DEFAULT_LEVEL_COUNT);

    assert_eq!(bands.len(), DEFAULT_LEVEL_COUNT - 1);
    for band in &bands {
        assert!(!band.segments.is_empty(), "level {} is empty", band.level);
        assert!(band.normalized > 0.0 && band.normalized < 1.0);
    }
    for pair in bands.windows(2) {
        assert!(pair[0].level < pair[1].level);
        assert!(pair[0].normalized < pair[1].normalized);
    }

    // The potential falls off with distance, so higher levels sit on
    // tighter rings around the charge.
    let radii: Vec<f32> = bands
        .iter()
        .map(|b| mean_distance_to_center(&b.segments))
        .collect();
    for pair in radii.windows(2) {
        assert!(
            pair[1] < pair[0],
            "ring radii should shrink: {} then {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn traced_lines_drive_the_flow_layer() {
    let sys = centered_charge();
    let lines = sys.trace_field_lines(SURFACE, SURFACE);
    assert!(!lines.is_empty());
    assert!(lines.iter().all(|l| l.from_positive));

    let mut flow = FlowParticleSystem::new();
    flow.seed(lines, &mut StdRng::seed_from_u64(11));
    assert!(flow.particle_count() > 0);

    flow.advance(0.4);
    let center = pos2(SURFACE * 0.5, SURFACE * 0.5);
    for point in flow.draw_points() {
        // Lines seed on a ring outside the glyph and run outward, so every
        // interpolated particle stays off the charge and near the surface.
        assert!((point.position - center).length() > 10.0);
        assert!(point.position.x > -60.0 && point.position.x < SURFACE + 60.0);
        assert!(point.position.y > -60.0 && point.position.y < SURFACE + 60.0);
        assert!((point.direction.length() - 1.0).abs() < 1e-3);
        assert!(point.from_positive);
    }
}

#[test]
fn pipeline_is_deterministic_for_a_fixed_seed() {
    let run = || {
        let sys = centered_charge();
        let grid = ScalarGrid::sample(SURFACE, SURFACE, RESOLUTION, |x, y| {
            sys.potential_at(x, y)
        });
        let bands = compute_contours(&grid, DEFAULT_LEVEL_COUNT);

        let mut flow = FlowParticleSystem::new();
        flow.seed(sys.trace_field_lines(SURFACE, SURFACE), &mut StdRng::seed_from_u64(42));
        flow.advance(1.0 / 60.0);

        let segments: Vec<_> = bands.into_iter().flat_map(|b| b.segments).collect();
        let points: Vec<_> = flow
            .draw_points()
            .into_iter()
            .map(|p| (p.position, p.direction))
            .collect();
        (segments, points)
    };

    let (seg_a, pts_a) = run();
    let (seg_b, pts_b) = run();
    assert_eq!(seg_a, seg_b);
    assert_eq!(pts_a, pts_b);
}
