//! Stateless drawing primitives: arrows, charge glyphs, tracer trails, wave
//! strips, the energy chart, and the pointer probe readout.

use egui::{pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

use super::colormap::{self, ColorFn};
use super::flow::FlowPoint;

/// Display length cap for field arrows, in pixels.
const MAX_ARROW_LEN: f32 = 22.0;
/// Pixels of arrow per unit of field magnitude, below the cap.
const ARROW_GAIN: f32 = 8.0;
const CHART_LINE: Color32 = Color32::from_rgb(110, 230, 130);
const SLAB_TINT: Color32 = Color32::from_rgb(150, 180, 255);
/// Field arrow color.
pub const ARROW_COLOR: Color32 = Color32::from_rgb(186, 194, 208);

/// Screen vector for a field sample: direction kept, length clamped so
/// strong near-charge fields cannot paint arbitrarily long arrows.
pub fn arrow_vector(field: Vec2) -> Vec2 {
    let len = field.length();
    if len <= 0.0 || !len.is_finite() {
        return Vec2::ZERO;
    }
    field * ((len * ARROW_GAIN).min(MAX_ARROW_LEN) / len)
}

/// One directional field arrow with two barbs at the tip.
pub fn field_arrow(painter: &Painter, at: Pos2, field: Vec2, color: Color32) {
    let shaft = arrow_vector(field);
    if shaft.length() < 1.0 {
        return;
    }
    let tip = at + shaft;
    let stroke = Stroke::new(1.0, color);
    painter.line_segment([at, tip], stroke);
    let dir = shaft.normalized();
    let barb = (shaft.length() * 0.4).min(6.0);
    for angle in [2.6, -2.6] {
        painter.line_segment([tip, tip + rotate(dir, angle) * barb], stroke);
    }
}

/// Glyph radius for a charge: grows with magnitude, clamped.
pub fn charge_radius(charge: f32) -> f32 {
    let q = if charge.is_finite() { charge.abs() } else { 0.0 };
    (6.0 + 4.0 * q).clamp(6.0, 16.0)
}

/// Filled disc colored by sign, with a +/- mark.
pub fn charge_glyph(painter: &Painter, at: Pos2, charge: f32) {
    let radius = charge_radius(charge);
    let fill = if charge >= 0.0 {
        colormap::POSITIVE
    } else {
        colormap::NEGATIVE
    };
    painter.circle_filled(at, radius, fill);
    painter.circle_stroke(at, radius, Stroke::new(1.0, Color32::from_white_alpha(40)));

    let arm = radius * 0.5;
    let mark = Stroke::new(1.5, Color32::WHITE);
    painter.line_segment([at - vec2(arm, 0.0), at + vec2(arm, 0.0)], mark);
    if charge >= 0.0 {
        painter.line_segment([at - vec2(0.0, arm), at + vec2(0.0, arm)], mark);
    }
}

/// Tracer body plus its trail; trail segments grow more opaque toward the
/// most recent position.
pub fn particle_trail(painter: &Painter, trail: &[Pos2], color: Color32) {
    if trail.len() >= 2 {
        let span = (trail.len() - 1) as f32;
        for (i, pair) in trail.windows(2).enumerate() {
            let alpha = (20.0 + 180.0 * (i as f32 + 1.0) / span) as u8;
            painter.line_segment(
                [pair[0], pair[1]],
                Stroke::new(1.5, colormap::with_alpha(color, alpha)),
            );
        }
    }
    if let Some(&head) = trail.last() {
        painter.circle_filled(head, 3.5, color);
    }
}

/// Short directional dash for one flow particle, colored by the polarity of
/// its source.
pub fn flow_mark(painter: &Painter, point: &FlowPoint) {
    let color = if point.from_positive {
        colormap::POSITIVE
    } else {
        colormap::NEGATIVE
    };
    let half = point.direction * 3.5;
    painter.line_segment(
        [point.position - half, point.position + half],
        Stroke::new(1.6, colormap::with_alpha(color, 210)),
    );
}

/// Largest absolute value in a slice, for amplitude normalization.
pub fn max_abs(values: &[f32]) -> f32 {
    values.iter().fold(0.0_f32, |acc, v| {
        if v.is_finite() {
            acc.max(v.abs())
        } else {
            acc
        }
    })
}

/// 1D wave strip: both field components as overlaid curves colored through
/// the colormap, shaded spans where the material coefficient exceeds 1, and
/// a marker at the source cell.
pub fn wave_strip(
    painter: &Painter,
    rect: Rect,
    ey: &[f32],
    hz: &[f32],
    material: &[f32],
    source_cell: usize,
    map: ColorFn,
) {
    let n = ey.len().min(hz.len());
    if n < 2 {
        return;
    }
    let cell_x = |i: usize| rect.left() + rect.width() * i as f32 / (n - 1) as f32;

    // Material slabs first so the curves stay on top.
    let mut i = 0;
    while i < material.len().min(n) {
        if material[i] > 1.0 {
            let start = i;
            while i < material.len().min(n) && material[i] > 1.0 {
                i += 1;
            }
            let alpha = (18.0 * (material[start] - 1.0)).clamp(14.0, 64.0) as u8;
            painter.rect_filled(
                Rect::from_min_max(
                    pos2(cell_x(start), rect.top()),
                    pos2(cell_x(i - 1), rect.bottom()),
                ),
                0.0,
                colormap::with_alpha(SLAB_TINT, alpha),
            );
        } else {
            i += 1;
        }
    }

    let baseline = rect.center().y;
    let scale = rect.height() * 0.38;
    let norm = max_abs(ey).max(max_abs(hz)).max(1e-6);
    let sample_y = |v: f32| baseline - (v / norm) * scale;

    for (values, width, alpha) in [(ey, 1.8, 255), (hz, 1.1, 150)] {
        for i in 1..n {
            let mid = 0.5 * (values[i - 1] + values[i]);
            let color = map(0.5 + 0.5 * (mid / norm));
            painter.line_segment(
                [
                    pos2(cell_x(i - 1), sample_y(values[i - 1])),
                    pos2(cell_x(i), sample_y(values[i])),
                ],
                Stroke::new(width, colormap::with_alpha(color, alpha)),
            );
        }
    }

    if source_cell < n {
        let x = cell_x(source_cell);
        painter.line_segment(
            [pos2(x, rect.top()), pos2(x, rect.bottom())],
            Stroke::new(0.5, Color32::from_white_alpha(28)),
        );
        painter.circle_filled(pos2(x, baseline), 3.0, Color32::WHITE);
    }
}

/// Scrolling history chart: x is the sample index, y the value normalized
/// against the running maximum.
pub fn energy_graph(painter: &Painter, rect: Rect, history: &[f32], max_value: f32, title: &str) {
    if history.len() < 2 {
        return;
    }
    painter.rect_filled(rect, 2.0, Color32::from_rgba_unmultiplied(0, 0, 0, 130));
    painter.text(
        rect.left_top() + vec2(6.0, 4.0),
        Align2::LEFT_TOP,
        title,
        FontId::proportional(11.0),
        Color32::WHITE,
    );

    let norm = max_value.max(1e-6);
    let inner = rect.shrink2(vec2(6.0, 10.0));
    let span = (history.len() - 1) as f32;
    for i in 1..history.len() {
        let x1 = inner.left() + (i as f32 - 1.0) / span * inner.width();
        let x2 = inner.left() + i as f32 / span * inner.width();
        let y1 = inner.bottom() - (history[i - 1] / norm).clamp(0.0, 1.0) * inner.height();
        let y2 = inner.bottom() - (history[i] / norm).clamp(0.0, 1.0) * inner.height();
        painter.line_segment([pos2(x1, y1), pos2(x2, y2)], Stroke::new(1.5, CHART_LINE));
    }
}

/// Pointer probe: potential and field magnitude in a small box beside the
/// pointer, kept inside the canvas.
pub fn probe_readout(painter: &Painter, rect: Rect, anchor: Pos2, potential: f32, field_mag: f32) {
    let size = vec2(132.0, 32.0);
    let mut corner = anchor + vec2(14.0, -size.y - 6.0);
    corner.x = corner.x.clamp(rect.left(), (rect.right() - size.x).max(rect.left()));
    corner.y = corner.y.clamp(rect.top(), (rect.bottom() - size.y).max(rect.top()));
    let box_rect = Rect::from_min_size(corner, size);
    painter.rect_filled(box_rect, 3.0, Color32::from_rgba_unmultiplied(0, 0, 0, 160));
    painter.text(
        box_rect.left_top() + vec2(6.0, 3.0),
        Align2::LEFT_TOP,
        format!("V = {potential:.1}"),
        FontId::monospace(10.0),
        Color32::WHITE,
    );
    painter.text(
        box_rect.left_top() + vec2(6.0, 17.0),
        Align2::LEFT_TOP,
        format!("|E| = {field_mag:.2}"),
        FontId::monospace(10.0),
        Color32::WHITE,
    );
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    vec2(c * v.x - s * v.y, s * v.x + c * v.y)
}
