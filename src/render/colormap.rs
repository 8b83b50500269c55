//! Color mapping for field visualizations.
//!
//! Every color drawn by the renderer comes either from one of these maps or
//! from the fixed palette constants below; nothing else computes colors.

use egui::Color32;

/// Signature for caller-supplied colormaps. Implementations must be
/// continuous at t = 0.5 so diverging fields have no visible seam.
pub type ColorFn = fn(f32) -> Color32;

/// Glyph color for positive charges and positive-polarity flow marks.
pub const POSITIVE: Color32 = Color32::from_rgb(235, 80, 70);
/// Glyph color for negative charges and negative-polarity flow marks.
pub const NEGATIVE: Color32 = Color32::from_rgb(70, 130, 235);
/// Tracer particle body and trail color.
pub const TRACER: Color32 = Color32::from_rgb(250, 200, 60);

/// Default diverging map: blue (t = 0) through dark neutral gray (t = 0.5)
/// to green (t = 1), linear on each half.
pub fn diverging(t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let blue = (0.15, 0.35, 0.95);
    let gray = (0.22, 0.22, 0.22);
    let green = (0.20, 0.85, 0.35);
    let (r, g, b) = if t < 0.5 {
        let s = t / 0.5;
        lerp_rgb(blue, gray, s)
    } else {
        let s = (t - 0.5) / 0.5;
        lerp_rgb(gray, green, s)
    };
    to_color32(r, g, b)
}

/// Contour palette: hue sweep from green (low levels) to blue (high levels)
/// at full saturation, via HSL.
pub fn contour_hue(t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let hue = 120.0 + 120.0 * t;
    let (r, g, b) = hsl_to_rgb(hue, 0.85, 0.55);
    to_color32(r, g, b)
}

/// Same color with a replacement alpha, for translucent strokes and fills.
pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn lerp_rgb(a: (f32, f32, f32), b: (f32, f32, f32), s: f32) -> (f32, f32, f32) {
    (
        a.0 + (b.0 - a.0) * s,
        a.1 + (b.1 - a.1) * s,
        a.2 + (b.2 - a.2) * s,
    )
}

fn to_color32(r: f32, g: f32, b: f32) -> Color32 {
    Color32::from_rgb(
        (r.clamp(0.0, 1.0) * 255.0) as u8,
        (g.clamp(0.0, 1.0) * 255.0) as u8,
        (b.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// HSL to RGB conversion.
/// h: [0, 360), s: [0, 1], l: [0, 1]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h_norm = h / 360.0;

    let r = hue_to_rgb(p, q, h_norm + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h_norm);
    let b = hue_to_rgb(p, q, h_norm - 1.0 / 3.0);

    (r, g, b)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
