//! Intensity to color mapping

use image::Rgb;

use crate::constants::{BACKGROUND_COLOR, HEAT_STOPS};

/// Convert normalized intensity (0-1) to RGB color.
/// Zero = background, otherwise Blue -> Cyan -> Green -> Yellow -> Red.
pub fn heat_color(t: f32) -> Rgb<u8> {
    if t <= 0.0 || t.is_nan() {
        return BACKGROUND_COLOR;
    }
    let t = t.min(1.0);
    let segments = (HEAT_STOPS.len() - 1) as f32;
    let scaled = t * segments;
    let idx = (scaled.floor() as usize).min(HEAT_STOPS.len() - 2);
    let local = scaled - idx as f32;
    lerp(HEAT_STOPS[idx], HEAT_STOPS[idx + 1], local)
}

fn lerp(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let channel = |i: usize| {
        let v = a.0[i] as f32 + (b.0[i] as f32 - a.0[i] as f32) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgb([channel(0), channel(1), channel(2)])
}
