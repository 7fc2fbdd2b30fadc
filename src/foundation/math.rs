use crate::foundation::core::{Point, Rect};

/// Round a real-valued opacity to the nearest byte, clamping into `[0, 255]`.
pub(crate) fn round_to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Shortest distance from `p` to the closed rectangle `r` (zero when `p` is inside).
pub(crate) fn shortest_dist(p: Point, r: Rect) -> f64 {
    let dx = (r.x0 - p.x).max(0.0).max(p.x - r.x1);
    let dz = (r.y0 - p.y).max(0.0).max(p.y - r.y1);
    dx.hypot(dz)
}

/// Product of `(255 - v) / 255` over `values`, i.e. how much of a layer survives the layers
/// painted above it.
pub(crate) fn transmittance(values: &[f32]) -> f32 {
    values.iter().fold(1.0, |acc, v| acc * (255.0 - v) / 255.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
