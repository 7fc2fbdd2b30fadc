use super::*;

#[test]
fn hard_brush_is_flat_inside_radius() {
    let b = FalloffBrush::hard(10.0);
    assert_eq!(b.value(0.0), 1.0);
    assert_eq!(b.value(10.0), 1.0);
    assert_eq!(b.value(10.5), 0.0);
}

#[test]
fn soft_brush_falls_off_linearly() {
    let b = FalloffBrush::new(10.0, 0.5);
    assert_eq!(b.value(4.0), 1.0);
    assert!((b.value(7.5) - 0.5).abs() < 1e-6);
    assert_eq!(b.value(10.0), 0.0);
}

#[test]
fn constructor_clamps_inputs() {
    let b = FalloffBrush::new(-1.0, 3.0);
    assert_eq!(b.radius, 0.0);
    assert_eq!(b.hardness, 1.0);
}

#[test]
fn references_are_brushes() {
    fn radius_of(b: impl Brush) -> f32 {
        b.radius()
    }
    let b = FalloffBrush::hard(2.0);
    assert_eq!(radius_of(&b), 2.0);
}
