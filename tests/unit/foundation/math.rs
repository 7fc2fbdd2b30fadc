use super::*;

#[test]
fn round_to_u8_clamps_and_rounds() {
    assert_eq!(round_to_u8(-3.0), 0);
    assert_eq!(round_to_u8(0.49), 0);
    assert_eq!(round_to_u8(0.5), 1);
    assert_eq!(round_to_u8(254.6), 255);
    assert_eq!(round_to_u8(1000.0), 255);
    assert_eq!(round_to_u8(f32::NAN), 0);
}

#[test]
fn shortest_dist_is_zero_inside() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(shortest_dist(Point::new(5.0, 5.0), r), 0.0);
    assert_eq!(shortest_dist(Point::new(10.0, 0.0), r), 0.0);
}

#[test]
fn shortest_dist_outside_edges_and_corners() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!((shortest_dist(Point::new(13.0, 5.0), r) - 3.0).abs() < 1e-9);
    assert!((shortest_dist(Point::new(5.0, -2.0), r) - 2.0).abs() < 1e-9);
    assert!((shortest_dist(Point::new(13.0, 14.0), r) - 5.0).abs() < 1e-9);
}

#[test]
fn transmittance_multiplies_remaining_coverage() {
    assert_eq!(transmittance(&[]), 1.0);
    assert_eq!(transmittance(&[255.0]), 0.0);
    assert!((transmittance(&[0.0, 127.5]) - 0.5).abs() < 1e-6);
}
