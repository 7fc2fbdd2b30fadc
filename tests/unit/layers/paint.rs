use super::*;
use crate::brush::FalloffBrush;
use crate::config::ChunkGeometry;
use crate::foundation::core::ALPHA_MAP_TEXELS;
use crate::layers::blend::AlphaEncoding;

// One world unit per texel keeps coordinates readable.
fn unit_set(textures: &[&'static str]) -> LayerSet<&'static str> {
    let mut set = LayerSet::with_geometry(ChunkGeometry { chunk_size: 64.0 });
    for &t in textures {
        set.add_layer(t).unwrap();
    }
    set
}

fn everywhere() -> FalloffBrush {
    FalloffBrush::hard(1000.0)
}

const ORIGIN: Point = Point::new(0.0, 0.0);
const MIDDLE: Point = Point::new(32.0, 32.0);

fn assert_full_coverage(set: &LayerSet<&'static str>) {
    for texel in 0..ALPHA_MAP_TEXELS {
        let sum: u32 = (0..set.layer_count())
            .map(|k| u32::from(set.alpha(k, texel).unwrap()))
            .sum();
        assert_eq!(sum, 255, "texel {texel}");
    }
}

#[test]
fn painting_the_only_layer_changes_nothing() {
    let mut set = unit_set(&["a"]);
    assert!(!set.paint(ORIGIN, MIDDLE, &everywhere(), 1.0, 1.0, &"a"));
    assert_eq!(set.layer_count(), 1);
    assert!(set.opacity_map(0).is_none());
}

#[test]
fn first_texture_becomes_the_base() {
    let mut set = unit_set(&[]);
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 1.0, &"a"));
    assert_eq!(set.texture(0), Some(&"a"));
}

#[test]
fn brush_outside_the_chunk_is_ignored() {
    let mut set = unit_set(&["a"]);
    let far = Point::new(500.0, 500.0);
    assert!(!set.paint(ORIGIN, far, &FalloffBrush::hard(10.0), 255.0, 1.0, &"b"));
    assert_eq!(set.layer_count(), 1);
}

#[test]
fn erasing_an_absent_texture_is_a_no_op() {
    let mut set = unit_set(&["a"]);
    assert!(!set.paint(ORIGIN, MIDDLE, &everywhere(), 0.0, 1.0, &"b"));
    assert_eq!(set.layer_count(), 1);
}

#[test]
fn full_stroke_replaces_the_base() {
    let mut set = unit_set(&["a"]);
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 1.0, &"b"));
    assert_eq!(set.textures().copied().collect::<Vec<_>>(), ["b"]);
    assert_full_coverage(&set);
}

#[test]
fn half_pressure_splits_coverage() {
    let mut set = unit_set(&["a"]);
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 0.5, &"b"));
    assert_eq!(set.layer_count(), 2);
    assert_eq!(set.alpha(1, 0), Some(128));
    assert_eq!(set.alpha(0, 0), Some(127));
    assert_full_coverage(&set);
}

#[test]
fn other_layers_give_way_proportionally() {
    let mut set = unit_set(&["a", "b", "c"]);
    for texel in 0..ALPHA_MAP_TEXELS {
        set.set_alpha(1, texel, 100);
        set.set_alpha(2, texel, 55);
    }
    // Base 100, b 100, c 55: painting c to 155 takes 50 from a and b each.
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 0.5, &"c"));
    assert_eq!(set.alpha(2, 0), Some(155));
    assert_eq!(set.alpha(1, 0), Some(50));
    assert_eq!(set.alpha(0, 0), Some(50));
    assert_full_coverage(&set);
}

#[test]
fn removing_from_full_coverage_feeds_one_neighbour() {
    let mut set = unit_set(&["a", "b", "c"]);
    for texel in 0..ALPHA_MAP_TEXELS {
        set.set_alpha(2, texel, 255);
    }
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 0.0, 0.5, &"c"));

    // The base received nothing and disappears; b took the freed coverage.
    assert_eq!(set.textures().copied().collect::<Vec<_>>(), ["b", "c"]);
    assert_eq!(set.alpha(1, 0), Some(128));
    assert_eq!(set.alpha(0, 0), Some(127));
    assert_full_coverage(&set);
}

#[test]
fn removing_paint_erases_the_emptied_layer() {
    let mut set = unit_set(&["t1", "t2"]);
    for texel in 0..ALPHA_MAP_TEXELS {
        set.set_alpha(1, texel, 100);
    }
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 0.0, 1.0, &"t2"));
    assert_eq!(set.layer_count(), 1);
    assert_eq!(set.texture(0), Some(&"t1"));
}

#[test]
fn exhausted_slots_are_a_soft_failure() {
    let mut set = unit_set(&["a", "b", "c", "d"]);
    for texel in 0..ALPHA_MAP_TEXELS {
        for layer in 1..4 {
            set.set_alpha(layer, texel, 50);
        }
    }
    assert!(!set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 1.0, &"e"));
    assert_eq!(set.layer_count(), 4);
    assert_eq!(set.find_slot(&"e"), None);
}

#[test]
fn unused_slot_is_reclaimed_for_a_new_texture() {
    let mut set = unit_set(&["a", "b", "c", "d"]);
    for texel in 0..ALPHA_MAP_TEXELS {
        set.set_alpha(1, texel, 50);
        set.set_alpha(3, texel, 50);
    }
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 0.5, &"e"));
    assert_eq!(set.textures().copied().collect::<Vec<_>>(), ["a", "b", "d", "e"]);
    assert_full_coverage(&set);
}

#[test]
fn reclaiming_a_slot_counts_as_a_change() {
    let mut set = unit_set(&["a", "b", "c", "d"]);
    for texel in 0..ALPHA_MAP_TEXELS {
        set.set_alpha(1, texel, 50);
        set.set_alpha(3, texel, 50);
    }
    assert!(set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 0.0, &"e"));
    assert_eq!(set.textures().copied().collect::<Vec<_>>(), ["a", "b", "d"]);
    assert_eq!(set.find_slot(&"e"), None);
    assert_full_coverage(&set);
}

#[test]
fn stroke_without_effect_drops_the_new_layer() {
    let mut set = unit_set(&["a"]);
    assert!(!set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 0.0, &"b"));
    assert_eq!(set.layer_count(), 1);
}

#[test]
fn texels_outside_the_radius_are_untouched() {
    let mut set = unit_set(&["a"]);
    assert!(set.paint(ORIGIN, MIDDLE, &FalloffBrush::hard(4.0), 255.0, 1.0, &"b"));
    assert_eq!(set.alpha(1, texel_index(32, 32)), Some(255));
    assert_eq!(set.alpha(1, texel_index(0, 0)), Some(0));
    assert_eq!(set.alpha(0, texel_index(0, 0)), Some(255));
    assert_full_coverage(&set);
}

#[test]
fn brush_just_past_the_edge_blends_the_seam() {
    let mut set = unit_set(&["a"]);
    let center = Point::new(-0.5, 32.0);
    assert!(set.paint(ORIGIN, center, &FalloffBrush::hard(1.0), 255.0, 1.0, &"b"));
    assert_eq!(set.alpha(1, texel_index(0, 31)), Some(255));
    assert_eq!(set.alpha(1, texel_index(1, 31)), Some(0));
}

#[test]
fn cascading_sets_are_edited_as_independent() {
    let mut set = unit_set(&["a", "b"]);
    set.set_alpha(1, 0, 10);
    set.to_cascading_alpha();
    set.paint(ORIGIN, MIDDLE, &everywhere(), 255.0, 0.5, &"b");
    assert_eq!(set.alpha_encoding(), AlphaEncoding::Independent);
}

#[test]
fn redistribute_clamps_at_full_coverage() {
    let mut vis = [100.0, 50.0, 105.0, 0.0];
    redistribute(&mut vis, 3, 1, 300.0);
    assert_eq!(vis, [0.0, 255.0, 0.0, 0.0]);
}
