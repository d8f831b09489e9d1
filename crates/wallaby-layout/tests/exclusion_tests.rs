//! Tests for the immutable exclusion space and the constraint space layered
//! on top of it.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "Since a float is not in the flow, non-positioned block boxes created
//! before and after the float box flow vertically as if the float did not
//! exist. However, the current and subsequent line boxes created next to the
//! float are shortened as necessary."

use wallaby_layout::style::{TextAlignValue, WhiteSpaceValue};
use wallaby_layout::{ConstraintSpace, Exclusion, ExclusionSpace, FloatSide, Rect, Size};

const EPSILON: f32 = 0.01;

fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn exclusion(side: FloatSide, x: f32, y: f32, width: f32, height: f32) -> Exclusion {
    Exclusion {
        rect: rect(x, y, width, height),
        side,
    }
}

fn assert_offsets(space: &ExclusionSpace, y: f32, height: f32, expected: (f32, f32)) {
    let (left, right) = space.available_inline_offsets(y, height);
    assert!(
        (left - expected.0).abs() < EPSILON && (right - expected.1).abs() < EPSILON,
        "expected offsets {expected:?} at y={y}, got ({left}, {right})"
    );
}

// ========== exclusion space ==========

#[test]
fn test_empty_space_reports_no_intrusion() {
    let space = ExclusionSpace::new(800.0);
    assert!(space.is_empty());
    assert_eq!(space.len(), 0);
    assert_offsets(&space, 0.0, 20.0, (0.0, 0.0));
    assert_offsets(&space, 500.0, 1.0, (0.0, 0.0));
}

#[test]
fn test_left_exclusion_narrows_from_the_left() {
    let space = ExclusionSpace::new(800.0).add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0));
    assert_eq!(space.len(), 1);
    assert_offsets(&space, 0.0, 20.0, (100.0, 0.0));
}

#[test]
fn test_right_exclusion_narrows_from_the_right() {
    let space =
        ExclusionSpace::new(800.0).add(exclusion(FloatSide::Right, 650.0, 0.0, 150.0, 50.0));
    assert_offsets(&space, 0.0, 20.0, (0.0, 150.0));
}

#[test]
fn test_opposite_sides_narrow_both_edges() {
    let space = ExclusionSpace::new(800.0)
        .add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0))
        .add(exclusion(FloatSide::Right, 650.0, 0.0, 150.0, 50.0));
    assert_offsets(&space, 10.0, 20.0, (100.0, 150.0));
}

#[test]
fn test_overlapping_same_side_exclusions_use_the_outermost_edge() {
    // Two left floats sharing a band shorten the line to the widest one,
    // not to the sum of their widths.
    let space = ExclusionSpace::new(800.0)
        .add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0))
        .add(exclusion(FloatSide::Left, 0.0, 0.0, 60.0, 80.0));
    assert_offsets(&space, 0.0, 20.0, (100.0, 0.0));
    // Below the wider float only the taller one still intrudes.
    assert_offsets(&space, 60.0, 10.0, (60.0, 0.0));
}

#[test]
fn test_stacked_exclusions_combine_across_bands() {
    // Two left floats placed side by side, the second shorter: the combined
    // intrusion applies only while both bands overlap.
    let space = ExclusionSpace::new(800.0)
        .add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0))
        .add(exclusion(FloatSide::Left, 100.0, 0.0, 80.0, 30.0));
    assert_offsets(&space, 0.0, 30.0, (180.0, 0.0));
    assert_offsets(&space, 30.0, 20.0, (100.0, 0.0));
    assert_offsets(&space, 50.0, 20.0, (0.0, 0.0));
}

#[test]
fn test_band_touching_an_exclusion_edge_is_clear() {
    let space = ExclusionSpace::new(800.0).add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0));
    // A band starting exactly at the float's bottom edge does not overlap it.
    assert_offsets(&space, 50.0, 20.0, (0.0, 0.0));
    // One just above still does.
    assert_offsets(&space, 49.9, 20.0, (100.0, 0.0));
    // A band ending exactly at the float's top edge does not overlap either.
    let lower = ExclusionSpace::new(800.0).add(exclusion(FloatSide::Left, 0.0, 30.0, 100.0, 50.0));
    assert_offsets(&lower, 10.0, 20.0, (0.0, 0.0));
}

#[test]
fn test_add_leaves_the_original_space_untouched() {
    let base = ExclusionSpace::new(800.0);
    let extended = base.add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0));
    assert!(base.is_empty());
    assert_offsets(&base, 0.0, 20.0, (0.0, 0.0));
    assert_eq!(extended.len(), 1);
}

#[test]
fn test_snapshots_keep_answering_with_their_own_exclusions() {
    let first = ExclusionSpace::new(800.0).add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0));
    let snapshot = first.clone();
    let second = first.add(exclusion(FloatSide::Right, 650.0, 0.0, 150.0, 50.0));
    assert_eq!(snapshot.len(), 1);
    assert_offsets(&snapshot, 0.0, 20.0, (100.0, 0.0));
    assert_eq!(second.len(), 2);
    assert_offsets(&second, 0.0, 20.0, (100.0, 150.0));
}

// ========== constraint space ==========

#[test]
fn test_constraint_space_defaults() {
    let space = ConstraintSpace::new(Size {
        width: 800.0,
        height: 600.0,
    });
    assert!(!space.no_wrap());
    assert_eq!(space.text_align(), TextAlignValue::Left);
    assert!((space.available_width() - 800.0).abs() < EPSILON);
    assert!((space.available_inline_size(0.0, 20.0) - 800.0).abs() < EPSILON);
}

#[test]
fn test_with_exclusion_narrows_the_inline_size() {
    let base = ConstraintSpace::new(Size {
        width: 800.0,
        height: 600.0,
    });
    let narrowed = base.with_exclusion(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0));
    assert!((narrowed.available_inline_size(0.0, 20.0) - 700.0).abs() < EPSILON);
    // Builder style: the original space is unaffected.
    assert!((base.available_inline_size(0.0, 20.0) - 800.0).abs() < EPSILON);
    // Below the float the full width comes back.
    assert!((narrowed.available_inline_size(50.0, 20.0) - 800.0).abs() < EPSILON);
}

#[test]
fn test_with_exclusion_space_replaces_the_whole_set() {
    let seeded = ExclusionSpace::new(800.0)
        .add(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0))
        .add(exclusion(FloatSide::Right, 650.0, 0.0, 150.0, 50.0));
    let space = ConstraintSpace::new(Size {
        width: 800.0,
        height: 600.0,
    })
    .with_exclusion_space(seeded);
    assert_eq!(space.exclusions().len(), 2);
    assert!((space.available_inline_size(0.0, 20.0) - 550.0).abs() < EPSILON);
}

#[test]
fn test_with_available_width_keeps_the_exclusions() {
    let space = ConstraintSpace::new(Size {
        width: 800.0,
        height: 600.0,
    })
    .with_exclusion(exclusion(FloatSide::Left, 0.0, 0.0, 100.0, 50.0))
    .with_available_width(600.0);
    assert!((space.available_width() - 600.0).abs() < EPSILON);
    assert!((space.available_inline_size(0.0, 20.0) - 500.0).abs() < EPSILON);
}

#[test]
fn test_with_white_space_controls_wrapping() {
    let space = ConstraintSpace::new(Size {
        width: 800.0,
        height: 600.0,
    });
    assert!(!space.no_wrap());
    assert!(space.with_white_space(WhiteSpaceValue::Nowrap).no_wrap());
    assert!(!space.with_white_space(WhiteSpaceValue::Normal).no_wrap());
}

#[test]
fn test_with_text_align_carries_through() {
    let space = ConstraintSpace::new(Size {
        width: 800.0,
        height: 600.0,
    })
    .with_text_align(TextAlignValue::Center);
    assert_eq!(space.text_align(), TextAlignValue::Center);
}

#[test]
fn test_inline_size_can_go_negative_between_wide_floats() {
    // Callers clamp; the space itself reports the raw remainder.
    let space = ConstraintSpace::new(Size {
        width: 300.0,
        height: 600.0,
    })
    .with_exclusion(exclusion(FloatSide::Left, 0.0, 0.0, 200.0, 50.0))
    .with_exclusion(exclusion(FloatSide::Right, 100.0, 0.0, 200.0, 50.0));
    assert!(space.available_inline_size(0.0, 20.0) < 0.0);
}
