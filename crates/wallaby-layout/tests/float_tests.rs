//! Tests for float placement, drop behavior, clearance, and formatting
//! context scoping.
//!
//! [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
//!
//! "A floated box is shifted to the left or right until its outer edge
//! touches the containing block edge or the outer edge of another float."

use wallaby_layout::{ClearSide, FloatManager, FloatSide, Size};

const EPSILON: f32 = 0.01;

fn size(width: f32, height: f32) -> Size {
    Size { width, height }
}

// ========== placement ==========

#[test]
fn test_left_float_lands_at_the_content_left_edge() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let placed = floats.place(FloatSide::Left, size(100.0, 50.0), 0.0);
    assert!(placed.x.abs() < EPSILON, "left float x was {}", placed.x);
    assert!(placed.y.abs() < EPSILON, "left float y was {}", placed.y);
    assert!((placed.width - 100.0).abs() < EPSILON);
    assert!((placed.height - 50.0).abs() < EPSILON);
}

#[test]
fn test_second_left_float_stacks_beside_the_first() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let _ = floats.place(FloatSide::Left, size(100.0, 50.0), 0.0);
    let second = floats.place(FloatSide::Left, size(200.0, 50.0), 0.0);
    assert!(
        (second.x - 100.0).abs() < EPSILON,
        "second left float should start at the first one's outer edge, got x={}",
        second.x
    );
    assert!(second.y.abs() < EPSILON);
}

#[test]
fn test_right_float_lands_at_the_content_right_edge() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let placed = floats.place(FloatSide::Right, size(150.0, 50.0), 0.0);
    assert!(
        (placed.x - 650.0).abs() < EPSILON,
        "right float should end at the content edge, got x={}",
        placed.x
    );
}

#[test]
fn test_float_keeps_its_candidate_y_when_the_band_is_clear() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let placed = floats.place(FloatSide::Left, size(100.0, 50.0), 30.0);
    assert!((placed.y - 30.0).abs() < EPSILON);
}

#[test]
fn test_opposite_side_conflict_drops_the_float() {
    // 200 + 150 does not fit in 300, so the right float moves below the
    // left one instead of overlapping it.
    let mut floats = FloatManager::new(0.0, 300.0);
    let _ = floats.place(FloatSide::Left, size(200.0, 40.0), 0.0);
    let dropped = floats.place(FloatSide::Right, size(150.0, 40.0), 0.0);
    assert!(
        (dropped.y - 40.0).abs() < EPSILON,
        "right float should drop below the left one, got y={}",
        dropped.y
    );
    assert!((dropped.x - 150.0).abs() < EPSILON);
}

#[test]
fn test_same_side_floats_stack_without_dropping() {
    // "If there is not enough horizontal room for the float, it is shifted
    // downward" applies to opposite-side conflicts; same-side floats keep
    // stacking and may overflow the containing block.
    let mut floats = FloatManager::new(0.0, 300.0);
    let _ = floats.place(FloatSide::Left, size(200.0, 40.0), 0.0);
    let second = floats.place(FloatSide::Left, size(200.0, 40.0), 0.0);
    assert!(second.y.abs() < EPSILON, "same-side float must not drop");
    assert!((second.x - 200.0).abs() < EPSILON);
}

#[test]
fn test_placement_fails_open_when_no_band_ever_fits() {
    // The drop search is bounded; when it gives up, the float commits at
    // its original candidate position rather than disappearing.
    let mut floats = FloatManager::new(0.0, 100.0);
    let _ = floats.place(FloatSide::Left, size(80.0, 1200.0), 0.0);
    let stuck = floats.place(FloatSide::Right, size(80.0, 50.0), 0.0);
    assert!(stuck.y.abs() < EPSILON, "gave up float kept candidate y");
    assert!((stuck.x - 20.0).abs() < EPSILON);
}

// ========== clearance ==========

#[test]
fn test_clearance_y_tracks_each_side_independently() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let _ = floats.place(FloatSide::Left, size(100.0, 40.0), 0.0);
    let _ = floats.place(FloatSide::Right, size(80.0, 90.0), 0.0);
    assert!((floats.clearance_y(ClearSide::Left, 0.0) - 40.0).abs() < EPSILON);
    assert!((floats.clearance_y(ClearSide::Right, 0.0) - 90.0).abs() < EPSILON);
    assert!((floats.clearance_y(ClearSide::Both, 0.0) - 90.0).abs() < EPSILON);
}

#[test]
fn test_clearance_never_moves_a_box_upward() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let _ = floats.place(FloatSide::Left, size(100.0, 40.0), 0.0);
    assert!((floats.clearance_y(ClearSide::Left, 100.0) - 100.0).abs() < EPSILON);
}

#[test]
fn test_max_float_bottom_spans_the_current_scope() {
    let mut floats = FloatManager::new(0.0, 800.0);
    assert!(floats.max_float_bottom().is_none());
    let _ = floats.place(FloatSide::Left, size(100.0, 50.0), 0.0);
    let _ = floats.place(FloatSide::Left, size(100.0, 30.0), 0.0);
    let bottom = floats.max_float_bottom().expect("two floats are placed");
    assert!((bottom - 50.0).abs() < EPSILON);
}

// ========== scoping ==========

#[test]
fn test_nested_scopes_isolate_their_floats() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let _ = floats.place(FloatSide::Left, size(100.0, 50.0), 0.0);
    assert!(floats.at_root_scope());

    floats.push_context(0.0, 400.0);
    assert!(!floats.at_root_scope());
    assert!(
        floats.is_empty(),
        "a new formatting context starts with no visible floats"
    );
    let _ = floats.place(FloatSide::Left, size(60.0, 20.0), 0.0);
    assert_eq!(floats.visible_floats().len(), 1);

    floats.pop_context();
    assert!(floats.at_root_scope());
    assert_eq!(
        floats.visible_floats().len(),
        1,
        "inner floats must not leak into the outer scope"
    );
    let outer = floats.max_float_bottom().expect("outer float is visible");
    assert!((outer - 50.0).abs() < EPSILON);
}

#[test]
fn test_nested_scope_uses_its_own_origin() {
    let mut floats = FloatManager::new(0.0, 800.0);
    floats.push_context(200.0, 300.0);
    let placed = floats.place(FloatSide::Left, size(50.0, 20.0), 0.0);
    // Placement is reported in absolute coordinates.
    assert!((placed.x - 200.0).abs() < EPSILON);
    let right = floats.place(FloatSide::Right, size(50.0, 20.0), 0.0);
    assert!((right.x - 450.0).abs() < EPSILON);
    floats.pop_context();
}

// ========== exclusion queries ==========

#[test]
fn test_exclusion_space_translates_to_local_coordinates() {
    let mut floats = FloatManager::new(0.0, 800.0);
    let _ = floats.place(FloatSide::Left, size(100.0, 50.0), 0.0);
    // Seen from a child whose content box starts 25px further right, the
    // float only intrudes 75px.
    let space = floats.exclusion_space(25.0, 750.0);
    let (left, right) = space.available_inline_offsets(0.0, 20.0);
    assert!((left - 75.0).abs() < EPSILON, "local left offset was {left}");
    assert!(right.abs() < EPSILON);
}
