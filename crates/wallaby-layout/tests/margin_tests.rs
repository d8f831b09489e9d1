//! Margin collapsing across sibling, parent-child, and empty-box boundaries,
//! driven through the full document pipeline.
//!
//! [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "In CSS, the adjoining margins of two or more boxes (which might or might
//! not be siblings) can combine to form a single margin. Margins that combine
//! this way are said to collapse."

use wallaby_dom::DomTree;
use wallaby_layout::style::OverflowValue;
use wallaby_layout::{
    layout_document, ApproximateFontMetrics, AutoLength, ComputedStyle, LayoutBox, LengthValue,
    ReplacedSizes, Size, StyleMap,
};

const VIEWPORT: Size = Size {
    width: 800.0,
    height: 600.0,
};
const EPSILON: f32 = 0.01;

fn layout(tree: &DomTree, styles: &StyleMap) -> LayoutBox {
    layout_document(
        tree,
        styles,
        VIEWPORT,
        &ApproximateFontMetrics,
        &ReplacedSizes::new(),
    )
    .expect("document should generate a root box")
}

fn px(value: f64) -> Option<AutoLength> {
    Some(AutoLength::Length(LengthValue::Px(value)))
}

fn block(height: f64, margin_top: f64, margin_bottom: f64) -> ComputedStyle {
    ComputedStyle {
        height: px(height),
        margin_top: px(margin_top),
        margin_bottom: px(margin_bottom),
        ..ComputedStyle::default()
    }
}

// ========== sibling margins ==========

#[test]
fn test_sibling_margins_collapse_to_the_larger() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let second = tree.append_element(root, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, 30.0));
    let _ = styles.insert(second, block(40.0, 20.0, 0.0));

    let laid = layout(&tree, &styles);
    let gap_bottom = laid.children[1].dimensions.content.y;
    assert!(
        (gap_bottom - 80.0).abs() < EPSILON,
        "50 + max(30, 20) should put the second box at 80, got {gap_bottom}"
    );
    assert!((laid.dimensions.content.height - 120.0).abs() < EPSILON);
}

#[test]
fn test_equal_sibling_margins_collapse_to_that_margin() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let second = tree.append_element(root, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, 16.0));
    let _ = styles.insert(second, block(40.0, 16.0, 0.0));

    let laid = layout(&tree, &styles);
    assert!((laid.children[1].dimensions.content.y - 66.0).abs() < EPSILON);
}

#[test]
fn test_mixed_sign_margins_sum() {
    // "If negative margins are involved ... deduct the maximum of the
    // absolute values of the negative adjoining margins."
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let second = tree.append_element(root, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, -10.0));
    let _ = styles.insert(second, block(40.0, 30.0, 0.0));

    let laid = layout(&tree, &styles);
    let second_y = laid.children[1].dimensions.content.y;
    assert!(
        (second_y - 70.0).abs() < EPSILON,
        "30 + (-10) should leave a 20px gap, got second box at {second_y}"
    );
}

#[test]
fn test_negative_margins_collapse_to_the_most_negative() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let second = tree.append_element(root, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, -20.0));
    let _ = styles.insert(second, block(40.0, -10.0, 0.0));

    let laid = layout(&tree, &styles);
    let second_y = laid.children[1].dimensions.content.y;
    assert!(
        (second_y - 30.0).abs() < EPSILON,
        "min(-20, -10) should pull the second box up to 30, got {second_y}"
    );
}

// ========== parent-child margins ==========

#[test]
fn test_first_child_margin_escapes_its_parent() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let wrapper = tree.append_element(root, "div");
    let inner = tree.append_element(wrapper, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, 10.0));
    let _ = styles.insert(inner, block(20.0, 30.0, 0.0));

    let laid = layout(&tree, &styles);
    let wrapper_box = &laid.children[1];
    let inner_box = &wrapper_box.children[0];
    // The child's 30px top margin collapses with the preceding sibling's
    // 10px to move the wrapper itself; inside, the child starts flush.
    assert!((wrapper_box.dimensions.content.y - 80.0).abs() < EPSILON);
    assert!((inner_box.dimensions.content.y - 80.0).abs() < EPSILON);
    assert!(
        (wrapper_box.dimensions.content.height - 20.0).abs() < EPSILON,
        "the escaped margin must not inflate the wrapper's height"
    );
}

#[test]
fn test_parent_padding_keeps_the_child_margin_inside() {
    // "Margins of a box and its in-flow first child collapse if the box has
    // no top border and no top padding."
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let wrapper = tree.append_element(root, "div");
    let inner = tree.append_element(wrapper, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, 10.0));
    let _ = styles.insert(
        wrapper,
        ComputedStyle {
            padding_top: Some(LengthValue::Px(8.0)),
            ..ComputedStyle::default()
        },
    );
    let _ = styles.insert(inner, block(30.0, 25.0, 0.0));

    let laid = layout(&tree, &styles);
    let wrapper_box = &laid.children[1];
    let inner_box = &wrapper_box.children[0];
    assert!((wrapper_box.dimensions.content.y - 68.0).abs() < EPSILON);
    assert!(
        (inner_box.dimensions.content.y - 93.0).abs() < EPSILON,
        "the child's margin stays below the padding edge"
    );
    assert!(
        (wrapper_box.dimensions.content.height - 55.0).abs() < EPSILON,
        "the contained margin counts toward the wrapper's auto height"
    );
}

#[test]
fn test_last_child_bottom_margin_stays_out_of_the_parent_height() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let wrapper = tree.append_element(root, "div");
    let inner = tree.append_element(wrapper, "div");
    let tail = tree.append_element(root, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(inner, block(30.0, 0.0, 25.0));
    let _ = styles.insert(tail, block(10.0, 0.0, 0.0));

    let laid = layout(&tree, &styles);
    let wrapper_box = &laid.children[0];
    assert!(
        (wrapper_box.dimensions.content.height - 30.0).abs() < EPSILON,
        "the collapsed-out bottom margin must not inflate the wrapper"
    );
    // It still separates the wrapper from the next sibling.
    assert!((laid.children[1].dimensions.content.y - 55.0).abs() < EPSILON);
}

// ========== empty boxes ==========

#[test]
fn test_empty_block_collapses_through() {
    // "A box's own margins collapse if the 'min-height' property is zero,
    // and it has neither top or bottom borders nor top or bottom padding,
    // and it has a 'height' of either 0 or 'auto', and it does not contain
    // a line box."
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let empty = tree.append_element(root, "div");
    let last = tree.append_element(root, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(40.0, 0.0, 10.0));
    let _ = styles.insert(
        empty,
        ComputedStyle {
            margin_top: px(5.0),
            margin_bottom: px(20.0),
            ..ComputedStyle::default()
        },
    );
    let _ = styles.insert(last, block(30.0, 15.0, 0.0));

    let laid = layout(&tree, &styles);
    let last_y = laid.children[2].dimensions.content.y;
    assert!(
        (last_y - 60.0).abs() < EPSILON,
        "all four margins merge to max(10, 5, 20, 15), got last box at {last_y}"
    );
    assert!((laid.dimensions.content.height - 90.0).abs() < EPSILON);
}

// ========== formatting context boundaries ==========

#[test]
fn test_new_formatting_context_does_not_collapse() {
    // "Margins of elements that establish new block formatting contexts
    // (such as floats and elements with 'overflow' other than 'visible')
    // do not collapse with their in-flow children."
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div");
    let first = tree.append_element(root, "div");
    let bfc = tree.append_element(root, "div");
    let inner = tree.append_element(bfc, "div");
    let mut styles = StyleMap::new();
    let _ = styles.insert(first, block(50.0, 0.0, 10.0));
    let _ = styles.insert(
        bfc,
        ComputedStyle {
            overflow: Some(OverflowValue::Hidden),
            margin_top: px(5.0),
            ..ComputedStyle::default()
        },
    );
    let _ = styles.insert(inner, block(20.0, 30.0, 0.0));

    let laid = layout(&tree, &styles);
    let bfc_box = &laid.children[1];
    let inner_box = &bfc_box.children[0];
    // Adjacent margins add rather than collapse across the boundary.
    assert!(
        (bfc_box.dimensions.content.y - 65.0).abs() < EPSILON,
        "10 + 5 should both apply, got {}",
        bfc_box.dimensions.content.y
    );
    // The child's margin is contained instead of escaping.
    assert!((inner_box.dimensions.content.y - 95.0).abs() < EPSILON);
    assert!((bfc_box.dimensions.content.height - 50.0).abs() < EPSILON);
}
