//! Inline layout: item collection, line geometry, wrapping, alignment, and
//! block-in-inline interruption.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."

use wallaby_dom::DomTree;
use wallaby_layout::layout::{collect_inline_items, InlineItem, InlineItemKind};
use wallaby_layout::style::{FloatValue, TextAlignValue, WhiteSpaceValue};
use wallaby_layout::{
    build_box_tree, layout_document, ApproximateFontMetrics, AutoLength, ComputedStyle,
    DisplayValue, FragmentKind, LayoutBox, LengthValue, ReplacedSizes, Size, StyleMap,
};

const VIEWPORT: Size = Size {
    width: 800.0,
    height: 600.0,
};
const EPSILON: f32 = 0.01;

// Default 16px text under the fixed-ratio metrics: 9.6px per character,
// 19.2px line height.
const CHAR: f32 = 9.6;
const LINE: f32 = 19.2;

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

fn collect(tree: &DomTree, styles: &StyleMap) -> Vec<InlineItem> {
    let block = build_box_tree(tree, styles, tree.root(), &ReplacedSizes::new(), VIEWPORT)
        .expect("document should generate a root box");
    collect_inline_items(&block, &ApproximateFontMetrics, VIEWPORT, VIEWPORT.width)
}

fn px(value: f64) -> Option<AutoLength> {
    Some(AutoLength::Length(LengthValue::Px(value)))
}

fn block_style(height: f64) -> ComputedStyle {
    ComputedStyle {
        height: px(height),
        ..ComputedStyle::default()
    }
}

// ========== item collection ==========

#[test]
fn test_collection_collapses_whitespace_runs() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "hello   \n world");
    let items = collect(&tree, &StyleMap::new());

    assert_eq!(items.len(), 1);
    let InlineItemKind::Text { text, .. } = &items[0].kind else {
        panic!("expected a text item, got {:?}", items[0].kind);
    };
    assert_eq!(text, "hello world");
    assert!((items[0].size.width - 11.0 * CHAR).abs() < EPSILON);
}

#[test]
fn test_collection_drops_leading_whitespace() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "  hi");
    let items = collect(&tree, &StyleMap::new());

    let InlineItemKind::Text { text, .. } = &items[0].kind else {
        panic!("expected a text item");
    };
    assert_eq!(text, "hi");
}

#[test]
fn test_collection_splits_the_first_letter() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "drop cap");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        root,
        ComputedStyle {
            first_letter: Some(Box::new(ComputedStyle {
                font_size: Some(LengthValue::Px(32.0)),
                ..ComputedStyle::default()
            })),
            ..ComputedStyle::default()
        },
    );
    let items = collect(&tree, &styles);

    assert_eq!(items.len(), 2, "the first letter becomes its own item");
    let InlineItemKind::Text { text, font_size } = &items[0].kind else {
        panic!("expected a text item, got {:?}", items[0].kind);
    };
    assert_eq!(text, "d");
    assert!((*font_size - 32.0).abs() < EPSILON);
    assert!(
        (items[0].size.height - 38.4).abs() < EPSILON,
        "the letter carries its own line height"
    );
    let InlineItemKind::Text { text, .. } = &items[1].kind else {
        panic!("expected a text item, got {:?}", items[1].kind);
    };
    assert_eq!(text, "rop cap");
    assert!((items[1].size.width - 7.0 * CHAR).abs() < EPSILON);
}

#[test]
fn test_collection_wraps_inline_boxes_in_markers() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "a");
    let span = tree.append_element(root, "span");
    let _ = tree.append_text(span, "b");
    let _ = tree.append_text(root, "c");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        span,
        ComputedStyle {
            margin_left: px(4.0),
            padding_right: Some(LengthValue::Px(3.0)),
            ..ComputedStyle::default()
        },
    );
    let items = collect(&tree, &styles);

    assert_eq!(items.len(), 5, "text, open, text, close, text");
    let InlineItemKind::OpenTag { box_path } = &items[1].kind else {
        panic!("expected an open marker, got {:?}", items[1].kind);
    };
    assert_eq!(*box_path, [1]);
    assert!(
        (items[1].size.width - 4.0).abs() < EPSILON,
        "the open marker carries the left edges"
    );
    let InlineItemKind::CloseTag { .. } = &items[3].kind else {
        panic!("expected a close marker, got {:?}", items[3].kind);
    };
    assert!(
        (items[3].size.width - 3.0).abs() < EPSILON,
        "the close marker carries the right edges"
    );
}

#[test]
fn test_collection_emits_a_control_item_for_br() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "ab");
    let _ = tree.append_element(root, "br");
    let _ = tree.append_text(root, "cd");
    let items = collect(&tree, &StyleMap::new());

    assert_eq!(items.len(), 3);
    assert!(matches!(items[1].kind, InlineItemKind::Control));
    assert!(items[1].size.width.abs() < EPSILON);
    assert!(
        (items[1].size.height - LINE).abs() < EPSILON,
        "a forced break still props the line open to the strut height"
    );
}

#[test]
fn test_collection_measures_atomics_with_their_margin_box() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let span = tree.append_element(root, "span");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        span,
        ComputedStyle {
            display: Some(DisplayValue::inline_block()),
            width: px(30.0),
            height: px(25.0),
            margin_left: px(5.0),
            margin_right: px(5.0),
            ..ComputedStyle::default()
        },
    );
    let items = collect(&tree, &styles);

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0].kind, InlineItemKind::Atomic { .. }));
    assert!((items[0].size.width - 40.0).abs() < EPSILON);
    assert!((items[0].size.height - 25.0).abs() < EPSILON);
}

#[test]
fn test_collection_flags_floats_and_block_children() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "go");
    let floated = tree.append_element(root, "div");
    let block = tree.append_element(root, "div");
    let _ = tree.append_text(root, "stop");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        floated,
        ComputedStyle {
            float: Some(FloatValue::Left),
            width: px(30.0),
            height: px(40.0),
            ..ComputedStyle::default()
        },
    );
    let _ = styles.insert(block, block_style(10.0));
    let items = collect(&tree, &styles);

    assert_eq!(items.len(), 4);
    let InlineItemKind::Float { box_path, .. } = &items[1].kind else {
        panic!("expected a float item, got {:?}", items[1].kind);
    };
    assert_eq!(*box_path, [1]);
    assert!(
        items[1].size.width.abs() < EPSILON && items[1].size.height.abs() < EPSILON,
        "floats consume no inline space"
    );
    let InlineItemKind::BlockChild { box_path } = &items[2].kind else {
        panic!("expected a block-child item, got {:?}", items[2].kind);
    };
    assert_eq!(*box_path, [2]);
}

// ========== line geometry ==========

#[test]
fn test_single_line_of_text() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "hello");

    let laid = layout(&tree, &StyleMap::new());
    assert_eq!(laid.line_boxes.len(), 1);
    let line = &laid.line_boxes[0];
    assert!(line.rect.x.abs() < EPSILON);
    assert!(line.rect.y.abs() < EPSILON);
    assert!((line.rect.width - 5.0 * CHAR).abs() < EPSILON);
    assert!((line.rect.height - LINE).abs() < EPSILON);
    assert!(
        (line.baseline - LINE * 0.8).abs() < EPSILON,
        "baseline sits at 80% of the line height"
    );
    let FragmentKind::Text { text, .. } = &line.fragments[0].kind else {
        panic!("expected a text fragment");
    };
    assert_eq!(text, "hello");
    assert!((laid.dimensions.content.height - LINE).abs() < EPSILON);
}

#[test]
fn test_text_wraps_into_multiple_lines() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "hello world again");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        root,
        ComputedStyle {
            width: px(100.0),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    assert_eq!(laid.line_boxes.len(), 3, "each word gets its own line");
    assert!(laid.line_boxes[0].rect.y.abs() < EPSILON);
    assert!((laid.line_boxes[1].rect.y - LINE).abs() < 0.1);
    assert!((laid.line_boxes[2].rect.y - 2.0 * LINE).abs() < 0.1);
    for line in &laid.line_boxes {
        assert!(
            (line.rect.width - 5.0 * CHAR).abs() < EPSILON,
            "every line holds one five-character word, got width {}",
            line.rect.width
        );
    }
    assert!((laid.dimensions.content.height - 3.0 * LINE).abs() < 0.1);
}

#[test]
fn test_nowrap_keeps_text_on_one_line() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "hello world again");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        root,
        ComputedStyle {
            width: px(100.0),
            white_space: Some(WhiteSpaceValue::Nowrap),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    assert_eq!(laid.line_boxes.len(), 1);
    assert!(
        (laid.line_boxes[0].rect.width - 17.0 * CHAR).abs() < EPSILON,
        "the line overflows its containing block rather than wrapping"
    );
}

#[test]
fn test_br_forces_a_line_break() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "ab");
    let _ = tree.append_element(root, "br");
    let _ = tree.append_text(root, "cd");

    let laid = layout(&tree, &StyleMap::new());
    assert_eq!(laid.line_boxes.len(), 2);
    assert!((laid.line_boxes[1].rect.y - LINE).abs() < EPSILON);
    let FragmentKind::Text { text, .. } = &laid.line_boxes[1].fragments[0].kind else {
        panic!("expected text on the second line");
    };
    assert_eq!(text, "cd");
}

#[test]
fn test_float_in_inline_content_narrows_the_line() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let floated = tree.append_element(root, "div");
    let _ = tree.append_text(root, "hello");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        floated,
        ComputedStyle {
            float: Some(FloatValue::Left),
            width: px(30.0),
            height: px(40.0),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    let line = &laid.line_boxes[0];
    assert!(
        (line.rect.x - 30.0).abs() < EPSILON,
        "text starts at the float's right edge, got x={}",
        line.rect.x
    );
    let float_fragment = &line.fragments[0];
    assert!(matches!(float_fragment.kind, FragmentKind::Float));
    assert!(float_fragment.rect.x.abs() < EPSILON);
    assert!((float_fragment.rect.width - 30.0).abs() < EPSILON);
    let float_box = &laid.children[0];
    assert!(float_box.dimensions.content.x.abs() < EPSILON);
    assert!((float_box.dimensions.content.height - 40.0).abs() < EPSILON);
    assert!(
        (laid.dimensions.content.height - 40.0).abs() < EPSILON,
        "the root owns the float scope, so its height covers the float"
    );
}

#[test]
fn test_centered_text_splits_the_slack() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "hi");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        root,
        ComputedStyle {
            width: px(100.0),
            text_align: Some(TextAlignValue::Center),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    let line = &laid.line_boxes[0];
    // (100 - 19.2) / 2
    assert!(
        (line.rect.x - 40.4).abs() < EPSILON,
        "centered line should start at 40.4, got {}",
        line.rect.x
    );
}

#[test]
fn test_right_aligned_text_reaches_the_right_edge() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "hi");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        root,
        ComputedStyle {
            width: px(100.0),
            text_align: Some(TextAlignValue::Right),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    assert!((laid.line_boxes[0].rect.right() - 100.0).abs() < EPSILON);
}

#[test]
fn test_block_child_interrupts_inline_content() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "ab");
    let block = tree.append_element(root, "div");
    let _ = tree.append_text(root, "cd");
    let mut styles = StyleMap::new();
    let _ = styles.insert(block, block_style(10.0));

    let laid = layout(&tree, &styles);
    assert_eq!(
        laid.line_boxes.len(),
        3,
        "text before, a placeholder line, text after"
    );
    let placeholder = &laid.line_boxes[1];
    assert!((placeholder.rect.y - LINE).abs() < EPSILON);
    assert!(placeholder.rect.height.abs() < EPSILON);
    assert!(matches!(
        placeholder.fragments[0].kind,
        FragmentKind::BlockPlaceholder
    ));
    let block_box = &laid.children[1];
    assert!(
        (block_box.dimensions.content.y - LINE).abs() < EPSILON,
        "the block sits between the two lines"
    );
    assert!((laid.line_boxes[2].rect.y - (LINE + 10.0)).abs() < EPSILON);
    assert!((laid.dimensions.content.height - (2.0 * LINE + 10.0)).abs() < 0.1);
}

#[test]
fn test_inline_box_spanning_lines_keeps_edges_on_end_fragments() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let span = tree.append_element(root, "span");
    let _ = tree.append_text(span, "hello world again");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        root,
        ComputedStyle {
            width: px(100.0),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    assert_eq!(laid.line_boxes.len(), 3);
    let span_box = &laid.children[0];
    assert_eq!(span_box.fragments.len(), 3, "one fragment per line");
    assert!(matches!(
        span_box.fragments[0].kind,
        FragmentKind::InlineBox {
            first: true,
            last: false
        }
    ));
    assert!(matches!(
        span_box.fragments[1].kind,
        FragmentKind::InlineBox {
            first: false,
            last: false
        }
    ));
    assert!(matches!(
        span_box.fragments[2].kind,
        FragmentKind::InlineBox {
            first: false,
            last: true
        }
    ));
}

#[test]
fn test_atomic_inline_block_sits_on_the_line() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "p");
    let _ = tree.append_text(root, "ab");
    let span = tree.append_element(root, "span");
    let _ = tree.append_text(root, "cd");
    let mut styles = StyleMap::new();
    let _ = styles.insert(
        span,
        ComputedStyle {
            display: Some(DisplayValue::inline_block()),
            width: px(30.0),
            height: px(25.0),
            ..ComputedStyle::default()
        },
    );

    let laid = layout(&tree, &styles);
    assert_eq!(laid.line_boxes.len(), 1);
    let line = &laid.line_boxes[0];
    assert!(
        (line.rect.height - 25.0).abs() < EPSILON,
        "the tallest item sets the line height"
    );
    assert!((line.rect.width - (2.0 * CHAR + 30.0 + 2.0 * CHAR)).abs() < EPSILON);
    let span_box = &laid.children[1];
    assert!((span_box.dimensions.content.x - 2.0 * CHAR).abs() < EPSILON);
    assert!(span_box.dimensions.content.y.abs() < EPSILON);
    assert!((span_box.dimensions.content.width - 30.0).abs() < EPSILON);
    assert!((span_box.dimensions.content.height - 25.0).abs() < EPSILON);
}
