//! Fragment construction, the third phase of inline layout.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is called
//! a line box."
//!
//! Construction turns broken lines into positioned fragments. Every
//! fragment rect is final at the moment it is created; nothing revisits a
//! fragment to move it afterwards. When a float placed mid-pass would have
//! changed an earlier breaking decision, the whole pass is rerun from the
//! broken lines instead (see the pipeline driver in the flow module), which
//! is why construction works on a read-only box tree and returns the child
//! placements for the caller to apply once a pass is accepted.

use wallaby_common::warn_once;
use wallaby_dom::NodeId;

use crate::style::TextAlignValue;

use super::box_model::{Rect, Size};
use super::float::FloatManager;
use super::flow::measure_float_margin_box;
use super::inline::{BoxPath, FontMetrics, InlineItemKind};
use super::layout_box::{box_at_path, LayoutBox};
use super::line_breaker::LineInfo;

/// A positioned piece of inline content.
///
/// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around
/// the block-level box... splitting it into two boxes."
///
/// One inline element can contribute many fragments: one text fragment per
/// broken run, one inline-box fragment per line it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Position and size, in document coordinates.
    pub rect: Rect,
    /// The DOM node this fragment belongs to, when it has one. Text
    /// fragments come from anonymous boxes and carry no node.
    pub node: Option<NodeId>,
    /// What the fragment is.
    pub kind: FragmentKind,
}

/// The kinds of fragment inline layout produces.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentKind {
    /// A run of text, broken to fit its line.
    Text {
        /// The text placed in this fragment.
        text: String,
        /// Font size the run was measured with, in pixels.
        font_size: f32,
    },

    /// An atomic inline-level box. The fragment rect is its margin box;
    /// the box's own subtree is laid out within it.
    Atomic,

    /// A float that was placed from inline content. The rect is the
    /// float's margin box; it sits outside the line's flow.
    Float,

    /// Zero-size marker recording where an in-flow block-level child
    /// interrupted the inline content.
    BlockPlaceholder,

    /// The extent of a non-atomic inline box on one line.
    ///
    /// [§ 4.9 Splitting inlines](https://html.spec.whatwg.org/)
    /// A box split across lines or around a block keeps its left edges only
    /// on its first fragment and its right edges only on its last.
    InlineBox {
        /// True when this is the box's first fragment, carrying the left
        /// margin, border, and padding.
        first: bool,
        /// True when this is the box's last fragment, carrying the right
        /// margin, border, and padding.
        last: bool,
    },
}

/// A completed line of fragments.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "Line boxes are stacked with no vertical separation (except as specified
/// elsewhere) and they never overlap."
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// The content extent of the line, in document coordinates. The rect
    /// starts where the first fragment starts, after float offsets and
    /// text alignment.
    pub rect: Rect,

    /// Baseline position relative to the line top.
    ///
    /// Simplified: 80% of the line height, approximating typical font
    /// metrics where the ascender is about 80% of the em square.
    // TODO: derive from FontMetrics once the trait exposes ascent/descent.
    pub baseline: f32,

    /// The fragments on this line, in paint order: floats, then inline
    /// boxes interleaved with the text they surround.
    pub fragments: Vec<Fragment>,
}

/// An inline box that is still open while lines are being constructed.
///
/// The stack of these survives across lines, and across the block-level
/// interruptions that split one inline formatting context into several
/// construction runs, so that first/last fragment flags stay accurate.
#[derive(Debug, Clone)]
pub struct OpenInlineState {
    /// Path to the open inline box from its block container.
    pub box_path: BoxPath,
    /// Whether any fragment has been emitted for this box yet.
    pub emitted: bool,
}

/// Band geometry a constructed line actually received, used by the pipeline
/// driver to check that breaking assumptions still hold after this pass's
/// floats landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineBand {
    pub left_offset: f32,
    pub available_width: f32,
}

/// A child box the accepted pass must lay out at a now-final position.
#[derive(Debug, Clone)]
pub(crate) enum ChildPlacement {
    /// An atomic inline whose margin box lands at the given origin.
    Atomic {
        box_path: BoxPath,
        margin_x: f32,
        margin_y: f32,
    },
    /// A float placed at the given margin box.
    Float { box_path: BoxPath, margin_box: Rect },
}

/// Everything one construction pass produced.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstructOutcome {
    /// Completed line boxes for the block container.
    pub line_boxes: Vec<LineBox>,
    /// Actual band per line, parallel to the input lines.
    pub bands: Vec<LineBand>,
    /// Child boxes to lay out once the pass is accepted.
    pub placements: Vec<ChildPlacement>,
    /// Inline-box fragments to attach to their owning boxes once the pass
    /// is accepted, keyed by box path.
    pub stitches: Vec<(BoxPath, Fragment)>,
}

/// Shared inputs for one inline pipeline run over a block container.
pub(crate) struct InlinePass<'a> {
    /// The block container whose inline content is being laid out. Read
    /// only; accepted placements are applied by the caller.
    pub block: &'a LayoutBox,
    pub metrics: &'a dyn FontMetrics,
    pub viewport: Size,
    /// Document X of the container's content-left edge.
    pub content_origin_x: f32,
    /// The container's resolved content width.
    pub containing_width: f32,
    /// The container's own line height, used for band probes.
    pub strut_height: f32,
}

/// Construct positioned fragments for a set of broken lines.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "The current and subsequent line boxes created next to the float are
/// shortened as necessary to make room for the margin box of the float."
///
/// Per line: the line's floats are placed first, the band is requeried so
/// text starts past any new left-side float, and items are then positioned
/// left to right. Floats placed here stay in `floats`, so each later line
/// (and each later pass) sees them.
#[must_use]
pub(crate) fn construct_fragments(
    pass: &InlinePass<'_>,
    lines: &[LineInfo],
    floats: &mut FloatManager,
    open_stack: &mut Vec<OpenInlineState>,
) -> ConstructOutcome {
    let mut constructor = FragmentConstructor {
        pass,
        floats,
        open_stack,
        frame_starts: Vec::new(),
        outcome: ConstructOutcome::default(),
    };
    constructor
        .frame_starts
        .resize(constructor.open_stack.len(), pass.content_origin_x);
    for line in lines {
        constructor.construct_line(line);
    }
    constructor.outcome
}

struct FragmentConstructor<'a, 'p> {
    pass: &'a InlinePass<'p>,
    floats: &'a mut FloatManager,
    open_stack: &'a mut Vec<OpenInlineState>,
    /// Where each open inline box's region starts on the current line,
    /// parallel to `open_stack`.
    frame_starts: Vec<f32>,
    outcome: ConstructOutcome,
}

impl FragmentConstructor<'_, '_> {
    fn construct_line(&mut self, line: &LineInfo) {
        let mut fragments = Vec::new();

        // STEP 1: Place this line's floats before anything else; their
        // exclusions shape where the line's content may sit.
        //
        // [§ 9.5.1 Rule 4]: "A floating box's outer top may not be higher
        // than the top of its containing block" and Rule 6 keeps it no
        // higher than its line, so the candidate position is the line top.
        for item in &line.items {
            let InlineItemKind::Float { box_path, side } = &item.kind else {
                continue;
            };
            let Some(child) = box_at_path(self.pass.block, box_path) else {
                continue;
            };
            let size = measure_float_margin_box(
                child,
                self.pass.metrics,
                self.pass.viewport,
                self.pass.containing_width,
            );
            let margin_box = self.floats.place(*side, size, line.y);
            self.outcome.placements.push(ChildPlacement::Float {
                box_path: box_path.clone(),
                margin_box,
            });
            fragments.push(Fragment {
                rect: margin_box,
                node: child.node_id(),
                kind: FragmentKind::Float,
            });
        }

        // STEP 2: Requery the band now that the line's floats exist. The
        // probe height matches the breaker's so both phases agree on which
        // floats intersect the line.
        let exclusions = self
            .floats
            .exclusion_space(self.pass.content_origin_x, self.pass.containing_width);
        let (left, right) =
            exclusions.available_inline_offsets(line.y, self.pass.strut_height);
        let available = (self.pass.containing_width - left - right).max(0.0);

        // STEP 3: Alignment offset from the slack left over on the line.
        //
        // [§ 16.2](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
        // "When the total width of the inline-level boxes on a line is less
        // than the width of the line box containing them, their horizontal
        // distribution within the line box is determined by the
        // 'text-align' property."
        let content_width: f32 = line.items.iter().map(|item| item.size.width).sum();
        let slack = (available - content_width).max(0.0);
        let shift = match self.pass.block.text_align {
            TextAlignValue::Left => 0.0,
            TextAlignValue::Right => slack,
            TextAlignValue::Center => slack / 2.0,
            TextAlignValue::Justify => {
                warn_once("Layout", "text-align: justify is not supported, treating as left");
                0.0
            }
        };
        let start_x = self.pass.content_origin_x + left + shift;

        // STEP 4: Open inline boxes carried over from earlier lines start
        // a new region at this line's start.
        for frame in &mut self.frame_starts {
            *frame = start_x;
        }

        // STEP 5: Position items left to right. Every rect is final here.
        let mut x = start_x;
        for item in &line.items {
            match &item.kind {
                InlineItemKind::Text { text, font_size } => {
                    fragments.push(Fragment {
                        rect: Rect {
                            x,
                            y: line.y,
                            width: item.size.width,
                            height: item.size.height,
                        },
                        node: None,
                        kind: FragmentKind::Text {
                            text: text.clone(),
                            font_size: *font_size,
                        },
                    });
                    x += item.size.width;
                }
                InlineItemKind::OpenTag { box_path } => {
                    self.open_stack.push(OpenInlineState {
                        box_path: box_path.clone(),
                        emitted: false,
                    });
                    self.frame_starts.push(x);
                    x += item.size.width;
                }
                InlineItemKind::CloseTag { .. } => {
                    x += item.size.width;
                    self.close_inline_box(line, x, &mut fragments);
                }
                InlineItemKind::Atomic { box_path } => {
                    let node = box_at_path(self.pass.block, box_path)
                        .and_then(LayoutBox::node_id);
                    self.outcome.placements.push(ChildPlacement::Atomic {
                        box_path: box_path.clone(),
                        margin_x: x,
                        margin_y: line.y,
                    });
                    fragments.push(Fragment {
                        rect: Rect {
                            x,
                            y: line.y,
                            width: item.size.width,
                            height: item.size.height,
                        },
                        node,
                        kind: FragmentKind::Atomic,
                    });
                    x += item.size.width;
                }
                InlineItemKind::BlockChild { box_path } => {
                    let node = box_at_path(self.pass.block, box_path)
                        .and_then(LayoutBox::node_id);
                    fragments.push(Fragment {
                        rect: Rect {
                            x,
                            y: line.y,
                            width: 0.0,
                            height: 0.0,
                        },
                        node,
                        kind: FragmentKind::BlockPlaceholder,
                    });
                }
                // Floats were placed in STEP 1; forced breaks occupy
                // nothing.
                InlineItemKind::Float { .. } | InlineItemKind::Control => {}
            }
        }

        // STEP 6: Inline boxes still open at the line's end contributed a
        // region to this line; record it with the right edge withheld.
        if line.height > 0.0 {
            for (state, &start) in self.open_stack.iter_mut().zip(&self.frame_starts) {
                let node = box_at_path(self.pass.block, &state.box_path)
                    .and_then(LayoutBox::node_id);
                let fragment = Fragment {
                    rect: Rect {
                        x: start,
                        y: line.y,
                        width: x - start,
                        height: line.height,
                    },
                    node,
                    kind: FragmentKind::InlineBox {
                        first: !state.emitted,
                        last: false,
                    },
                };
                state.emitted = true;
                self.outcome
                    .stitches
                    .push((state.box_path.clone(), fragment.clone()));
                fragments.push(fragment);
            }
        }

        // STEP 7: Record the completed line and the band it used.
        self.outcome.bands.push(LineBand {
            left_offset: left,
            available_width: available,
        });
        self.outcome.line_boxes.push(LineBox {
            rect: Rect {
                x: start_x,
                y: line.y,
                width: content_width,
                height: line.height,
            },
            baseline: line.height * 0.8,
            fragments,
        });
    }

    /// Pop the innermost open inline box and emit its final fragment,
    /// ending at `end_x`.
    fn close_inline_box(&mut self, line: &LineInfo, end_x: f32, fragments: &mut Vec<Fragment>) {
        let Some(state) = self.open_stack.pop() else {
            return;
        };
        let start = self.frame_starts.pop().unwrap_or(self.pass.content_origin_x);
        let node = box_at_path(self.pass.block, &state.box_path).and_then(LayoutBox::node_id);
        let fragment = Fragment {
            rect: Rect {
                x: start,
                y: line.y,
                width: end_x - start,
                height: line.height,
            },
            node,
            kind: FragmentKind::InlineBox {
                first: !state.emitted,
                last: true,
            },
        };
        self.outcome
            .stitches
            .push((state.box_path, fragment.clone()));
        fragments.push(fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::super::inline::{ApproximateFontMetrics, InlineItem};
    use super::super::layout_box::BoxType;
    use super::*;
    use crate::style::DisplayValue;

    fn text_line(text: &str, font_size: f32, y: f32, available: f32) -> LineInfo {
        let metrics = ApproximateFontMetrics;
        let width = metrics.text_width(text, font_size);
        LineInfo {
            items: vec![InlineItem {
                kind: InlineItemKind::Text {
                    text: text.to_string(),
                    font_size,
                },
                size: Size {
                    width,
                    height: metrics.line_height(font_size),
                },
            }],
            y,
            height: metrics.line_height(font_size),
            left_offset: 0.0,
            available_width: available,
        }
    }

    // ========== alignment ==========

    #[test]
    fn centered_line_splits_slack_evenly() {
        let metrics = ApproximateFontMetrics;
        let mut block = LayoutBox::new(BoxType::Principal(NodeId(1)), DisplayValue::block());
        block.text_align = TextAlignValue::Center;
        let pass = InlinePass {
            block: &block,
            metrics: &metrics,
            viewport: Size {
                width: 800.0,
                height: 600.0,
            },
            content_origin_x: 0.0,
            containing_width: 100.0,
            strut_height: 19.2,
        };
        // "hello" at size 10 is 30px wide; slack is 70px, shift 35px.
        let lines = vec![text_line("hello", 10.0, 0.0, 100.0)];
        let mut floats = FloatManager::new(0.0, 100.0);
        let mut open_stack = Vec::new();
        let outcome = construct_fragments(&pass, &lines, &mut floats, &mut open_stack);
        assert!((outcome.line_boxes[0].rect.x - 35.0).abs() < 0.01);
        assert!((outcome.line_boxes[0].fragments[0].rect.x - 35.0).abs() < 0.01);
    }

    #[test]
    fn right_aligned_line_ends_at_right_edge() {
        let metrics = ApproximateFontMetrics;
        let mut block = LayoutBox::new(BoxType::Principal(NodeId(1)), DisplayValue::block());
        block.text_align = TextAlignValue::Right;
        let pass = InlinePass {
            block: &block,
            metrics: &metrics,
            viewport: Size {
                width: 800.0,
                height: 600.0,
            },
            content_origin_x: 0.0,
            containing_width: 100.0,
            strut_height: 19.2,
        };
        let lines = vec![text_line("hello", 10.0, 0.0, 100.0)];
        let mut floats = FloatManager::new(0.0, 100.0);
        let mut open_stack = Vec::new();
        let outcome = construct_fragments(&pass, &lines, &mut floats, &mut open_stack);
        let line = &outcome.line_boxes[0];
        assert!((line.rect.right() - 100.0).abs() < 0.01);
    }

    // ========== inline box regions ==========

    #[test]
    fn closed_inline_box_fragment_is_first_and_last() {
        let metrics = ApproximateFontMetrics;
        let mut block = LayoutBox::new(BoxType::Principal(NodeId(1)), DisplayValue::block());
        let span = LayoutBox::new(BoxType::Principal(NodeId(2)), DisplayValue::inline());
        block.children.push(span);
        let pass = InlinePass {
            block: &block,
            metrics: &metrics,
            viewport: Size {
                width: 800.0,
                height: 600.0,
            },
            content_origin_x: 0.0,
            containing_width: 200.0,
            strut_height: 19.2,
        };
        let lines = vec![LineInfo {
            items: vec![
                InlineItem {
                    kind: InlineItemKind::OpenTag { box_path: vec![0] },
                    size: Size {
                        width: 4.0,
                        height: 0.0,
                    },
                },
                InlineItem {
                    kind: InlineItemKind::Text {
                        text: "hi".to_string(),
                        font_size: 10.0,
                    },
                    size: Size {
                        width: 12.0,
                        height: 12.0,
                    },
                },
                InlineItem {
                    kind: InlineItemKind::CloseTag { box_path: vec![0] },
                    size: Size {
                        width: 4.0,
                        height: 0.0,
                    },
                },
            ],
            y: 0.0,
            height: 12.0,
            left_offset: 0.0,
            available_width: 200.0,
        }];
        let mut floats = FloatManager::new(0.0, 200.0);
        let mut open_stack = Vec::new();
        let outcome = construct_fragments(&pass, &lines, &mut floats, &mut open_stack);

        assert!(open_stack.is_empty());
        assert_eq!(outcome.stitches.len(), 1);
        let (path, fragment) = &outcome.stitches[0];
        assert_eq!(path, &vec![0]);
        assert_eq!(fragment.node, Some(NodeId(2)));
        assert!((fragment.rect.width - 20.0).abs() < 0.01);
        assert_eq!(
            fragment.kind,
            FragmentKind::InlineBox {
                first: true,
                last: true
            }
        );
    }

    #[test]
    fn block_interruption_keeps_inline_box_open() {
        let metrics = ApproximateFontMetrics;
        let mut block = LayoutBox::new(BoxType::Principal(NodeId(1)), DisplayValue::block());
        let span = LayoutBox::new(BoxType::Principal(NodeId(2)), DisplayValue::inline());
        block.children.push(span);
        let pass = InlinePass {
            block: &block,
            metrics: &metrics,
            viewport: Size {
                width: 800.0,
                height: 600.0,
            },
            content_origin_x: 0.0,
            containing_width: 200.0,
            strut_height: 19.2,
        };
        // A segment that opens the span and ends without closing it.
        let lines = vec![LineInfo {
            items: vec![
                InlineItem {
                    kind: InlineItemKind::OpenTag { box_path: vec![0] },
                    size: Size {
                        width: 0.0,
                        height: 0.0,
                    },
                },
                InlineItem {
                    kind: InlineItemKind::Text {
                        text: "before".to_string(),
                        font_size: 10.0,
                    },
                    size: Size {
                        width: 36.0,
                        height: 12.0,
                    },
                },
            ],
            y: 0.0,
            height: 12.0,
            left_offset: 0.0,
            available_width: 200.0,
        }];
        let mut floats = FloatManager::new(0.0, 200.0);
        let mut open_stack = Vec::new();
        let outcome = construct_fragments(&pass, &lines, &mut floats, &mut open_stack);

        assert_eq!(open_stack.len(), 1);
        assert!(open_stack[0].emitted);
        let (_, fragment) = &outcome.stitches[0];
        assert_eq!(
            fragment.kind,
            FragmentKind::InlineBox {
                first: true,
                last: false
            }
        );
    }

    // ========== placeholders ==========

    #[test]
    fn block_child_produces_zero_size_placeholder() {
        let metrics = ApproximateFontMetrics;
        let mut block = LayoutBox::new(BoxType::Principal(NodeId(1)), DisplayValue::block());
        let child = LayoutBox::new(BoxType::Principal(NodeId(2)), DisplayValue::block());
        block.children.push(child);
        let pass = InlinePass {
            block: &block,
            metrics: &metrics,
            viewport: Size {
                width: 800.0,
                height: 600.0,
            },
            content_origin_x: 0.0,
            containing_width: 200.0,
            strut_height: 19.2,
        };
        let lines = vec![LineInfo {
            items: vec![InlineItem {
                kind: InlineItemKind::BlockChild { box_path: vec![0] },
                size: Size::default(),
            }],
            y: 5.0,
            height: 0.0,
            left_offset: 0.0,
            available_width: 200.0,
        }];
        let mut floats = FloatManager::new(0.0, 200.0);
        let mut open_stack = Vec::new();
        let outcome = construct_fragments(&pass, &lines, &mut floats, &mut open_stack);
        let fragment = &outcome.line_boxes[0].fragments[0];
        assert_eq!(fragment.kind, FragmentKind::BlockPlaceholder);
        assert!((fragment.rect.width - 0.0).abs() < f32::EPSILON);
        assert!((fragment.rect.height - 0.0).abs() < f32::EPSILON);
        assert_eq!(fragment.node, Some(NodeId(2)));
    }
}
