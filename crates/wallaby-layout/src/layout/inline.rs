//! Inline item collection, the first phase of inline layout.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block. Horizontal
//! margins, borders, and padding are respected between these boxes."
//!
//! Inline layout runs in three phases. This module implements the first:
//! flattening a block container's inline-level descendants into a list of
//! measured [`InlineItem`]s. The list is immutable afterwards; line
//! breaking chooses where to cut it and fragment construction decides where
//! each piece lands. Collection touches no positions, so the later phases
//! can run repeatedly over the same items.

use crate::style::InnerDisplayType;

use super::box_model::Size;
use super::exclusion::FloatSide;
use super::flow::measure_atomic_margin_box;
use super::layout_box::{BoxType, FirstLetterStyle, LayoutBox};

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Implementors provide the per-glyph advance widths and line height
/// values needed for inline layout. The engine never reads font files
/// itself; embedders with real shaping plug in here.
pub trait FontMetrics {
    /// Measure the total advance width of a text string at the given font size.
    ///
    /// This should sum the advance width of each glyph in the string,
    /// matching the cursor advancement used during text rendering.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Calculate the line height for a given font size.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "The initial value of 'line-height' is 'normal'. We recommend a used
    /// value for 'normal' between 1.0 and 1.2."
    fn line_height(&self, font_size: f32) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// Implementation note: Without access to actual font data, we use fixed
/// ratio approximations. The average advance width of Latin glyphs in a
/// proportional font is approximately 0.6x the font size (typical for
/// Helvetica/Arial body text). Line height uses 1.2x, the upper end of
/// the spec's recommended range for `line-height: normal`.
///
/// This is the default metrics provider, and what the tests use.
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        #[allow(clippy::cast_precision_loss)]
        let char_count = text.chars().count() as f32;
        char_count * font_size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, font_size: f32) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        font_size * LINE_HEIGHT_RATIO
    }
}

/// Path from a block container to one of its descendant boxes, as child
/// indices at each level.
///
/// Items and fragments use paths rather than references so the collected
/// list borrows nothing from the box tree; the flow builder resolves a path
/// back to a `&mut LayoutBox` when it needs to lay the descendant out.
pub type BoxPath = Vec<usize>;

/// What a single inline item is.
///
/// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
#[derive(Debug, Clone, PartialEq)]
pub enum InlineItemKind {
    /// A run of text with collapsed whitespace.
    ///
    /// [§ 2.5 Text Runs](https://www.w3.org/TR/css-display-3/#text-nodes)
    /// "A text run is a maximal sequence of consecutive text nodes."
    Text {
        /// Text content after whitespace collapsing.
        text: String,
        /// Font size used to measure this run, in pixels.
        font_size: f32,
    },

    /// Start of a non-atomic inline box. The item width is the box's left
    /// margin, border, and padding.
    ///
    /// "Horizontal margins, borders, and padding are respected between
    /// these boxes."
    OpenTag {
        /// The inline box this marker opens.
        box_path: BoxPath,
    },

    /// End of a non-atomic inline box. The item width is the box's right
    /// margin, border, and padding.
    CloseTag {
        /// The inline box this marker closes.
        box_path: BoxPath,
    },

    /// An atomic inline-level box: a replaced element or an inline-level
    /// block container. Participates as a single opaque rectangle.
    ///
    /// [§ 9.2.2](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    /// "Inline-level boxes that are not inline boxes (such as replaced
    /// inline-level elements, inline-block elements...) are called atomic
    /// inline-level boxes because they participate in their inline
    /// formatting context as a single opaque box."
    Atomic {
        /// The atomic box.
        box_path: BoxPath,
    },

    /// A floated box encountered in inline content. Consumes no inline
    /// width; fragment construction places it and narrows the affected
    /// lines instead.
    ///
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    /// "Since a float is not in the flow, non-positioned block boxes created
    /// before and after the float box flow vertically as if the float did
    /// not exist."
    Float {
        /// The floated box.
        box_path: BoxPath,
        /// Which side the box floats to.
        side: FloatSide,
    },

    /// A forced line break (`<br>`).
    ///
    /// [§ 16.6.1 The 'white-space' processing model](https://www.w3.org/TR/CSS2/text.html#white-space-model)
    /// "A line break is forced at a preserved newline."
    Control,

    /// An in-flow block-level box interrupting the inline content. Always
    /// breaks the current line; the block is laid out between the line
    /// before it and the line after it.
    ///
    /// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    /// "When an inline box contains an in-flow block-level box, the inline
    /// box (and its inline ancestors within the same line box) are broken
    /// around the block-level box."
    BlockChild {
        /// The interrupting block-level box.
        box_path: BoxPath,
    },
}

/// One measured unit of inline content.
///
/// Sizes are fixed at collection time. Width is the inline advance the
/// item consumes on a line; height is its contribution to the line box
/// height. Floats and block children carry zero size because they do not
/// occupy inline space themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineItem {
    /// What the item is.
    pub kind: InlineItemKind,
    /// Measured advance width and line-height contribution.
    pub size: Size,
}

impl InlineItem {
    /// True for the marker items that open or close an inline box.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(
            self.kind,
            InlineItemKind::OpenTag { .. } | InlineItemKind::CloseTag { .. }
        )
    }
}

/// Flatten a block container's inline-level content into measured items.
///
/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// Walks `block`'s children depth-first, collapsing whitespace across item
/// boundaries, splitting off the first letter when the block carries
/// `::first-letter` styling, and measuring every item with `metrics`.
/// `containing_width` is the block's resolved content width, needed for
/// percentage margins and padding on inline boxes and for atomic
/// shrink-to-fit measurement.
///
/// The walk reads the box tree without modifying it.
#[must_use]
pub fn collect_inline_items(
    block: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    containing_width: f32,
) -> Vec<InlineItem> {
    let mut collector = ItemCollector {
        metrics,
        viewport,
        containing_width,
        strut_height: block.line_height,
        items: Vec::new(),
        after_space: true,
        first_letter: block.first_letter,
    };
    for (index, child) in block.children.iter().enumerate() {
        collector.collect_box(child, vec![index]);
    }
    collector.items
}

/// Collection state threaded through the box walk.
struct ItemCollector<'a> {
    metrics: &'a dyn FontMetrics,
    viewport: Size,
    containing_width: f32,
    /// The block's own line height; the minimum a forced break advances.
    strut_height: f32,
    items: Vec<InlineItem>,
    /// Whether collapsed output so far ends in a space (or nothing has been
    /// emitted yet), so the next run's leading whitespace collapses away.
    after_space: bool,
    /// Pending `::first-letter` styling, consumed by the first text run.
    first_letter: Option<FirstLetterStyle>,
}

impl ItemCollector<'_> {
    fn collect_box(&mut self, child: &LayoutBox, path: BoxPath) {
        // STEP 1: Out-of-flow boxes first; they never contribute inline
        // content of their own.
        if let Some(side) = child.float_side {
            self.items.push(InlineItem {
                kind: InlineItemKind::Float {
                    box_path: path,
                    side,
                },
                size: Size::default(),
            });
            return;
        }
        if child.position.is_absolutely_positioned() {
            // Absolutely positioned boxes are laid out by their containing
            // block after normal flow completes; nothing to collect here.
            return;
        }

        // STEP 2: Block-level children interrupt the inline content.
        if !child.is_inline_level() {
            self.first_letter = None;
            self.after_space = true;
            self.items.push(InlineItem {
                kind: InlineItemKind::BlockChild { box_path: path },
                size: Size::default(),
            });
            return;
        }

        // STEP 3: Inline-level boxes by type.
        match &child.box_type {
            BoxType::AnonymousInline(text) => self.collect_text(text, child),
            BoxType::LineBreak => {
                self.first_letter = None;
                self.after_space = true;
                self.items.push(InlineItem {
                    kind: InlineItemKind::Control,
                    size: Size {
                        width: 0.0,
                        height: self.strut_height,
                    },
                });
            }
            BoxType::Principal(_) => {
                if is_atomic_inline(child) {
                    self.first_letter = None;
                    self.after_space = false;
                    let size =
                        measure_atomic_margin_box(child, self.metrics, self.viewport, self.containing_width);
                    self.items.push(InlineItem {
                        kind: InlineItemKind::Atomic { box_path: path },
                        size,
                    });
                } else {
                    self.collect_inline_box(child, path);
                }
            }
        }
    }

    /// [§ 9.2.2 Inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// A non-atomic inline box contributes an open marker carrying its left
    /// edges, its flattened children, and a close marker carrying its right
    /// edges.
    fn collect_inline_box(&mut self, child: &LayoutBox, path: BoxPath) {
        // Markers are elided when the inline box contains only block-level
        // children: every line it would mark is already broken around
        // those blocks, so its horizontal edges have no line to sit on.
        let elide_markers = has_only_block_level_children(child);

        if !elide_markers {
            let (left_width, right_width) = self.inline_edge_widths(child);
            self.items.push(InlineItem {
                kind: InlineItemKind::OpenTag {
                    box_path: path.clone(),
                },
                size: Size {
                    width: left_width,
                    height: 0.0,
                },
            });
            for (index, grandchild) in child.children.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(index);
                self.collect_box(grandchild, child_path);
            }
            self.items.push(InlineItem {
                kind: InlineItemKind::CloseTag {
                    box_path: path,
                },
                size: Size {
                    width: right_width,
                    height: 0.0,
                },
            });
            return;
        }

        for (index, grandchild) in child.children.iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(index);
            self.collect_box(grandchild, child_path);
        }
    }

    /// [§ 4.1.1 The White Space Processing Rules](https://www.w3.org/TR/css-text-3/#white-space-rules)
    ///
    /// "Any sequence of collapsible spaces and tabs immediately preceding or
    /// following a segment break is removed... any collapsible segment break
    /// is converted to a space... every collapsible tab is converted to a
    /// space... any collapsible space immediately following another
    /// collapsible space... is collapsed."
    fn collect_text(&mut self, text: &str, text_box: &LayoutBox) {
        let collapsed = collapse_whitespace(text, self.after_space);
        if collapsed.is_empty() {
            return;
        }
        self.after_space = collapsed.ends_with(' ');

        // [§ 5.1 The ::first-letter pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-letter)
        //
        // "The first letter must occur on the first formatted line."
        //
        // The first text run of the block surrenders its first character to
        // a separate item measured with the first-letter styling.
        if let Some(letter_style) = self.first_letter.take() {
            if let Some(first_char) = collapsed.chars().next() {
                let split = first_char.len_utf8();
                let (letter, rest) = collapsed.split_at(split);
                self.push_text_item(letter, letter_style.font_size, letter_style.line_height);
                if !rest.is_empty() {
                    self.push_text_item(rest, text_box.font_size, text_box.line_height);
                }
                return;
            }
        }

        self.push_text_item(&collapsed, text_box.font_size, text_box.line_height);
    }

    fn push_text_item(&mut self, text: &str, font_size: f32, line_height: f32) {
        let width = self.metrics.text_width(text, font_size);
        self.items.push(InlineItem {
            kind: InlineItemKind::Text {
                text: text.to_string(),
                font_size,
            },
            size: Size {
                width,
                height: line_height,
            },
        });
    }

    /// [§ 10.3.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-width)
    ///
    /// "A computed value of 'auto' for 'margin-left' or 'margin-right'
    /// becomes a used value of '0'."
    ///
    /// Resolved left and right margin+border+padding widths for an inline
    /// box's open and close markers.
    fn inline_edge_widths(&self, child: &LayoutBox) -> (f32, f32) {
        let margin = child
            .margin
            .resolve(child.font_size, self.viewport, self.containing_width);
        let padding = child
            .padding
            .resolve(child.font_size, self.viewport, self.containing_width);
        let border = child
            .border_width
            .resolve(child.font_size, self.viewport, self.containing_width);
        let left = margin.left.to_px_or(0.0) + border.left + padding.left;
        let right = margin.right.to_px_or(0.0) + border.right + padding.right;
        (left, right)
    }
}

/// True for inline-level boxes that participate as a single opaque box.
///
/// [§ 9.2.2](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
fn is_atomic_inline(child: &LayoutBox) -> bool {
    child.is_replaced || !matches!(child.display.inner, InnerDisplayType::Flow)
}

/// True when every in-flow child of an inline box is block-level (and
/// there is at least one), so the box's open and close markers are elided.
fn has_only_block_level_children(child: &LayoutBox) -> bool {
    let mut any = false;
    for grandchild in child.children.iter().filter(|c| c.is_in_flow()) {
        if grandchild.is_inline_level() {
            return false;
        }
        any = true;
    }
    any
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// Collapse each run of whitespace to a single space. When `after_space`
/// is true the output of the inline formatting context so far already ends
/// in a space (or is empty), so a leading run collapses to nothing.
fn collapse_whitespace(text: &str, after_space: bool) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut prev_space = after_space;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                collapsed.push(' ');
            }
            prev_space = true;
        } else {
            collapsed.push(ch);
            prev_space = false;
        }
    }
    collapsed
}
