//! The flow builder: recursive block-and-inline layout.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! "Boxes in the normal flow belong to a formatting context, which may be
//! block or inline, but not both simultaneously. Block-level boxes
//! participate in a block formatting context. Inline-level boxes
//! participate in an inline formatting context."
//!
//! The builder walks the box tree once, top down. A box's width and
//! position are computed before its children are visited, children stack
//! inside it, and its height is computed from their extent afterwards.
//! Every rect is written at its final document position the first time it
//! is written; when something cannot be positioned until a later decision
//! is made (a float awaiting placement, an atomic inline awaiting its
//! line), the decision is made first on measured sizes and the subtree is
//! then laid out exactly once at the decided origin.
//!
//! All traversal state lives in a [`LayoutContext`] threaded down the
//! recursion explicitly; nothing is global.

use wallaby_common::warn_once;
use wallaby_dom::DomTree;

use crate::style::{AutoLength, BoxSizingValue, LengthValue, PositionValue, StyleMap};

use super::box_model::{Rect, Size};
use super::constraint::ConstraintSpace;
use super::float::{ClearSide, FloatManager};
use super::fragment::{
    construct_fragments, ChildPlacement, ConstructOutcome, InlinePass, LineBox, OpenInlineState,
};
use super::inline::{collect_inline_items, BoxPath, FontMetrics, InlineItem, InlineItemKind};
use super::intrinsic::shrink_to_fit_width;
use super::layout_box::{
    box_at_path_mut, build_box_tree, LayoutBox, ReplacedSizes, FALLBACK_REPLACED_HEIGHT,
    FALLBACK_REPLACED_WIDTH,
};
use super::line_breaker::break_into_lines;
use super::values::{AutoOr, UnresolvedAutoEdgeSizes};

/// Upper bound on inline pipeline reruns per segment.
///
/// Floats placed during fragment construction can invalidate the band
/// assumptions the line breaker already committed to; each rerun re-breaks
/// against the previous attempt's exclusions. Two attempts settle almost
/// everything in practice; the last attempt is accepted even when bands
/// still moved, trading exactness for termination.
const MAX_INLINE_ATTEMPTS: usize = 3;

/// Tolerance when comparing a line's assumed band against the band it
/// actually received.
const BAND_EPSILON: f32 = 0.01;

/// Mutable traversal state threaded through one layout pass.
///
/// Two passes over two documents in two contexts cannot observe each
/// other.
pub struct LayoutContext<'a> {
    /// Text measurement for all inline sizing.
    pub metrics: &'a dyn FontMetrics,
    /// Viewport size; resolves `vw`/`vh` units and anchors fixed
    /// positioning.
    pub viewport: Size,
    /// Floats active in the current block formatting context.
    pub floats: FloatManager,
}

impl<'a> LayoutContext<'a> {
    /// A context for a document laid out against `viewport`.
    #[must_use]
    pub fn new(metrics: &'a dyn FontMetrics, viewport: Size) -> Self {
        Self {
            metrics,
            viewport,
            floats: FloatManager::new(0.0, viewport.width),
        }
    }
}

/// Lay out a whole document: build the box tree for the DOM, then run flow
/// layout with the viewport as the initial containing block.
///
/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "The containing block in which the root element lives is a rectangle
/// called the initial containing block... it has the dimensions of the
/// viewport."
///
/// Returns `None` when the DOM generates no boxes at all.
#[must_use]
pub fn layout_document(
    tree: &DomTree,
    styles: &StyleMap,
    viewport: Size,
    metrics: &dyn FontMetrics,
    replaced_sizes: &ReplacedSizes,
) -> Option<LayoutBox> {
    let mut root = build_box_tree(tree, styles, tree.root(), replaced_sizes, viewport)?;
    let initial_containing_block = Rect {
        x: 0.0,
        y: 0.0,
        width: viewport.width,
        height: viewport.height,
    };
    let mut ctx = LayoutContext::new(metrics, viewport);
    layout_tree(&mut root, initial_containing_block, &mut ctx);
    Some(root)
}

/// Lay out an already-built box tree.
///
/// `containing_block` positions the root box's margin box and serves as
/// the fallback containing block for absolutely positioned descendants
/// with no positioned ancestor.
pub fn layout_tree(root: &mut LayoutBox, containing_block: Rect, ctx: &mut LayoutContext<'_>) {
    layout_subtree(root, containing_block, containing_block, ctx);
}

/// Lay out one box and its subtree against a containing block.
///
/// The containing block's origin is where the box's margin box starts;
/// `absolute_cb` is the containing block its absolutely positioned
/// descendants use, per §10.1.
fn layout_subtree(
    layout_box: &mut LayoutBox,
    containing_block: Rect,
    absolute_cb: Rect,
    ctx: &mut LayoutContext<'_>,
) {
    #[cfg(feature = "layout-trace")]
    eprintln!(
        "[FLOW] {:?} cb=({:.1}, {:.1}, {:.1}x{:.1})",
        layout_box.box_type,
        containing_block.x,
        containing_block.y,
        containing_block.width,
        containing_block.height
    );
    if layout_box.is_replaced {
        layout_replaced(layout_box, containing_block, ctx);
    } else {
        layout_block(layout_box, containing_block, absolute_cb, ctx);
    }
}

/// Lay out one non-replaced box and its subtree as a block container.
///
/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "In a block formatting context, boxes are laid out one after the other,
/// vertically, beginning at the top of a containing block."
fn layout_block(
    layout_box: &mut LayoutBox,
    containing_block: Rect,
    absolute_cb: Rect,
    ctx: &mut LayoutContext<'_>,
) {
    // STEP 1: Width first; it depends only on the containing block.
    // Child widths never influence the parent's width, which is what makes
    // single-pass top-down layout possible.
    calculate_block_width(layout_box, containing_block, ctx);
    apply_min_max_width(layout_box, containing_block, ctx);

    // STEP 2: Position within the containing block, including any relative
    // offset.
    calculate_block_position(layout_box, containing_block, ctx.viewport);

    // An explicit height resolves before children so their percentage
    // heights have something definite to resolve against.
    let definite_height = resolve_definite_height(layout_box, containing_block, ctx.viewport);

    // STEP 3: The containing block for absolutely positioned descendants.
    //
    // [§ 10.1]: "If the element has 'position: absolute', the containing
    // block is established by the nearest ancestor with a 'position' of
    // 'absolute', 'relative' or 'fixed'... formed by the padding edge of
    // the ancestor."
    //
    // The padding box's height is not final yet; it is definite only when
    // this box's own height is.
    let child_absolute_cb = if is_positioned(layout_box) {
        let padding_box = layout_box.dimensions.padding_box();
        let height = definite_height.map_or(f32::INFINITY, |content_height| {
            content_height + layout_box.dimensions.padding.vertical()
        });
        Rect {
            height,
            ..padding_box
        }
    } else {
        absolute_cb
    };

    // STEP 4: Open a float scope when this box establishes a block
    // formatting context. The root box owns the initial context.
    let owns_float_scope = layout_box.establishes_bfc() || ctx.floats.at_root_scope();
    if owns_float_scope {
        ctx.floats.push_context(
            layout_box.dimensions.content.x,
            layout_box.dimensions.content.width,
        );
    }

    // STEP 5: Children. A block container holds either block-level boxes
    // or inline-level content at one level, never both; block-level
    // children interleaved into inline content are handled inside the
    // inline driver.
    let flow_bottom = if layout_box.establishes_inline_context() {
        layout_inline_children(layout_box, child_absolute_cb, definite_height, ctx)
    } else {
        layout_block_children(layout_box, child_absolute_cb, definite_height, ctx)
    };

    // STEP 6: Height, now that the children's extent is known.
    calculate_block_height(layout_box, definite_height, flow_bottom);

    // [§ 10.6.7]: "if the element has any floating descendants whose
    // bottom margin edge is below the element's bottom content edge, then
    // the height is increased to include those edges." Applies to block
    // formatting context roots only.
    if owns_float_scope && definite_height.is_none() {
        if let Some(float_bottom) = ctx.floats.max_float_bottom() {
            let content = &mut layout_box.dimensions.content;
            if float_bottom > content.y + content.height {
                content.height = float_bottom - content.y;
            }
        }
    }
    apply_min_max_height(layout_box, containing_block, ctx.viewport);

    if owns_float_scope {
        ctx.floats.pop_context();
    }

    // STEP 7: Absolutely positioned children, once this box's padding box
    // is final and can serve as their containing block.
    let final_absolute_cb = if is_positioned(layout_box) {
        layout_box.dimensions.padding_box()
    } else {
        absolute_cb
    };
    layout_absolute_children(layout_box, final_absolute_cb, ctx);
}

/// [§ 9.3.2](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// A box with any 'position' other than 'static' anchors absolutely
/// positioned descendants.
fn is_positioned(layout_box: &LayoutBox) -> bool {
    !matches!(layout_box.position, PositionValue::Static)
}

/// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width),
/// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced),
/// [§ 10.3.9](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
///
/// Boxes whose auto width shrinks to fit instead of filling the containing
/// block: floats, absolutely positioned boxes, and atomic inline-level
/// block containers. Their auto margins are zero; none of them use the
/// §10.3.3 constraint equation.
fn uses_shrink_to_fit(layout_box: &LayoutBox) -> bool {
    layout_box.float_side.is_some()
        || layout_box.position.is_absolutely_positioned()
        || layout_box.is_inline_level()
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "The following constraints must hold among the used values of the
/// properties: 'margin-left' + 'border-left-width' + 'padding-left' +
/// 'width' + 'padding-right' + 'border-right-width' + 'margin-right' =
/// width of containing block"
fn calculate_block_width(
    layout_box: &mut LayoutBox,
    containing_block: Rect,
    ctx: &LayoutContext<'_>,
) {
    let font_size = layout_box.font_size;
    let viewport = ctx.viewport;
    let cb_width = containing_block.width;

    // STEP 1: Resolve the horizontal edges and the specified width.
    let padding = layout_box.padding.resolve(font_size, viewport, cb_width);
    let border = layout_box.border_width.resolve(font_size, viewport, cb_width);
    let margin = layout_box.margin.resolve(font_size, viewport, cb_width);
    let edges = padding.horizontal() + border.horizontal();

    let width = layout_box.width.as_ref().map_or(AutoOr::Auto, |value| {
        UnresolvedAutoEdgeSizes::resolve_auto_length(value, font_size, viewport, cb_width)
    });

    // [§ 4.1 box-sizing]: "The size specified by width and height...
    // applies to the box's border box" - peel the edges off to get the
    // content width the rest of the algorithm works in.
    let width = match (width, layout_box.box_sizing) {
        (AutoOr::Length(outer), BoxSizingValue::BorderBox) => {
            AutoOr::Length((outer - edges).max(0.0))
        }
        _ => width,
    };

    // STEP 2: Out-of-flow and atomic boxes do not use the constraint
    // equation: auto widths shrink to fit and auto margins are zero.
    if uses_shrink_to_fit(layout_box) {
        let used_width = match width {
            AutoOr::Length(value) => value,
            AutoOr::Auto => shrink_to_fit_width(layout_box, ctx.metrics, viewport, cb_width),
        };
        let dims = &mut layout_box.dimensions;
        dims.content.width = used_width.max(0.0);
        dims.padding.left = padding.left;
        dims.padding.right = padding.right;
        dims.border.left = border.left;
        dims.border.right = border.right;
        dims.margin.left = margin.left.to_px_or(0.0);
        dims.margin.right = margin.right.to_px_or(0.0);
        return;
    }

    // STEP 3: "If 'width' is not 'auto' and [the total] is larger than the
    // width of the containing block, then any 'auto' values for
    // 'margin-left' or 'margin-right' are, for the following rules,
    // treated as zero."
    let mut margin_left = margin.left;
    let mut margin_right = margin.right;
    if let AutoOr::Length(value) = width {
        let total = margin_left.to_px_or(0.0) + edges + value + margin_right.to_px_or(0.0);
        if total > cb_width {
            if margin_left.is_auto() {
                margin_left = AutoOr::Length(0.0);
            }
            if margin_right.is_auto() {
                margin_right = AutoOr::Length(0.0);
            }
        }
    }

    // STEP 4: The constraint equation, by case.
    let (used_width, used_margin_left, used_margin_right) =
        match (width, margin_left, margin_right) {
            // RULE A: "If 'width' is set to 'auto', any other 'auto' values
            // become '0' and 'width' follows from the resulting equality."
            (AutoOr::Auto, left_margin, right_margin) => {
                let left = left_margin.to_px_or(0.0);
                let right = right_margin.to_px_or(0.0);
                ((cb_width - left - right - edges).max(0.0), left, right)
            }
            // RULE B: "If both 'margin-left' and 'margin-right' are 'auto',
            // their used values are equal. This horizontally centers the
            // element with respect to the edges of the containing block."
            (AutoOr::Length(value), AutoOr::Auto, AutoOr::Auto) => {
                let remaining = cb_width - value - edges;
                (value, remaining / 2.0, remaining / 2.0)
            }
            // RULE C: "If there is exactly one value specified as 'auto',
            // its used value follows from the equality."
            (AutoOr::Length(value), AutoOr::Auto, AutoOr::Length(right)) => {
                (value, cb_width - value - edges - right, right)
            }
            // RULE C mirrored, and RULE D: "If all of the above have a
            // computed value other than 'auto'... the values are said to be
            // over-constrained and... the specified value of 'margin-right'
            // is ignored and the value is calculated so as to make the
            // equality true." Identical arithmetic either way (ltr).
            (AutoOr::Length(value), AutoOr::Length(left), AutoOr::Auto | AutoOr::Length(_)) => {
                (value, left, cb_width - value - edges - left)
            }
        };

    // STEP 5: Store.
    let dims = &mut layout_box.dimensions;
    dims.content.width = used_width.max(0.0);
    dims.padding.left = padding.left;
    dims.padding.right = padding.right;
    dims.border.left = border.left;
    dims.border.right = border.right;
    dims.margin.left = used_margin_left;
    dims.margin.right = used_margin_right;
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// "If the tentative used width is greater than 'max-width', the rules
/// above are applied again, but this time using the computed value of
/// 'max-width' as the computed value for 'width'... If the resulting width
/// is smaller than 'min-width', the rules above are applied again, but
/// this time using the value of 'min-width' as the computed value for
/// 'width'."
///
/// Violations substitute the clamping value and rerun width calculation,
/// so auto margins redistribute against the clamped width. Applying min
/// after max is what makes min win.
fn apply_min_max_width(
    layout_box: &mut LayoutBox,
    containing_block: Rect,
    ctx: &LayoutContext<'_>,
) {
    // The clamp compares in the coordinate 'width' itself uses: the border
    // box under border-box sizing, the content box otherwise.
    let overhead = match layout_box.box_sizing {
        BoxSizingValue::BorderBox => {
            layout_box.dimensions.padding.horizontal() + layout_box.dimensions.border.horizontal()
        }
        BoxSizingValue::ContentBox => 0.0,
    };

    if let Some(max_width) = layout_box.max_width {
        let max_px = resolve_length(
            max_width,
            layout_box.font_size,
            ctx.viewport,
            containing_block.width,
        );
        if layout_box.dimensions.content.width + overhead > max_px {
            substitute_width(layout_box, max_px, containing_block, ctx);
        }
    }
    if let Some(min_width) = layout_box.min_width {
        let min_px = resolve_length(
            min_width,
            layout_box.font_size,
            ctx.viewport,
            containing_block.width,
        );
        if layout_box.dimensions.content.width + overhead < min_px {
            substitute_width(layout_box, min_px, containing_block, ctx);
        }
    }
}

/// Rerun width calculation with 'width' pinned to a clamp value, then
/// restore the specified width.
fn substitute_width(
    layout_box: &mut LayoutBox,
    width_px: f32,
    containing_block: Rect,
    ctx: &LayoutContext<'_>,
) {
    let specified = layout_box.width.take();
    layout_box.width = Some(AutoLength::Length(LengthValue::Px(f64::from(width_px))));
    calculate_block_width(layout_box, containing_block, ctx);
    layout_box.width = specified;
}

/// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// Position the box's content rect inside its containing block and resolve
/// the vertical edges. The containing block's origin is where the margin
/// box begins.
///
/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
/// "If 'margin-top' or 'margin-bottom' are 'auto', their used value is 0."
fn calculate_block_position(layout_box: &mut LayoutBox, containing_block: Rect, viewport: Size) {
    let font_size = layout_box.font_size;

    // Percentages on vertical padding and margins resolve against the
    // containing block's width, same as the horizontal ones.
    let margin = layout_box
        .margin
        .resolve(font_size, viewport, containing_block.width);
    let padding = layout_box
        .padding
        .resolve(font_size, viewport, containing_block.width);
    let border = layout_box
        .border_width
        .resolve(font_size, viewport, containing_block.width);

    let dims = &mut layout_box.dimensions;
    dims.margin.top = margin.top.to_px_or(0.0);
    dims.margin.bottom = margin.bottom.to_px_or(0.0);
    dims.padding.top = padding.top;
    dims.padding.bottom = padding.bottom;
    dims.border.top = border.top;
    dims.border.bottom = border.bottom;

    dims.content.x = containing_block.x + dims.margin.left + dims.border.left + dims.padding.left;
    dims.content.y = containing_block.y + dims.margin.top + dims.border.top + dims.padding.top;

    apply_relative_offsets(layout_box, containing_block, viewport);
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow... it may be
/// shifted relative to this position."
///
/// "If neither 'left' nor 'right' is 'auto', the position is
/// over-constrained... the value of 'left' wins" (ltr); likewise 'top'
/// wins over 'bottom', and a lone 'right' or 'bottom' moves the box the
/// other way.
///
/// The offset moves the box and everything inside it. Followers in normal
/// flow are positioned as if the box had not moved, which the block child
/// loop guarantees by advancing its cursor with margin-box heights rather
/// than positioned edges.
fn apply_relative_offsets(layout_box: &mut LayoutBox, containing_block: Rect, viewport: Size) {
    if !matches!(layout_box.position, PositionValue::Relative) {
        return;
    }
    let font_size = layout_box.font_size;
    let left = resolve_offset(
        layout_box.offsets.left,
        font_size,
        viewport,
        containing_block.width,
    );
    let right = resolve_offset(
        layout_box.offsets.right,
        font_size,
        viewport,
        containing_block.width,
    );
    let top = resolve_offset(
        layout_box.offsets.top,
        font_size,
        viewport,
        containing_block.height,
    );
    let bottom = resolve_offset(
        layout_box.offsets.bottom,
        font_size,
        viewport,
        containing_block.height,
    );

    let offset_x = match (left, right) {
        (AutoOr::Length(value), _) => value,
        (AutoOr::Auto, AutoOr::Length(value)) => -value,
        (AutoOr::Auto, AutoOr::Auto) => 0.0,
    };
    let offset_y = match (top, bottom) {
        (AutoOr::Length(value), _) => value,
        (AutoOr::Auto, AutoOr::Length(value)) => -value,
        (AutoOr::Auto, AutoOr::Auto) => 0.0,
    };
    layout_box.dimensions.content.x += offset_x;
    layout_box.dimensions.content.y += offset_y;
}

/// Resolve one box offset against a containing block dimension.
///
/// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// Left/right percentages refer to the containing block's width, top/bottom
/// percentages to its height; the caller passes the dimension accordingly.
/// An unset offset is `auto`, kept distinct from zero because the offset
/// equations assign it meaning, and a percentage against an indefinite
/// dimension behaves as `auto`.
fn resolve_offset(
    offset: Option<AutoLength>,
    font_size: f32,
    viewport: Size,
    cb_dimension: f32,
) -> AutoOr {
    let Some(value) = offset else {
        return AutoOr::Auto;
    };
    if matches!(value, AutoLength::Length(length) if length.is_percent())
        && !cb_dimension.is_finite()
    {
        return AutoOr::Auto;
    }
    let dimension = if cb_dimension.is_finite() {
        cb_dimension
    } else {
        0.0
    };
    UnresolvedAutoEdgeSizes::resolve_auto_length(&value, font_size, viewport, dimension)
}

/// Resolve an explicit height to a content height before children are laid
/// out; `None` when the height is auto.
///
/// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
///
/// "Percentage: Specifies a percentage height... calculated with respect
/// to the height of the generated box's containing block. If the height of
/// the containing block is not specified explicitly... the value computes
/// to 'auto'."
///
/// Requires the box's vertical padding and border to be resolved already,
/// for border-box sizing.
fn resolve_definite_height(
    layout_box: &LayoutBox,
    containing_block: Rect,
    viewport: Size,
) -> Option<f32> {
    let Some(AutoLength::Length(length)) = layout_box.height else {
        return None;
    };
    if length.is_percent() && !containing_block.height.is_finite() {
        return None;
    }
    let cb_height = if containing_block.height.is_finite() {
        containing_block.height
    } else {
        0.0
    };
    let resolved = resolve_length(length, layout_box.font_size, viewport, cb_height);
    let content_height = match layout_box.box_sizing {
        BoxSizingValue::BorderBox => {
            resolved
                - layout_box.dimensions.padding.vertical()
                - layout_box.dimensions.border.vertical()
        }
        BoxSizingValue::ContentBox => resolved,
    };
    Some(content_height.max(0.0))
}

/// [§ 10.6.3 Block-level non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
///
/// "If 'height' is 'auto', the height depends on whether the element has
/// any block-level children... the distance from its top content edge
/// to... the bottom edge of the bottom margin of its last in-flow child...
/// or the bottom border edge of its last in-flow child whose bottom margin
/// collapses with the element's bottom margin... or zero."
///
/// `flow_bottom` is the lowest margin-box bottom the child loop reached
/// (or the bottom of the last line box), tracked by the flow cursor rather
/// than read back from child rects, so a child's relative offset cannot
/// leak into the parent's height.
fn calculate_block_height(
    layout_box: &mut LayoutBox,
    definite_height: Option<f32>,
    flow_bottom: f32,
) {
    if let Some(height) = definite_height {
        layout_box.dimensions.content.height = height;
        return;
    }
    let mut height = (flow_bottom - layout_box.dimensions.content.y).max(0.0);
    if layout_box.collapsed_margin_bottom.is_some() {
        // The collapsed margin moved out of the box; its height ends at
        // the last child's border edge.
        let last_margin = layout_box
            .children
            .iter()
            .rev()
            .find(|child| child.is_in_flow())
            .map_or(0.0, LayoutBox::effective_margin_bottom);
        height = (height - last_margin).max(0.0);
    }
    layout_box.dimensions.content.height = height;
}

/// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
///
/// Heights clamp directly; no margin arithmetic depends on them. A
/// percentage min or max against an indefinite containing block height is
/// ignored, and min applied after max is what makes min win.
fn apply_min_max_height(layout_box: &mut LayoutBox, containing_block: Rect, viewport: Size) {
    let overhead = match layout_box.box_sizing {
        BoxSizingValue::BorderBox => {
            layout_box.dimensions.padding.vertical() + layout_box.dimensions.border.vertical()
        }
        BoxSizingValue::ContentBox => 0.0,
    };
    let font_size = layout_box.font_size;
    let cb_height = containing_block.height;
    let resolvable = move |length: LengthValue| -> Option<f32> {
        if length.is_percent() && !cb_height.is_finite() {
            return None;
        }
        let dimension = if cb_height.is_finite() { cb_height } else { 0.0 };
        Some(resolve_length(length, font_size, viewport, dimension))
    };

    if let Some(max_px) = layout_box.max_height.and_then(resolvable) {
        if layout_box.dimensions.content.height + overhead > max_px {
            layout_box.dimensions.content.height = (max_px - overhead).max(0.0);
        }
    }
    if let Some(min_px) = layout_box.min_height.and_then(resolvable) {
        if layout_box.dimensions.content.height + overhead < min_px {
            layout_box.dimensions.content.height = (min_px - overhead).max(0.0);
        }
    }
}

/// Resolve a plain length against a containing block dimension.
fn resolve_length(length: LengthValue, font_size: f32, viewport: Size, cb_dimension: f32) -> f32 {
    #[allow(clippy::cast_possible_truncation)]
    let value = length.resolve(
        f64::from(font_size),
        (f64::from(viewport.width), f64::from(viewport.height)),
        f64::from(cb_dimension),
    ) as f32;
    value
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "The maximum of the adjoining margin values... In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values of
/// the adjoining margins is deducted from zero."
///
/// For a pair that reduces to: two non-negatives take the maximum, two
/// negatives take the most negative, and a mixed pair sums.
#[must_use]
pub fn collapse_margins(first: f32, second: f32) -> f32 {
    if first >= 0.0 && second >= 0.0 {
        first.max(second)
    } else if first < 0.0 && second < 0.0 {
        first.min(second)
    } else {
        first + second
    }
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// The top margin a box will present to its previous sibling once its own
/// top margin collapses with its first in-flow child's, chained for as
/// long as nothing separates the margins.
///
/// Computed before the box is laid out so the flow cursor can position the
/// box against the collapsed value. Percentage margins below the first
/// level resolve against this containing width, the nearest known
/// stand-in for their real containing block.
fn effective_top_margin_of(child: &LayoutBox, viewport: Size, containing_width: f32) -> f32 {
    let margin_top = child
        .margin
        .resolve(child.font_size, viewport, containing_width)
        .top
        .to_px_or(0.0);
    if !child.participates_in_margin_collapsing() {
        return margin_top;
    }
    let padding_top = child
        .padding
        .resolve(child.font_size, viewport, containing_width)
        .top;
    let border_top = child
        .border_width
        .resolve(child.font_size, viewport, containing_width)
        .top;
    if padding_top > 0.0 || border_top > 0.0 {
        return margin_top;
    }
    if child.establishes_inline_context() {
        // Line boxes separate the margins.
        return margin_top;
    }
    let Some(first) = child.children.iter().find(|grandchild| grandchild.is_in_flow()) else {
        return margin_top;
    };
    if !first.participates_in_margin_collapsing() {
        return margin_top;
    }
    collapse_margins(
        margin_top,
        effective_top_margin_of(first, viewport, containing_width),
    )
}

/// [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "the amount of clearance is set to the greater of: 1. The amount
/// necessary to place the border edge of the block even with the bottom
/// outer edge of the lowest float that is to be cleared. 2. The amount
/// necessary to place the top border edge of the block at its hypothetical
/// position."
///
/// Takes and returns margin-box start positions; the border edge sits
/// `margin_top` below the returned Y.
fn clearance_adjusted_start(
    clear_side: Option<ClearSide>,
    margin_top: f32,
    current_y: f32,
    floats: &FloatManager,
) -> f32 {
    let Some(clear) = clear_side else {
        return current_y;
    };
    let hypothetical_border_y = current_y + margin_top;
    let cleared_border_y = floats.clearance_y(clear, hypothetical_border_y);
    if cleared_border_y > hypothetical_border_y {
        cleared_border_y - margin_top
    } else {
        current_y
    }
}

/// Stack block-level children vertically inside `parent`.
///
/// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "In a block formatting context, boxes are laid out one after the other,
/// vertically... The vertical distance between two sibling boxes is
/// determined by the 'margin' properties. Vertical margins between
/// adjacent block-level boxes in a block formatting context collapse."
///
/// The cursor tracks margin-box positions: a child's containing block Y is
/// where its margin box begins, and the cursor advances by margin-box
/// heights. Collapsing never changes stored margins, only how far the
/// cursor moves, so a box's dimensions stay self-consistent and a child's
/// relative offset cannot leak into the cursor.
///
/// Returns the lowest margin-box bottom edge reached by in-flow children,
/// in document coordinates.
fn layout_block_children(
    parent: &mut LayoutBox,
    absolute_cb: Rect,
    definite_height: Option<f32>,
    ctx: &mut LayoutContext<'_>,
) -> f32 {
    let content_box = parent.dimensions.content_box();
    let child_cb_height = definite_height.unwrap_or(f32::INFINITY);
    let no_top_separator = !parent.has_top_border_or_padding();
    let parent_participates = parent.participates_in_margin_collapsing();
    let parent_margin_top = parent.dimensions.margin.top;
    let viewport = ctx.viewport;

    let mut current_y = content_box.y;
    let mut max_flow_bottom = content_box.y;
    let mut prev_margin_bottom: Option<f32> = None;
    let mut parent_collapsed_top: Option<f32> = None;
    let mut first_in_flow = true;

    for child in &mut parent.children {
        // Absolutely positioned children wait for the final step of block
        // layout.
        if child.position.is_absolutely_positioned() {
            continue;
        }

        // STEP 1: Floats: measure, place against the current flow
        // position, then lay the subtree out once at the placed origin.
        // The cursor does not move.
        //
        // [§ 9.5]: "Since a float is not in the flow, non-positioned block
        // boxes created before and after the float box flow vertically as
        // if the float did not exist."
        if let Some(side) = child.float_side {
            let size = measure_float_margin_box(child, ctx.metrics, viewport, content_box.width);
            let mut candidate_y = current_y;
            if let Some(clear) = child.clear_side {
                // A float with 'clear' starts below the floats it clears.
                candidate_y = ctx.floats.clearance_y(clear, candidate_y);
            }
            let margin_box = ctx.floats.place(side, size, candidate_y);
            #[cfg(feature = "layout-trace")]
            eprintln!(
                "[FLOAT] {side:?} {:.1}x{:.1} at ({:.1}, {:.1})",
                margin_box.width, margin_box.height, margin_box.x, margin_box.y
            );
            let float_cb = Rect {
                x: margin_box.x,
                y: margin_box.y,
                width: content_box.width,
                height: child_cb_height,
            };
            layout_subtree(child, float_cb, absolute_cb, ctx);
            continue;
        }

        let margin = child
            .margin
            .resolve(child.font_size, viewport, content_box.width);
        let margin_top = margin.top.to_px_or(0.0);
        let margin_bottom = margin.bottom.to_px_or(0.0);
        let participates = child.participates_in_margin_collapsing();
        let effective_top = effective_top_margin_of(child, viewport, content_box.width);
        let cursor_before_collapse = current_y;

        // STEP 2: Margin collapsing moves the cursor before the child is
        // positioned.
        //
        // [§ 8.3.1]: "The top margin of an in-flow block element collapses
        // with its first in-flow block-level child's top margin if the
        // element has no top border, no top padding, and the child has no
        // clearance."
        if first_in_flow {
            if no_top_separator && participates && parent_participates {
                // The child's top margin moves out past the parent's
                // content edge; the collapsed value is reported upward.
                current_y -= margin_top;
                parent_collapsed_top = Some(collapse_margins(parent_margin_top, effective_top));
            }
            first_in_flow = false;
        } else if participates {
            if let Some(previous) = prev_margin_bottom {
                let collapsed = collapse_margins(previous, effective_top);
                current_y -= previous + margin_top - collapsed;
            }
        }

        // STEP 3: Clearance, after collapsing: the hypothetical position
        // the spec compares against already has margins collapsed.
        current_y = clearance_adjusted_start(child.clear_side, margin_top, current_y, &ctx.floats);

        // STEP 4: Lay the child out with the cursor as its margin-box top.
        let child_cb = Rect {
            x: content_box.x,
            y: current_y,
            width: content_box.width,
            height: child_cb_height,
        };
        layout_subtree(child, child_cb, absolute_cb, ctx);

        // STEP 5: A child that collapses through contributes its margins
        // to the pending value and nothing to the flow.
        //
        // [§ 8.3.1]: "If the top and bottom margins of a box are
        // adjoining, then it is possible for margins to collapse through
        // it."
        if child.collapses_through() {
            let own = collapse_margins(margin_top, margin_bottom);
            match prev_margin_bottom {
                Some(previous) => {
                    // The cursor sits at the previous sibling's border
                    // bottom plus the pending margin; when the pending
                    // margin grows to the merged assembly the cursor moves
                    // with it, so the next sibling collapses against the
                    // whole assembly.
                    let merged = collapse_margins(previous, own);
                    current_y = cursor_before_collapse - previous + merged;
                    prev_margin_bottom = Some(merged);
                }
                None => {
                    current_y = cursor_before_collapse;
                    prev_margin_bottom = Some(own);
                }
            }
            continue;
        }

        // STEP 6: Advance past the child's border box plus its effective
        // bottom margin, which differs from the stored one when the
        // child's own last-child collapse pushed a margin out of it.
        current_y += child.dimensions.margin_box().height - child.dimensions.margin.bottom
            + child.effective_margin_bottom();
        max_flow_bottom = max_flow_bottom.max(current_y);
        prev_margin_bottom = if participates {
            Some(child.effective_margin_bottom())
        } else {
            // A non-collapsing box is a barrier; the next sibling's top
            // margin stacks in full.
            None
        };
    }

    parent.collapsed_margin_top = parent_collapsed_top;

    // Parent-last-child bottom collapse: with nothing separating them and
    // the parent's height untouched by an explicit value, the last child's
    // bottom margin moves out of the parent.
    if parent_participates && !parent.has_bottom_border_or_padding() && definite_height.is_none() {
        let parent_margin_bottom = parent.dimensions.margin.bottom;
        let last_margin = parent
            .children
            .iter()
            .rev()
            .find(|child| child.is_in_flow())
            .filter(|child| child.participates_in_margin_collapsing())
            .map(LayoutBox::effective_margin_bottom);
        if let Some(last_margin) = last_margin {
            parent.collapsed_margin_bottom =
                Some(collapse_margins(parent_margin_bottom, last_margin));
        }
    }

    max_flow_bottom
}

/// One run of the collected item stream, ending at an in-flow block-level
/// child when one interrupts the inline content.
struct InlineSegment<'a> {
    /// Items in this run, the terminating block-child item included so its
    /// placeholder line and fragment are produced.
    items: &'a [InlineItem],
    /// The interrupting child, when this segment ends at one.
    block_path: Option<BoxPath>,
}

/// Split the item stream at block-level interruptions.
///
/// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around
/// the block-level box."
fn split_at_block_children(items: &[InlineItem]) -> Vec<InlineSegment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (index, item) in items.iter().enumerate() {
        if let InlineItemKind::BlockChild { box_path } = &item.kind {
            segments.push(InlineSegment {
                items: &items[start..=index],
                block_path: Some(box_path.clone()),
            });
            start = index + 1;
        }
    }
    if start < items.len() || segments.is_empty() {
        segments.push(InlineSegment {
            items: &items[start..],
            block_path: None,
        });
    }
    segments
}

/// The accepted result of one segment's break-construct retry loop.
struct SegmentRun {
    outcome: ConstructOutcome,
    floats: FloatManager,
    open_stack: Vec<OpenInlineState>,
}

/// Break and construct one segment, rerunning on band mismatch.
///
/// Each attempt breaks against the previous attempt's final exclusions and
/// constructs into clones of the float state and open-box stack. A trial
/// whose lines received exactly the bands the breaker assumed is accepted
/// and its clones become real; the committed state never carries a
/// rejected trial's floats.
fn run_segment(
    pass: &InlinePass<'_>,
    items: &[InlineItem],
    base: &ConstraintSpace,
    start_y: f32,
    floats: &FloatManager,
    open_stack: &[OpenInlineState],
) -> SegmentRun {
    let mut seed = floats.exclusion_space(pass.content_origin_x, pass.containing_width);
    let mut attempt = 1;
    loop {
        let constraint = base.with_exclusion_space(seed);
        let lines = break_into_lines(items, &constraint, pass.metrics, start_y, pass.strut_height);
        let mut trial_floats = floats.clone();
        let mut trial_stack = open_stack.to_vec();
        let outcome = construct_fragments(pass, &lines, &mut trial_floats, &mut trial_stack);

        let converged = lines.iter().zip(&outcome.bands).all(|(line, band)| {
            (line.left_offset - band.left_offset).abs() < BAND_EPSILON
                && (line.available_width - band.available_width).abs() < BAND_EPSILON
        });
        if converged || attempt >= MAX_INLINE_ATTEMPTS {
            #[cfg(feature = "layout-trace")]
            if !converged {
                eprintln!(
                    "[INLINE] accepted unconverged after {attempt} attempts ({} lines)",
                    lines.len()
                );
            }
            return SegmentRun {
                outcome,
                floats: trial_floats,
                open_stack: trial_stack,
            };
        }

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[INLINE] bands moved on attempt {attempt}, rebreaking {} lines",
            lines.len()
        );
        seed = trial_floats.exclusion_space(pass.content_origin_x, pass.containing_width);
        attempt += 1;
    }
}

/// Drive the three-phase inline pipeline over a block container's content.
///
/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// Items are collected once, then processed one segment at a time, where a
/// segment ends at each in-flow block-level child interrupting the inline
/// content. Per segment the break-construct retry runs, the accepted
/// pass's placements and stitches are applied, and an interrupting block
/// is laid out before the next segment begins below it. The open inline
/// box stack survives across segments, so a box spanning an interruption
/// keeps exactly one first fragment and one last fragment.
///
/// Returns the Y below the last line or interrupting block.
fn layout_inline_children(
    parent: &mut LayoutBox,
    absolute_cb: Rect,
    definite_height: Option<f32>,
    ctx: &mut LayoutContext<'_>,
) -> f32 {
    let content_box = parent.dimensions.content_box();
    let origin_x = content_box.x;
    let containing_width = content_box.width;
    let strut_height = parent.line_height;
    let child_cb_height = definite_height.unwrap_or(f32::INFINITY);

    let items = collect_inline_items(parent, ctx.metrics, ctx.viewport, containing_width);
    if items.is_empty() {
        return content_box.y;
    }

    let base = ConstraintSpace::new(Size {
        width: containing_width,
        height: f32::INFINITY,
    })
    .with_text_align(parent.text_align)
    .with_white_space(parent.white_space);

    let mut cursor_y = content_box.y;
    let mut open_stack: Vec<OpenInlineState> = Vec::new();
    let mut line_boxes: Vec<LineBox> = Vec::new();

    for segment in split_at_block_children(&items) {
        let run = run_segment(
            &InlinePass {
                block: parent,
                metrics: ctx.metrics,
                viewport: ctx.viewport,
                content_origin_x: origin_x,
                containing_width,
                strut_height,
            },
            segment.items,
            &base,
            cursor_y,
            &ctx.floats,
            &open_stack,
        );
        ctx.floats = run.floats;
        open_stack = run.open_stack;

        // Accepted placements are final; lay each child subtree out once
        // at its decided origin.
        for placement in &run.outcome.placements {
            let (box_path, margin_origin) = match placement {
                ChildPlacement::Atomic {
                    box_path,
                    margin_x,
                    margin_y,
                } => (box_path, (*margin_x, *margin_y)),
                ChildPlacement::Float {
                    box_path,
                    margin_box,
                } => (box_path, (margin_box.x, margin_box.y)),
            };
            if let Some(child) = box_at_path_mut(parent, box_path) {
                let child_cb = Rect {
                    x: margin_origin.0,
                    y: margin_origin.1,
                    width: containing_width,
                    height: child_cb_height,
                };
                layout_subtree(child, child_cb, absolute_cb, ctx);
            }
        }
        for (box_path, fragment) in run.outcome.stitches {
            if let Some(owner) = box_at_path_mut(parent, &box_path) {
                owner.fragments.push(fragment);
            }
        }
        if let Some(last) = run.outcome.line_boxes.last() {
            cursor_y = last.rect.y + last.rect.height;
        }
        line_boxes.extend(run.outcome.line_boxes);

        // The zero-height placeholder line left the cursor at the
        // interruption point; the block is laid out there and the next
        // segment resumes below its margin box.
        if let Some(block_path) = &segment.block_path {
            if let Some(child) = box_at_path_mut(parent, block_path) {
                let margin_top = child
                    .margin
                    .resolve(child.font_size, ctx.viewport, containing_width)
                    .top
                    .to_px_or(0.0);
                let start_y =
                    clearance_adjusted_start(child.clear_side, margin_top, cursor_y, &ctx.floats);
                let child_cb = Rect {
                    x: origin_x,
                    y: start_y,
                    width: containing_width,
                    height: child_cb_height,
                };
                layout_subtree(child, child_cb, absolute_cb, ctx);
                cursor_y = start_y + child.dimensions.margin_box().height;
            }
        }
    }

    parent.line_boxes = line_boxes;
    cursor_y
}

/// Lay out the absolutely positioned children of a box.
///
/// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
///
/// "In the absolute positioning model, a box is explicitly offset with
/// respect to its containing block. It is removed from the normal flow
/// entirely."
///
/// Runs after the parent's own layout completes, so flow positions never
/// depend on absolute descendants and a positioned parent's padding box is
/// final when it serves as the containing block.
fn layout_absolute_children(parent: &mut LayoutBox, absolute_cb: Rect, ctx: &mut LayoutContext<'_>) {
    for child in &mut parent.children {
        if !child.position.is_absolutely_positioned() {
            continue;
        }
        // [§ 10.1]: "If the element has 'position: fixed', the containing
        // block is established by the viewport."
        let cb = if matches!(child.position, PositionValue::Fixed) {
            Rect {
                x: 0.0,
                y: 0.0,
                width: ctx.viewport.width,
                height: ctx.viewport.height,
            }
        } else {
            absolute_cb
        };
        layout_absolute_box(child, cb, ctx);
    }
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced)
///
/// "'left' + 'margin-left' + 'border-left-width' + 'padding-left' +
/// 'width' + 'padding-right' + 'border-right-width' + 'margin-right' +
/// 'right' = width of containing block"
///
/// Solved in reduced form: auto margins are zero, an auto width with both
/// offsets set comes from the equation, an auto width otherwise shrinks to
/// fit, and a box anchored only by its far edge is measured by trial
/// layout so its near edge can be computed before the single real layout
/// pass. With every offset auto the box stays at the containing block
/// origin, standing in for the static position.
fn layout_absolute_box(child: &mut LayoutBox, cb: Rect, ctx: &mut LayoutContext<'_>) {
    let font_size = child.font_size;
    let viewport = ctx.viewport;

    let left = resolve_offset(child.offsets.left, font_size, viewport, cb.width);
    let right = resolve_offset(child.offsets.right, font_size, viewport, cb.width);
    let top = resolve_offset(child.offsets.top, font_size, viewport, cb.height);
    let bottom = resolve_offset(child.offsets.bottom, font_size, viewport, cb.height);

    // STEP 1: An auto width with both horizontal offsets set is solved
    // from the constraint equation before layout.
    let specified_width = child.width;
    let solved_width = match (child.width, left, right) {
        (Some(AutoLength::Length(_)), _, _) => None,
        (_, AutoOr::Length(left_px), AutoOr::Length(right_px)) => {
            let margin = child
                .margin
                .resolve(font_size, viewport, cb.width)
                .zeroing_auto();
            let solved = match child.box_sizing {
                // Width calculation peels the edges back off a border-box
                // width; hand the equation's border-box result over.
                BoxSizingValue::BorderBox => {
                    cb.width - left_px - right_px - margin.left - margin.right
                }
                BoxSizingValue::ContentBox => {
                    let padding = child.padding.resolve(font_size, viewport, cb.width);
                    let border = child.border_width.resolve(font_size, viewport, cb.width);
                    cb.width
                        - left_px
                        - right_px
                        - margin.left
                        - margin.right
                        - padding.horizontal()
                        - border.horizontal()
                }
            };
            Some(solved.max(0.0))
        }
        _ => None,
    };
    if let Some(solved) = solved_width {
        child.width = Some(AutoLength::Length(LengthValue::Px(f64::from(solved))));
    }

    // STEP 2: A box anchored only by its far edge needs its margin-box
    // size before its near edge exists; measure by trial layout.
    let needs_probe = (left.is_auto() && matches!(right, AutoOr::Length(_)))
        || (top.is_auto() && matches!(bottom, AutoOr::Length(_)) && cb.height.is_finite());
    let probed = if needs_probe {
        Some(measure_margin_box(child, ctx.metrics, viewport, cb.width))
    } else {
        None
    };

    // STEP 3: The margin-box origin from the offsets.
    //
    // [§ 9.3.2]: offsets specify how far the box's margin edge is offset
    // from the containing block's edge.
    let x = match (left, right) {
        (AutoOr::Length(offset), _) => cb.x + offset,
        (AutoOr::Auto, AutoOr::Length(offset)) => {
            cb.x + cb.width - offset - probed.map_or(0.0, |size| size.width)
        }
        (AutoOr::Auto, AutoOr::Auto) => cb.x,
    };
    let y = match (top, bottom) {
        (AutoOr::Length(offset), _) => cb.y + offset,
        (AutoOr::Auto, AutoOr::Length(offset)) => {
            if cb.height.is_finite() {
                cb.y + cb.height - offset - probed.map_or(0.0, |size| size.height)
            } else {
                warn_once(
                    "Layout",
                    "bottom offset against an auto-height containing block is not supported, anchoring to the top edge",
                );
                cb.y
            }
        }
        (AutoOr::Auto, AutoOr::Auto) => cb.y,
    };

    #[cfg(feature = "layout-trace")]
    eprintln!("[ABS] margin box anchored at ({x:.1}, {y:.1})");

    // STEP 4: One real layout pass at the final origin.
    let child_cb = Rect {
        x,
        y,
        width: cb.width,
        height: cb.height,
    };
    layout_subtree(child, child_cb, child_cb, ctx);
    child.width = specified_width;
}

/// Lay out a replaced box.
///
/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// "If 'height' and 'width' both have computed values of 'auto' and the
/// element also has an intrinsic width, then that intrinsic width is the
/// used value of 'width'."
///
/// "Otherwise, if 'width' has a computed value of 'auto' and the element
/// has an intrinsic ratio, then the used value of 'width' is: (used height)
/// * (intrinsic ratio)"
///
/// "Otherwise, if 'width' has a computed value of 'auto', but none of the
/// conditions above are met, then the used value of 'width' becomes 300px."
///
/// The spec's device-fitting fallback is not applied; the fallback is
/// always 300 x 150.
fn layout_replaced(layout_box: &mut LayoutBox, containing_block: Rect, ctx: &LayoutContext<'_>) {
    let font_size = layout_box.font_size;
    let viewport = ctx.viewport;
    let cb_width = containing_block.width;

    // STEP 1: Resolve edges.
    let padding = layout_box.padding.resolve(font_size, viewport, cb_width);
    let border = layout_box.border_width.resolve(font_size, viewport, cb_width);
    let margin = layout_box.margin.resolve(font_size, viewport, cb_width);

    // STEP 2: Intrinsic ratio.
    let ratio = match (layout_box.intrinsic_width, layout_box.intrinsic_height) {
        (Some(width), Some(height)) if height > 0.0 => Some(width / height),
        _ => None,
    };

    // STEP 3: Specified sizes as content sizes; border-box values include
    // the edges.
    let specified_width = specified_size(layout_box.width, font_size, viewport, Some(cb_width))
        .map(|outer| match layout_box.box_sizing {
            BoxSizingValue::BorderBox => {
                (outer - padding.horizontal() - border.horizontal()).max(0.0)
            }
            BoxSizingValue::ContentBox => outer,
        });
    let cb_height = containing_block
        .height
        .is_finite()
        .then_some(containing_block.height);
    let specified_height = specified_size(layout_box.height, font_size, viewport, cb_height).map(
        |outer| match layout_box.box_sizing {
            BoxSizingValue::BorderBox => (outer - padding.vertical() - border.vertical()).max(0.0),
            BoxSizingValue::ContentBox => outer,
        },
    );

    // STEP 4: Used sizes per the §10.3.2 / §10.6.2 chain, each axis then
    // clamped per §10.4.
    let used_width = match (specified_width, specified_height) {
        (Some(width), _) => width,
        (None, Some(height)) => ratio.map_or_else(
            || {
                layout_box
                    .intrinsic_width
                    .unwrap_or(FALLBACK_REPLACED_WIDTH)
            },
            |value| height * value,
        ),
        (None, None) => layout_box
            .intrinsic_width
            .unwrap_or(FALLBACK_REPLACED_WIDTH),
    };
    let used_width = clamp_axis(
        used_width,
        layout_box.min_width,
        layout_box.max_width,
        font_size,
        viewport,
        Some(cb_width),
    );
    let used_height = match specified_height {
        Some(height) => height,
        None => ratio.map_or_else(
            || {
                layout_box
                    .intrinsic_height
                    .unwrap_or(FALLBACK_REPLACED_HEIGHT)
            },
            |value| used_width / value,
        ),
    };
    let used_height = clamp_axis(
        used_height,
        layout_box.min_height,
        layout_box.max_height,
        font_size,
        viewport,
        cb_height,
    );

    // STEP 5: Store the dimensions. Auto margins on a block-level replaced
    // box follow the §10.3.3 margin rules with the width known, so
    // 'margin: auto' centers it; inline-level auto margins are zero.
    let block_level = !layout_box.is_inline_level() && layout_box.is_in_flow();
    let dims = &mut layout_box.dimensions;
    dims.content.width = used_width.max(0.0);
    dims.content.height = used_height.max(0.0);
    dims.padding = padding;
    dims.border = border;

    let remaining = cb_width - dims.content.width - padding.horizontal() - border.horizontal();
    let (margin_left, margin_right) = if block_level {
        match (margin.left, margin.right) {
            (AutoOr::Auto, AutoOr::Auto) => {
                let half = (remaining / 2.0).max(0.0);
                (half, half)
            }
            (AutoOr::Auto, AutoOr::Length(right)) => (remaining - right, right),
            (AutoOr::Length(left), AutoOr::Auto) => (left, remaining - left),
            (AutoOr::Length(left), AutoOr::Length(right)) => (left, right),
        }
    } else {
        (margin.left.to_px_or(0.0), margin.right.to_px_or(0.0))
    };
    dims.margin.left = margin_left;
    dims.margin.right = margin_right;

    // STEP 6: Position, vertical margins, and any relative offset.
    calculate_block_position(layout_box, containing_block, viewport);
}

/// A specified width or height as an outer pixel value; `None` for auto or
/// for a percentage against an indefinite dimension.
fn specified_size(
    value: Option<AutoLength>,
    font_size: f32,
    viewport: Size,
    cb_dimension: Option<f32>,
) -> Option<f32> {
    let AutoLength::Length(length) = value? else {
        return None;
    };
    if length.is_percent() && cb_dimension.is_none() {
        return None;
    }
    Some(resolve_length(
        length,
        font_size,
        viewport,
        cb_dimension.unwrap_or(0.0),
    ))
}

/// [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// Clamp one axis of a replaced box. Min is applied last and wins; a
/// percentage constraint against an indefinite dimension is ignored.
fn clamp_axis(
    value: f32,
    min: Option<LengthValue>,
    max: Option<LengthValue>,
    font_size: f32,
    viewport: Size,
    cb_dimension: Option<f32>,
) -> f32 {
    let resolve = |length: LengthValue| -> Option<f32> {
        if length.is_percent() && cb_dimension.is_none() {
            return None;
        }
        Some(resolve_length(
            length,
            font_size,
            viewport,
            cb_dimension.unwrap_or(0.0),
        ))
    };
    let mut clamped = value;
    if let Some(max_px) = max.and_then(resolve) {
        clamped = clamped.min(max_px);
    }
    if let Some(min_px) = min.and_then(resolve) {
        clamped = clamped.max(min_px);
    }
    clamped
}

/// Measure the margin box an atomic inline-level child will occupy, by
/// trial layout of a clone at a scratch origin.
///
/// [§ 10.3.9 'Inline-block', non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
///
/// "If 'width' is 'auto', the used value is the shrink-to-fit width."
///
/// The clone is discarded, so measurement never disturbs engine state; the
/// real subtree is laid out later, once, at its final origin.
#[must_use]
pub(crate) fn measure_atomic_margin_box(
    child: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    containing_width: f32,
) -> Size {
    measure_margin_box(child, metrics, viewport, containing_width)
}

/// Measure the margin box a float will occupy before it is placed.
///
/// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "If 'width' is computed as 'auto', the used value is the
/// 'shrink-to-fit' width."
#[must_use]
pub(crate) fn measure_float_margin_box(
    child: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    containing_width: f32,
) -> Size {
    measure_margin_box(child, metrics, viewport, containing_width)
}

/// Trial-lay a clone of `child` at a scratch origin and report its margin
/// box size.
///
/// Every box measured this way establishes its own formatting context
/// (floats, atomics, and absolutes all do), so the scratch float state
/// can neither observe nor affect the caller's.
fn measure_margin_box(
    child: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    containing_width: f32,
) -> Size {
    let mut probe = child.clone();
    let scratch_cb = Rect {
        x: 0.0,
        y: 0.0,
        width: containing_width,
        height: f32::INFINITY,
    };
    let mut scratch = LayoutContext::new(metrics, viewport);
    layout_subtree(&mut probe, scratch_cb, scratch_cb, &mut scratch);
    let margin_box = probe.dimensions.margin_box();
    Size {
        width: margin_box.width,
        height: margin_box.height,
    }
}

#[cfg(test)]
mod tests {
    use super::super::exclusion::FloatSide;
    use super::super::inline::ApproximateFontMetrics;
    use super::super::layout_box::BoxType;
    use super::*;
    use crate::style::DisplayValue;
    use wallaby_dom::NodeId;

    const VIEWPORT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn block_box(id: usize) -> LayoutBox {
        LayoutBox::new(BoxType::Principal(NodeId(id)), DisplayValue::block())
    }

    fn px(value: f64) -> Option<AutoLength> {
        Some(AutoLength::Length(LengthValue::Px(value)))
    }

    fn layout_at_viewport(root: &mut LayoutBox) {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics, VIEWPORT);
        let icb = Rect {
            x: 0.0,
            y: 0.0,
            width: VIEWPORT.width,
            height: VIEWPORT.height,
        };
        layout_tree(root, icb, &mut ctx);
    }

    // ========== margin collapsing arithmetic ==========

    #[test]
    fn collapse_margins_takes_maximum_of_positives() {
        assert!((collapse_margins(30.0, 20.0) - 30.0).abs() < f32::EPSILON);
        assert!(collapse_margins(0.0, 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn collapse_margins_takes_most_negative_of_negatives() {
        assert!((collapse_margins(-20.0, -10.0) - (-20.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn collapse_margins_sums_mixed_signs() {
        assert!((collapse_margins(30.0, -10.0) - 20.0).abs() < f32::EPSILON);
    }

    // ========== block widths ==========

    #[test]
    fn auto_width_fills_containing_block() {
        let mut root = block_box(1);
        layout_at_viewport(&mut root);
        assert!((root.dimensions.content.width - 800.0).abs() < 1.0);
    }

    #[test]
    fn auto_margins_center_fixed_width() {
        let mut root = block_box(1);
        let mut child = block_box(2);
        child.width = px(200.0);
        child.margin.left = Some(AutoLength::Auto);
        child.margin.right = Some(AutoLength::Auto);
        root.children.push(child);
        layout_at_viewport(&mut root);
        let child = &root.children[0];
        assert!((child.dimensions.margin.left - 300.0).abs() < 1.0);
        assert!((child.dimensions.content.x - 300.0).abs() < 1.0);
    }

    #[test]
    fn overconstrained_box_recomputes_right_margin() {
        let mut root = block_box(1);
        let mut child = block_box(2);
        child.width = px(700.0);
        child.margin.left = px(50.0);
        child.margin.right = px(500.0);
        root.children.push(child);
        layout_at_viewport(&mut root);
        let child = &root.children[0];
        assert!((child.dimensions.margin.left - 50.0).abs() < 1.0);
        assert!((child.dimensions.margin.right - 50.0).abs() < 1.0);
    }

    #[test]
    fn border_box_width_includes_edges() {
        let mut root = block_box(1);
        let mut child = block_box(2);
        child.width = px(200.0);
        child.box_sizing = BoxSizingValue::BorderBox;
        child.padding.left = Some(LengthValue::Px(20.0));
        child.padding.right = Some(LengthValue::Px(20.0));
        child.border_width.left = Some(LengthValue::Px(5.0));
        child.border_width.right = Some(LengthValue::Px(5.0));
        root.children.push(child);
        layout_at_viewport(&mut root);
        let child = &root.children[0];
        assert!((child.dimensions.content.width - 150.0).abs() < 1.0);
        assert!((child.dimensions.border_box().width - 200.0).abs() < 1.0);
    }

    #[test]
    fn min_width_beats_max_width() {
        let mut root = block_box(1);
        let mut child = block_box(2);
        child.width = px(300.0);
        child.max_width = Some(LengthValue::Px(250.0));
        child.min_width = Some(LengthValue::Px(280.0));
        root.children.push(child);
        layout_at_viewport(&mut root);
        assert!((root.children[0].dimensions.content.width - 280.0).abs() < 1.0);
    }

    // ========== heights ==========

    #[test]
    fn auto_height_wraps_children() {
        let mut root = block_box(1);
        let mut child = block_box(2);
        child.height = px(120.0);
        root.children.push(child);
        layout_at_viewport(&mut root);
        assert!((root.dimensions.content.height - 120.0).abs() < 1.0);
    }

    #[test]
    fn percentage_height_requires_definite_containing_block() {
        let mut root = block_box(1);
        root.height = px(400.0);
        let mut child = block_box(2);
        child.height = Some(AutoLength::Length(LengthValue::Percent(50.0)));
        root.children.push(child);
        layout_at_viewport(&mut root);
        assert!((root.children[0].dimensions.content.height - 200.0).abs() < 1.0);

        let mut root = block_box(1);
        let mut child = block_box(2);
        child.height = Some(AutoLength::Length(LengthValue::Percent(50.0)));
        root.children.push(child);
        layout_at_viewport(&mut root);
        assert!(root.children[0].dimensions.content.height.abs() < 1.0);
    }

    // ========== relative positioning ==========

    #[test]
    fn relative_offset_moves_box_not_siblings() {
        let mut root = block_box(1);
        let mut first = block_box(2);
        first.height = px(50.0);
        first.position = PositionValue::Relative;
        first.offsets.top = px(10.0);
        first.offsets.left = px(15.0);
        let mut second = block_box(3);
        second.height = px(40.0);
        root.children.push(first);
        root.children.push(second);
        layout_at_viewport(&mut root);
        assert!((root.children[0].dimensions.content.x - 15.0).abs() < 1.0);
        assert!((root.children[0].dimensions.content.y - 10.0).abs() < 1.0);
        // The sibling stays where normal flow puts it.
        assert!((root.children[1].dimensions.content.y - 50.0).abs() < 1.0);
        // And the parent's height ignores the offset.
        assert!((root.dimensions.content.height - 90.0).abs() < 1.0);
    }

    // ========== measurement ==========

    #[test]
    fn float_measures_to_explicit_size() {
        let metrics = ApproximateFontMetrics;
        let mut float_child = block_box(2);
        float_child.float_side = Some(FloatSide::Left);
        float_child.width = px(100.0);
        float_child.height = px(80.0);
        let size = measure_float_margin_box(&float_child, &metrics, VIEWPORT, 800.0);
        assert!((size.width - 100.0).abs() < 1.0);
        assert!((size.height - 80.0).abs() < 1.0);
    }

    #[test]
    fn measurement_leaves_original_untouched() {
        let metrics = ApproximateFontMetrics;
        let mut float_child = block_box(2);
        float_child.float_side = Some(FloatSide::Left);
        float_child.width = px(100.0);
        float_child.height = px(80.0);
        let _ = measure_float_margin_box(&float_child, &metrics, VIEWPORT, 800.0);
        assert!(float_child.dimensions.content.width.abs() < f32::EPSILON);
    }
}
