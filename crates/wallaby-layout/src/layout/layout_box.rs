//! Layout box types and box tree construction.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)

use std::collections::HashMap;

use wallaby_dom::{DomTree, NodeId, NodeType};

use crate::style::{
    AutoLength, BoxSizingValue, ClearValue, DisplayValue, FloatValue, LengthValue,
    LineHeightValue, OuterDisplayType, OverflowValue, PositionValue, StyleMap, TextAlignValue,
    WhiteSpaceValue,
};

use super::box_model::{BoxDimensions, Size};
use super::default_display_for_element;
use super::exclusion::FloatSide;
use super::float::ClearSide;
use super::fragment::{Fragment, LineBox};
use super::values::{UnresolvedAutoEdgeSizes, UnresolvedEdgeSizes};

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// "Otherwise, if 'width' has a computed value of 'auto', and the element
/// has no intrinsic width, then the used value of 'width' becomes 300px."
pub const FALLBACK_REPLACED_WIDTH: f32 = 300.0;

/// [§ 10.6.2 Inline replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height)
///
/// "Otherwise, if 'height' has a computed value of 'auto', and the element
/// has no intrinsic height, then its used value is... 150px."
pub const FALLBACK_REPLACED_HEIGHT: f32 = 150.0;

/// Intrinsic sizes for replaced content, keyed by the element's node.
///
/// The engine does no fetching; the embedder resolves image dimensions
/// ahead of time and hands them in. Elements missing from the map fall back
/// to their width/height attributes, then to the 300x150 placeholder.
pub type ReplacedSizes = HashMap<NodeId, Size>;

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "The following sections describe the types of boxes that may be generated
/// in CSS 2.1. A box's type affects, in part, its behavior in the visual
/// formatting model."
#[derive(Debug, Clone)]
pub enum BoxType {
    /// [§ 9.2 Principal box](https://www.w3.org/TR/css-display-3/#principal-box)
    ///
    /// "Most elements generate a single principal box."
    /// Carries the `NodeId` referencing the generating DOM element.
    Principal(NodeId),

    /// [§ 9.2.1.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-inline)
    ///
    /// "Any text that is directly contained inside a block container element
    /// (not inside an inline element) must be treated as an anonymous inline
    /// element."
    AnonymousInline(String),

    /// A forced line break generated by a `<br>` element.
    ///
    /// [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3)
    /// "br { display-outside: newline; }"
    LineBreak,
}

/// Resolved `::first-letter` text styling for a block container.
///
/// [§ 5.1 The ::first-letter pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-letter)
#[derive(Debug, Clone, Copy)]
pub struct FirstLetterStyle {
    /// Font size for the first letter, in pixels.
    pub font_size: f32,
    /// Line height contribution of the first letter, in pixels.
    pub line_height: f32,
}

/// A node in the layout tree.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "Each box is associated with its generating element."
///
/// A layout box stores the computed values layout still has to resolve
/// (lengths that depend on the containing block) alongside the used values
/// produced by layout. Built once by [`build_box_tree`], then positioned
/// and sized in place by the flow builder; a box is never repositioned by
/// its ancestors after its own subtree's layout completes.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// The type of box (principal, anonymous inline, line break).
    pub box_type: BoxType,

    /// The computed dimensions of this box (used values after layout).
    pub dimensions: BoxDimensions,

    /// The display type of this box, after §9.7 adjustments.
    pub display: DisplayValue,

    /// Child boxes in the layout tree.
    pub children: Vec<LayoutBox>,

    // ===== Computed style values (unresolved) =====
    //
    // Lengths that need the containing block or viewport stay unresolved
    // here and become used values during layout.
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "Margins can be negative, but there may be implementation-specific
    /// limits." Resolved during layout; 'auto' survives until width
    /// resolution.
    pub margin: UnresolvedAutoEdgeSizes,

    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    ///
    /// "Unlike margin properties, values for padding values cannot be
    /// negative."
    pub padding: UnresolvedEdgeSizes,

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    pub border_width: UnresolvedEdgeSizes,

    /// [§ 10.2 Content width: the 'width' property](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    ///
    /// None means 'auto'.
    pub width: Option<AutoLength>,

    /// [§ 10.5 Content height: the 'height' property](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// None means 'auto'.
    pub height: Option<AutoLength>,

    /// [§ 10.4 'min-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    ///
    /// None means initial (0, no minimum constraint).
    pub min_width: Option<LengthValue>,

    /// [§ 10.4 'max-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    ///
    /// None means initial (none, no maximum constraint).
    pub max_width: Option<LengthValue>,

    /// [§ 10.7 'min-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: Option<LengthValue>,

    /// [§ 10.7 'max-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub max_height: Option<LengthValue>,

    /// [§ 4.1 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    ///
    /// Under `border-box`, explicit widths and heights describe the border
    /// box; layout subtracts edges to recover the content size.
    pub box_sizing: BoxSizingValue,

    // ===== Inherited text properties (resolved at build) =====
    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    ///
    /// Resolved font size in pixels, inheritance already applied. Drives
    /// text measurement and em units.
    pub font_size: f32,

    /// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// Used line height in pixels. Also the strut: the minimum line box
    /// height this block contributes even without glyph-bearing content.
    pub line_height: f32,

    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// Inherited. Applied when this box establishes an inline formatting
    /// context.
    pub text_align: TextAlignValue,

    /// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
    ///
    /// Inherited. `nowrap` suppresses line breaking in this box's inline
    /// formatting context.
    pub white_space: WhiteSpaceValue,

    /// Resolved `::first-letter` styling, present only when the embedder
    /// supplied first-letter rules for this element.
    pub first_letter: Option<FirstLetterStyle>,

    // ===== Positioning fields =====
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: PositionValue,

    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    ///
    /// "Positioned elements generate positioned boxes, laid out according
    /// to four properties: top, right, bottom, left."
    pub offsets: UnresolvedAutoEdgeSizes,

    /// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    ///
    /// Any value other than `visible` makes this box establish a new block
    /// formatting context.
    pub overflow: OverflowValue,

    /// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    ///
    /// Stack level for the painter; layout records it unchanged.
    pub z_index: Option<i32>,

    // ===== Float fields =====
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    ///
    /// None means the element is not floated (float: none).
    pub float_side: Option<FloatSide>,

    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// None means no clearance (clear: none).
    pub clear_side: Option<ClearSide>,

    // ===== Replaced element fields =====
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// "A replaced element is an element whose content is outside the scope
    /// of the CSS formatting model, such as an image."
    pub is_replaced: bool,

    /// Intrinsic width of the replaced content in pixels, if known.
    pub intrinsic_width: Option<f32>,

    /// Intrinsic height of the replaced content in pixels, if known.
    pub intrinsic_height: Option<f32>,

    // ===== Layout results beyond dimensions =====
    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// Effective top margin after collapsing with the first in-flow child.
    /// When set, the parent uses this instead of `dimensions.margin.top`
    /// for its own sibling collapsing.
    pub collapsed_margin_top: Option<f32>,

    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// Effective bottom margin after collapsing with the last in-flow
    /// child.
    pub collapsed_margin_bottom: Option<f32>,

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// Completed line boxes. Populated when this box establishes an inline
    /// formatting context for its children.
    pub line_boxes: Vec<LineBox>,

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// Split fragments for an inline box broken around a block-level child,
    /// and the pipeline fragments recording where an inline element's
    /// pieces landed. Empty for most boxes.
    pub fragments: Vec<Fragment>,
}

impl LayoutBox {
    /// A box of the given type and display with every other field at its
    /// initial value.
    #[must_use]
    pub fn new(box_type: BoxType, display: DisplayValue) -> Self {
        Self {
            box_type,
            dimensions: BoxDimensions::default(),
            display,
            children: Vec::new(),
            margin: UnresolvedAutoEdgeSizes::default(),
            padding: UnresolvedEdgeSizes::default(),
            border_width: UnresolvedEdgeSizes::default(),
            width: None,
            height: None,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
            box_sizing: BoxSizingValue::default(),
            font_size: default_font_size(),
            line_height: default_line_height(),
            text_align: TextAlignValue::default(),
            white_space: WhiteSpaceValue::default(),
            first_letter: None,
            position: PositionValue::default(),
            offsets: UnresolvedAutoEdgeSizes::default(),
            overflow: OverflowValue::default(),
            z_index: None,
            float_side: None,
            clear_side: None,
            is_replaced: false,
            intrinsic_width: None,
            intrinsic_height: None,
            collapsed_margin_top: None,
            collapsed_margin_bottom: None,
            line_boxes: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// The DOM node this box was generated for, if any. Anonymous boxes
    /// have no node.
    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        match self.box_type {
            BoxType::Principal(id) => Some(id),
            BoxType::AnonymousInline(_) | BoxType::LineBreak => None,
        }
    }

    /// True when this box participates in inline layout.
    ///
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        match self.box_type {
            BoxType::AnonymousInline(_) | BoxType::LineBreak => true,
            BoxType::Principal(_) => matches!(self.display.outer, OuterDisplayType::Inline),
        }
    }

    /// True when this box is laid out by the normal flow.
    ///
    /// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
    /// "An element is called out of flow if it is floated [or] absolutely
    /// positioned."
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        self.float_side.is_none() && !self.position.is_absolutely_positioned()
    }

    /// True when this box establishes a new block formatting context.
    ///
    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks...) that are not block boxes, and block boxes with
    /// 'overflow' other than 'visible'... establish new block formatting
    /// contexts for their contents."
    #[must_use]
    pub fn establishes_bfc(&self) -> bool {
        self.float_side.is_some()
            || self.position.is_absolutely_positioned()
            || self.display.is_flow_root()
            || !matches!(self.overflow, OverflowValue::Visible)
    }

    /// True when this box's children are laid out by the inline pipeline.
    ///
    /// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    /// The deciding question is whether any in-flow child is inline-level;
    /// interleaved block-level children are then handled by breaking the
    /// inline run around them.
    #[must_use]
    pub fn establishes_inline_context(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.is_in_flow() && child.is_inline_level())
    }

    // ===== Margin collapsing helpers =====

    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// Effective top margin after any parent-child collapsing.
    #[must_use]
    pub fn effective_margin_top(&self) -> f32 {
        self.collapsed_margin_top
            .unwrap_or(self.dimensions.margin.top)
    }

    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// Effective bottom margin after any parent-child collapsing.
    #[must_use]
    pub fn effective_margin_bottom(&self) -> f32 {
        self.collapsed_margin_bottom
            .unwrap_or(self.dimensions.margin.bottom)
    }

    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// "Two margins are adjoining if and only if... no line boxes, no
    /// clearance, no padding and no border separate them."
    #[must_use]
    pub fn has_top_border_or_padding(&self) -> bool {
        self.dimensions.border.top > 0.0 || self.dimensions.padding.top > 0.0
    }

    /// Bottom counterpart of [`Self::has_top_border_or_padding`].
    #[must_use]
    pub fn has_bottom_border_or_padding(&self) -> bool {
        self.dimensions.border.bottom > 0.0 || self.dimensions.padding.bottom > 0.0
    }

    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// Whether this box may collapse margins with its neighbors at all.
    ///
    /// "Margins of elements that establish new block formatting contexts
    /// (such as floats and elements with 'overflow' other than 'visible')
    /// do not collapse with their in-flow children."
    /// "Margins between a floated box and any other box do not collapse."
    /// "Margins of absolutely positioned boxes do not collapse."
    #[must_use]
    pub fn participates_in_margin_collapsing(&self) -> bool {
        matches!(
            self.position,
            PositionValue::Static | PositionValue::Relative
        ) && self.float_side.is_none()
            && !self.display.is_flow_root()
            && matches!(self.overflow, OverflowValue::Visible)
    }

    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// "A box's own margins collapse if the 'min-height' property is zero,
    /// and it has no top or bottom borders and no top or bottom padding,
    /// and it has an auto 'height', and it does not contain a line box"
    ///
    /// True for a zero-height box whose own top and bottom margins meet, so
    /// both of them collapse through into the adjoining siblings' margins.
    #[must_use]
    pub fn collapses_through(&self) -> bool {
        if !self.participates_in_margin_collapsing() {
            return false;
        }
        if self.min_height.is_some_and(|min| !is_zero_length(min)) {
            return false;
        }
        let height_zero_or_auto = match self.height {
            None | Some(AutoLength::Auto) => true,
            Some(AutoLength::Length(length)) => is_zero_length(length),
        };
        height_zero_or_auto
            && self.dimensions.content.height == 0.0
            && self.line_boxes.is_empty()
            && !self.has_top_border_or_padding()
            && !self.has_bottom_border_or_padding()
    }
}

/// Resolve a child-index path from `root` to a descendant box.
///
/// Paths come from inline item collection, which records each descendant's
/// position instead of borrowing it; see `BoxPath`.
#[must_use]
pub fn box_at_path<'a>(root: &'a LayoutBox, path: &[usize]) -> Option<&'a LayoutBox> {
    let mut current = root;
    for &index in path {
        current = current.children.get(index)?;
    }
    Some(current)
}

/// Mutable counterpart of [`box_at_path`].
#[must_use]
pub fn box_at_path_mut<'a>(root: &'a mut LayoutBox, path: &[usize]) -> Option<&'a mut LayoutBox> {
    let mut current = root;
    for &index in path {
        current = current.children.get_mut(index)?;
    }
    Some(current)
}

/// Whether a length is statically zero, ignoring units that need resolution
/// context (a zero percentage or zero em is still zero).
fn is_zero_length(length: LengthValue) -> bool {
    match length {
        LengthValue::Px(v)
        | LengthValue::Em(v)
        | LengthValue::Vw(v)
        | LengthValue::Vh(v)
        | LengthValue::Percent(v) => v == 0.0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn default_font_size() -> f32 {
    crate::style::DEFAULT_FONT_SIZE_PX as f32
}

#[allow(clippy::cast_possible_truncation)]
fn default_line_height() -> f32 {
    (LineHeightValue::NORMAL_FACTOR * crate::style::DEFAULT_FONT_SIZE_PX) as f32
}

/// Inherited text properties threaded down the build recursion.
///
/// [§ 4 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
/// "Inheritance propagates property values from parent elements to their
/// children."
#[derive(Clone, Copy)]
struct InheritedText {
    font_size: f32,
    line_height: LineHeightValue,
    text_align: TextAlignValue,
    white_space: WhiteSpaceValue,
}

impl InheritedText {
    fn initial() -> Self {
        Self {
            font_size: default_font_size(),
            line_height: LineHeightValue::default(),
            text_align: TextAlignValue::default(),
            white_space: WhiteSpaceValue::default(),
        }
    }
}

/// Build the layout box tree for a DOM subtree.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// Produces unpositioned boxes with display resolved (including the §9.7
/// computed-display adjustments), text properties inherited and resolved to
/// pixels, and all length values still relative to their containing block.
/// Returns `None` for nodes that generate no box: `display: none` elements,
/// hidden-by-default elements, comments, and whitespace-only text.
#[must_use]
pub fn build_box_tree(
    tree: &DomTree,
    styles: &StyleMap,
    node_id: NodeId,
    replaced_sizes: &ReplacedSizes,
    viewport: Size,
) -> Option<LayoutBox> {
    build_node(tree, styles, node_id, replaced_sizes, viewport, InheritedText::initial())
}

fn build_node(
    tree: &DomTree,
    styles: &StyleMap,
    node_id: NodeId,
    replaced_sizes: &ReplacedSizes,
    viewport: Size,
    inherited: InheritedText,
) -> Option<LayoutBox> {
    let node = tree.get(node_id)?;
    match &node.node_type {
        NodeType::Document => {
            // The document node generates no box of its own; its first
            // element child is the root box.
            tree.children(node_id).iter().find_map(|&child| {
                build_node(tree, styles, child, replaced_sizes, viewport, inherited)
            })
        }
        NodeType::Element(element) => build_element(
            tree,
            styles,
            node_id,
            element.tag_name.as_str(),
            replaced_sizes,
            viewport,
            inherited,
        ),
        NodeType::Text(text) => {
            // [§ 9.2.1.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-inline)
            //
            // Whitespace-only text between block boxes generates nothing.
            if text.trim().is_empty() {
                return None;
            }
            let mut text_box =
                LayoutBox::new(BoxType::AnonymousInline(text.clone()), DisplayValue::inline());
            apply_inherited(&mut text_box, inherited, viewport);
            Some(text_box)
        }
        NodeType::Comment(_) => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_element(
    tree: &DomTree,
    styles: &StyleMap,
    node_id: NodeId,
    tag: &str,
    replaced_sizes: &ReplacedSizes,
    viewport: Size,
    inherited: InheritedText,
) -> Option<LayoutBox> {
    let style = styles.get(&node_id).cloned().unwrap_or_default();

    // [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    // "display: none - The element and its descendants generate no boxes."
    if style.display_none {
        return None;
    }

    let specified_display = match style.display {
        Some(display) => display,
        // Hidden-by-default elements (head, script, style...) generate no box.
        None => default_display_for_element(tag)?,
    };

    // [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    //
    // "1. If 'display' has the value 'none', then 'position' and 'float' do
    //     not apply.
    //  2. Otherwise, if 'position' has the value 'absolute' or 'fixed'...
    //     'float' has a computed value of 'none', and display is set
    //     according to the table below.
    //  3. Otherwise, if 'float' has a value other than 'none', the box is
    //     floated and 'display' is set according to the table below."
    let position = style.position.unwrap_or_default();
    let mut float_side = match style.float.unwrap_or_default() {
        FloatValue::None => None,
        FloatValue::Left => Some(FloatSide::Left),
        FloatValue::Right => Some(FloatSide::Right),
    };
    let mut display = specified_display;
    if position.is_absolutely_positioned() {
        // RULE 2: absolutely positioned boxes compute float to none and
        // blockify.
        float_side = None;
        display = blockified(display);
    } else if float_side.is_some() {
        // RULE 3: floated boxes blockify.
        display = blockified(display);
    }

    // `<br>` generates a forced line break, nothing else.
    if tag == "br" {
        let mut break_box = LayoutBox::new(BoxType::LineBreak, DisplayValue::inline());
        apply_inherited(&mut break_box, inherited, viewport);
        return Some(break_box);
    }

    let mut layout_box = LayoutBox::new(BoxType::Principal(node_id), display);

    // [§ 4 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    //
    // Text properties inherit; everything else defaults per property.
    let font_size = style.font_size.map_or(inherited.font_size, |length| {
        resolve_font_relative(length, inherited.font_size, viewport)
    });
    let line_height_value = style.line_height.unwrap_or(inherited.line_height);
    let next_inherited = InheritedText {
        font_size,
        line_height: line_height_value,
        text_align: style.text_align.unwrap_or(inherited.text_align),
        white_space: style.white_space.unwrap_or(inherited.white_space),
    };
    apply_inherited(&mut layout_box, next_inherited, viewport);

    layout_box.margin = UnresolvedAutoEdgeSizes {
        top: style.margin_top,
        right: style.margin_right,
        bottom: style.margin_bottom,
        left: style.margin_left,
    };
    layout_box.padding = UnresolvedEdgeSizes {
        top: style.padding_top,
        right: style.padding_right,
        bottom: style.padding_bottom,
        left: style.padding_left,
    };
    layout_box.border_width = UnresolvedEdgeSizes {
        top: style.border_top_width,
        right: style.border_right_width,
        bottom: style.border_bottom_width,
        left: style.border_left_width,
    };
    layout_box.width = style.width;
    layout_box.height = style.height;
    layout_box.min_width = style.min_width;
    layout_box.max_width = style.max_width;
    layout_box.min_height = style.min_height;
    layout_box.max_height = style.max_height;
    layout_box.box_sizing = style.box_sizing.unwrap_or_default();
    layout_box.position = position;
    layout_box.offsets = UnresolvedAutoEdgeSizes {
        top: style.top,
        right: style.right,
        bottom: style.bottom,
        left: style.left,
    };
    layout_box.overflow = style.overflow.unwrap_or_default();
    layout_box.z_index = style.z_index;
    layout_box.float_side = float_side;
    layout_box.clear_side = match style.clear.unwrap_or_default() {
        ClearValue::None => None,
        ClearValue::Left => Some(ClearSide::Left),
        ClearValue::Right => Some(ClearSide::Right),
        ClearValue::Both => Some(ClearSide::Both),
    };

    if let Some(first_letter) = &style.first_letter {
        let letter_font_size = first_letter
            .font_size
            .map_or(font_size, |length| {
                resolve_font_relative(length, font_size, viewport)
            });
        let letter_line_height = first_letter
            .line_height
            .unwrap_or(line_height_value)
            .resolve(
                f64::from(letter_font_size),
                (f64::from(viewport.width), f64::from(viewport.height)),
            );
        #[allow(clippy::cast_possible_truncation)]
        let letter_line_height = letter_line_height as f32;
        layout_box.first_letter = Some(FirstLetterStyle {
            font_size: letter_font_size,
            line_height: letter_line_height,
        });
    }

    // [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    if tag == "img" {
        layout_box.is_replaced = true;
        if let Some(size) = replaced_sizes.get(&node_id) {
            layout_box.intrinsic_width = Some(size.width);
            layout_box.intrinsic_height = Some(size.height);
        } else if let Some(element) = tree.as_element(node_id) {
            layout_box.intrinsic_width =
                element.attr("width").and_then(|v| v.parse::<f32>().ok());
            layout_box.intrinsic_height =
                element.attr("height").and_then(|v| v.parse::<f32>().ok());
        }
        // Replaced content has no laid-out children.
        return Some(layout_box);
    }

    for &child_id in tree.children(node_id) {
        if let Some(child) = build_node(
            tree,
            styles,
            child_id,
            replaced_sizes,
            viewport,
            next_inherited,
        ) {
            layout_box.children.push(child);
        }
    }

    Some(layout_box)
}

/// [§ 9.7](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
///
/// The computed-display table, restricted to the display values this engine
/// generates: every inline-level value maps to its block-level counterpart
/// and block-level values are unchanged. `inline-block` keeps its inner
/// flow-root, becoming `flow-root`.
const fn blockified(display: DisplayValue) -> DisplayValue {
    DisplayValue {
        outer: OuterDisplayType::Block,
        inner: display.inner,
    }
}

fn apply_inherited(layout_box: &mut LayoutBox, inherited: InheritedText, viewport: Size) {
    layout_box.font_size = inherited.font_size;
    let line_height = inherited.line_height.resolve(
        f64::from(inherited.font_size),
        (f64::from(viewport.width), f64::from(viewport.height)),
    );
    #[allow(clippy::cast_possible_truncation)]
    let line_height = line_height as f32;
    layout_box.line_height = line_height;
    layout_box.text_align = inherited.text_align;
    layout_box.white_space = inherited.white_space;
}

fn resolve_font_relative(length: LengthValue, parent_font_size: f32, viewport: Size) -> f32 {
    // Em and percentage font sizes resolve against the parent's font size.
    let resolved = length.resolve(
        f64::from(parent_font_size),
        (f64::from(viewport.width), f64::from(viewport.height)),
        f64::from(parent_font_size),
    );
    #[allow(clippy::cast_possible_truncation)]
    let resolved = resolved as f32;
    resolved
}
