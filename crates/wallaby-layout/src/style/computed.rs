//! Computed style values
//!
//! The layout engine does not cascade or parse stylesheets; it consumes one
//! [`ComputedStyle`] per element, supplied by the embedder alongside the DOM
//! tree. Every field is optional. `None` means the property was never
//! specified, and layout substitutes the CSS initial value at the point of
//! use, so a default-constructed style behaves like an unstyled element.

use std::collections::HashMap;

use serde::Serialize;
use wallaby_dom::NodeId;

use super::display::DisplayValue;
use super::values::{
    AutoLength, BoxSizingValue, ClearValue, FloatValue, LengthValue, LineHeightValue,
    OverflowValue, PositionValue, TextAlignValue, WhiteSpaceValue,
};

/// Styles for a whole document, co-indexed with the DOM arena.
///
/// Elements missing from the map are laid out with all-initial values.
pub type StyleMap = HashMap<NodeId, ComputedStyle>;

/// The computed value of every property layout consumes, for one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputedStyle {
    /// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    /// "The display property defines an element's display type"
    ///
    /// `None` falls back to the element's default display type (block for
    /// block-level tags, inline otherwise), decided by the box builder.
    pub display: Option<DisplayValue>,

    /// `display: none`, kept apart from the two-axis value.
    ///
    /// [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    /// "The element and its descendants generate no boxes or text runs."
    pub display_none: bool,

    /// [§ 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Option<PositionValue>,

    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    /// "This property specifies how far an absolutely positioned box's top
    /// margin edge is offset below the top edge of the box's containing
    /// block." For relative positioning it offsets the box from its normal
    /// position.
    pub top: Option<AutoLength>,
    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub right: Option<AutoLength>,
    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub bottom: Option<AutoLength>,
    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub left: Option<AutoLength>,

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    pub float: Option<FloatValue>,

    /// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    pub clear: Option<ClearValue>,

    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    /// "This property specifies the content width of boxes."
    pub width: Option<AutoLength>,
    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: Option<AutoLength>,

    /// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    /// "These two properties allow authors to constrain content widths to a
    /// certain range."
    pub min_width: Option<LengthValue>,
    /// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub max_width: Option<LengthValue>,
    /// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: Option<LengthValue>,
    /// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub max_height: Option<LengthValue>,

    /// [§ 4.1 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    pub box_sizing: Option<BoxSizingValue>,

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    /// Can be `auto`; auto horizontal margins absorb leftover space and can
    /// center a box. Resolved during layout.
    pub margin_top: Option<AutoLength>,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin_right: Option<AutoLength>,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin_bottom: Option<AutoLength>,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin_left: Option<AutoLength>,

    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    /// "Unlike margin properties, values for padding values cannot be
    /// negative."
    pub padding_top: Option<LengthValue>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding_right: Option<LengthValue>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding_bottom: Option<LengthValue>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding_left: Option<LengthValue>,

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    /// Only the used width participates in layout; border style and color
    /// are paint concerns.
    pub border_top_width: Option<LengthValue>,
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    pub border_right_width: Option<LengthValue>,
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    pub border_bottom_width: Option<LengthValue>,
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    pub border_left_width: Option<LengthValue>,

    /// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    /// Any value other than `visible` makes the box establish a new block
    /// formatting context.
    pub overflow: Option<OverflowValue>,

    /// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    /// "For a positioned box, the 'z-index' property specifies the stack
    /// level of the box in the current stacking context." Carried through
    /// to the output box for the painter; layout does not reorder by it.
    pub z_index: Option<i32>,

    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    /// Inherited; drives em resolution and the text measurer.
    pub font_size: Option<LengthValue>,

    /// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    /// Inherited.
    pub line_height: Option<LineHeightValue>,

    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    /// Inherited; applies to the block container whose line boxes are built.
    pub text_align: Option<TextAlignValue>,

    /// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
    /// Inherited.
    pub white_space: Option<WhiteSpaceValue>,

    /// Style overrides for the element's `::first-letter` pseudo-element.
    ///
    /// [§ 5.1 The ::first-letter pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-letter)
    /// "The :first-letter pseudo-element must select the first letter of the
    /// first line of a block". Present only when the embedder supplied
    /// first-letter rules; properties left `None` fall back to the
    /// element's own style.
    pub first_letter: Option<Box<ComputedStyle>>,
}

impl ComputedStyle {
    /// A style with every property at its initial value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when this element is removed from flow by absolute or fixed
    /// positioning.
    ///
    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    #[must_use]
    pub fn is_absolutely_positioned(&self) -> bool {
        self.position
            .is_some_and(|p| p.is_absolutely_positioned())
    }

    /// True when this element is floated.
    ///
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    #[must_use]
    pub fn is_floated(&self) -> bool {
        matches!(self.float, Some(FloatValue::Left | FloatValue::Right))
    }
}
