//! CSS value types consumed by layout
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f64),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f64),
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    /// "1vw = 1% of viewport width"
    Vw(f64),
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    /// "1vh = 1% of viewport height"
    Vh(f64),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// "A <percentage> value is denoted by <percentage>, and consists of a
    /// <number> immediately followed by a percent sign '%'."
    Percent(f64),
}

impl LengthValue {
    /// Check whether this length is a percentage.
    ///
    /// Percentage widths and heights resolve against the containing block,
    /// which is only possible once the containing block itself is sized;
    /// callers use this to defer resolution.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Resolve to pixels against a font size, the viewport, and a containing
    /// block dimension.
    ///
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// "Percentages are always relative to another quantity, for example a
    /// length."
    ///
    /// NOTE: Margin and padding percentages both resolve against the
    /// containing block's **width**, even for top/bottom (CSS 2.1 § 8.3/8.4);
    /// the caller picks the dimension accordingly.
    #[must_use]
    pub fn resolve(&self, font_size: f64, viewport: (f64, f64), cb_dimension: f64) -> f64 {
        match self {
            // [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
            Self::Px(px) => *px,
            // [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
            // "Equal to the computed value of the font-size property of the element"
            Self::Em(em) => *em * font_size,
            // "1vw = 1% of viewport width"
            Self::Vw(vw) => *vw * viewport.0 / 100.0,
            // "1vh = 1% of viewport height"
            Self::Vh(vh) => *vh * viewport.1 / 100.0,
            // [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
            Self::Percent(pct) => *pct * cb_dimension / 100.0,
        }
    }
}

/// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
///
/// A length that may also be the keyword `auto`, used by width/height,
/// margins, and box offsets. `auto` is resolved during layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AutoLength {
    /// The `auto` keyword; meaning depends on the property.
    Auto,
    /// An explicit length or percentage.
    Length(LengthValue),
}

impl AutoLength {
    /// True if this is the `auto` keyword.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "Values have the following meanings:
///
/// left
///   The element generates a block box that is floated to the left.
///
/// right
///   The element generates a block box that is floated to the right.
///
/// none
///   The box is not floated."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FloatValue {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ClearValue {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

/// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2.1
/// positioning algorithms is used to calculate the position of a box."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PositionValue {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow...
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position is specified with the offset properties. The box
    /// is removed from the normal flow entirely."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but in addition, the box is fixed with respect to the viewport."
    Fixed,
}

impl PositionValue {
    /// True for positioning schemes that take the box out of normal flow.
    ///
    /// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
    /// "An element is called out of flow if it is floated, absolutely
    /// positioned, or is the root element."
    #[must_use]
    pub const fn is_absolutely_positioned(&self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
///
/// "This property specifies whether content of a block container element is
/// clipped when it overflows the element's box."
///
/// Layout cares about overflow only because any value other than `visible`
/// establishes a new block formatting context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OverflowValue {
    /// "Content is not clipped."
    #[default]
    Visible,
    /// "Content is clipped and no scrolling mechanism is provided."
    Hidden,
    /// "Content is clipped and a scrolling mechanism is provided."
    Scroll,
    /// "The behavior is UA-dependent, but a scrolling mechanism should be
    /// provided for overflowing boxes."
    Auto,
}

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
///
/// "This property describes how inline-level content of a block container
/// is aligned."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TextAlignValue {
    /// "Left: inline-level content is aligned to the left edge of the line box."
    #[default]
    Left,
    /// "Right: inline-level content is aligned to the right edge of the line box."
    Right,
    /// "Center: inline-level content is centered within the line box."
    Center,
    /// "Justify: text is justified." Treated as left during fragment
    /// construction; justification spacing is not performed.
    Justify,
}

/// [§ 3 White Space Collapsing: the 'white-space' property](https://www.w3.org/TR/css-text-3/#white-space-property)
///
/// Only the wrapping dimension matters to the line breaker; both supported
/// values collapse whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WhiteSpaceValue {
    /// "This value directs user agents to collapse sequences of white space"
    /// and to wrap lines as necessary.
    #[default]
    Normal,
    /// "As normal, but suppresses line breaks within the source."
    Nowrap,
}

/// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "On a block container element whose content is composed of inline-level
/// elements, 'line-height' specifies the minimal height of line boxes within
/// the element."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LineHeightValue {
    /// "Tells user agents to set the used value to a 'reasonable' value
    /// based on the font of the element."
    Normal,
    /// "The used value of the property is this number multiplied by the
    /// element's font size."
    Number(f64),
    /// "The specified length is used in the calculation of the line box
    /// height." Percentages resolve against the element's own font size.
    Length(LengthValue),
}

impl LineHeightValue {
    /// Multiplier applied to the font size for `normal`.
    /// "We recommend a used value for 'normal' between 1.0 to 1.2"
    pub const NORMAL_FACTOR: f64 = 1.2;

    /// Used line height in pixels for a given font size.
    #[must_use]
    pub fn resolve(&self, font_size: f64, viewport: (f64, f64)) -> f64 {
        match self {
            Self::Normal => Self::NORMAL_FACTOR * font_size,
            Self::Number(n) => n * font_size,
            // "Percentage: computed relative to the font size of the element itself."
            Self::Length(length) => length.resolve(font_size, viewport, font_size),
        }
    }
}

impl Default for LineHeightValue {
    fn default() -> Self {
        Self::Normal
    }
}

/// [§ 4.1 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
///
/// "This property defines whether the width and height... are applied to the
/// content box or border box of the element's principal box."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BoxSizingValue {
    /// "The size specified by width and height... applies to the box's
    /// content box."
    #[default]
    ContentBox,
    /// "The size specified by width and height... applies to the box's
    /// border box."
    BorderBox,
}
