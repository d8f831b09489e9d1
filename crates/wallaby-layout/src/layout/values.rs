//! Unresolved and auto value types for CSS layout.
//!
//! [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)

use crate::style::{AutoLength, LengthValue};

use super::box_model::{EdgeSizes, Size};

/// [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// "The computed value is the result of resolving the specified value...
/// as far as possible without laying out the document."
///
/// Edge sizes storing unresolved length values. Percentages and
/// font-relative units cannot be resolved until layout knows the containing
/// block width and the element's font size, so boxes carry these until then.
#[derive(Debug, Clone, Default)]
pub struct UnresolvedEdgeSizes {
    /// Top edge (unresolved).
    pub top: Option<LengthValue>,
    /// Right edge (unresolved).
    pub right: Option<LengthValue>,
    /// Bottom edge (unresolved).
    pub bottom: Option<LengthValue>,
    /// Left edge (unresolved).
    pub left: Option<LengthValue>,
}

impl UnresolvedEdgeSizes {
    /// [§ 6.1 Used Values](https://www.w3.org/TR/css-cascade-4/#used)
    ///
    /// "The used value is the result of taking the computed value and
    /// completing any remaining calculations to make it the absolute
    /// theoretical value used in the layout of the document."
    ///
    /// Resolve all four edges to pixels. Unspecified edges resolve to zero.
    ///
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    /// "Percentages: refer to width of containing block" - this holds for
    /// the top and bottom edges too, so a single containing-block width
    /// serves all four.
    #[must_use]
    pub fn resolve(&self, font_size: f32, viewport: Size, containing_width: f32) -> EdgeSizes {
        let px = |edge: &Option<LengthValue>| {
            edge.as_ref().map_or(0.0, |length| {
                #[allow(clippy::cast_possible_truncation)]
                let value = length.resolve(
                    f64::from(font_size),
                    (f64::from(viewport.width), f64::from(viewport.height)),
                    f64::from(containing_width),
                ) as f32;
                value
            })
        };
        EdgeSizes {
            top: px(&self.top),
            right: px(&self.right),
            bottom: px(&self.bottom),
            left: px(&self.left),
        }
    }
}

/// [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Edge sizes storing unresolved auto-or-length values. Used for margins
/// and box offsets, where `auto` has meaning of its own and must survive
/// until width resolution.
#[derive(Debug, Clone, Default)]
pub struct UnresolvedAutoEdgeSizes {
    /// Top edge (unresolved, can be auto).
    pub top: Option<AutoLength>,
    /// Right edge (unresolved, can be auto).
    pub right: Option<AutoLength>,
    /// Bottom edge (unresolved, can be auto).
    pub bottom: Option<AutoLength>,
    /// Left edge (unresolved, can be auto).
    pub left: Option<AutoLength>,
}

impl UnresolvedAutoEdgeSizes {
    /// [§ 6.1 Used Values](https://www.w3.org/TR/css-cascade-4/#used)
    ///
    /// Resolve each edge to [`AutoOr`]. Lengths become pixels; `auto` is
    /// preserved for width and margin resolution; unspecified edges resolve
    /// to zero (the initial margin).
    #[must_use]
    pub fn resolve(&self, font_size: f32, viewport: Size, containing_width: f32) -> AutoEdgeSizes {
        let resolve_edge = |edge: &Option<AutoLength>| {
            edge.as_ref().map_or(AutoOr::Length(0.0), |auto_length| {
                Self::resolve_auto_length(auto_length, font_size, viewport, containing_width)
            })
        };
        AutoEdgeSizes {
            top: resolve_edge(&self.top),
            right: resolve_edge(&self.right),
            bottom: resolve_edge(&self.bottom),
            left: resolve_edge(&self.left),
        }
    }

    /// Resolve a single auto-or-length value.
    ///
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// `auto` is preserved; it is resolved during width calculation.
    #[must_use]
    pub fn resolve_auto_length(
        auto_length: &AutoLength,
        font_size: f32,
        viewport: Size,
        containing_width: f32,
    ) -> AutoOr {
        match auto_length {
            AutoLength::Auto => AutoOr::Auto,
            AutoLength::Length(length) => {
                #[allow(clippy::cast_possible_truncation)]
                let value = length.resolve(
                    f64::from(font_size),
                    (f64::from(viewport.width), f64::from(viewport.height)),
                    f64::from(containing_width),
                ) as f32;
                AutoOr::Length(value)
            }
        }
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// A value that is either `auto` or already resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    Auto,
    /// The value is a specific length in pixels.
    Length(f32),
}

impl Default for AutoOr {
    fn default() -> Self {
        Self::Auto
    }
}

impl AutoOr {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Get the length value, or a default if 'auto'.
    #[must_use]
    pub const fn to_px_or(&self, default: f32) -> f32 {
        match self {
            Self::Length(v) => *v,
            Self::Auto => default,
        }
    }
}

/// [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
///
/// Edge values where each side can be 'auto' or a resolved length. Used for
/// margins, where 'auto' has special meaning (centering).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoEdgeSizes {
    /// Top edge value.
    pub top: AutoOr,
    /// Right edge value.
    pub right: AutoOr,
    /// Bottom edge value.
    pub bottom: AutoOr,
    /// Left edge value.
    pub left: AutoOr,
}

impl AutoEdgeSizes {
    /// The four edges with every `auto` replaced by zero.
    ///
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    /// "If 'margin-top' or 'margin-bottom' are 'auto', their used value is 0."
    #[must_use]
    pub const fn zeroing_auto(&self) -> EdgeSizes {
        EdgeSizes {
            top: self.top.to_px_or(0.0),
            right: self.right.to_px_or(0.0),
            bottom: self.bottom.to_px_or(0.0),
            left: self.left.to_px_or(0.0),
        }
    }
}
