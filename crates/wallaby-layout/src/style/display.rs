//! The two-axis display model
//!
//! [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! "The display property defines an element's display type, which consists
//! of the two basic qualities of how an element generates boxes: the outer
//! display type... and the inner display type"

use serde::Serialize;

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
/// "The `<display-outside>` keywords specify the element's outer display
/// type, which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterDisplayType {
    /// "The element generates a box that is block-level when placed in flow
    /// layout."
    Block,
    /// "The element generates a box that is inline-level when placed in flow
    /// layout."
    Inline,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
/// "The `<display-inside>` keywords specify the element's inner display
/// type, which defines the type of formatting context it generates,
/// dictating how its descendant boxes are laid out."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout
    /// (block-and-inline layout)."
    Flow,
    /// "The element generates a block container box, and lays out its
    /// contents using flow layout. It always establishes a new block
    /// formatting context for its contents."
    FlowRoot,
    /// "The element generates a principal table wrapper box containing an
    /// additionally-generated table grid box, and establishes a table
    /// formatting context." Laid out as flow; table layout is delegated.
    Table,
    /// "The element generates a principal flex container box and establishes
    /// a flex formatting context." Laid out as flow; flex layout is
    /// delegated.
    Flex,
    /// "The element generates a principal grid container box, and
    /// establishes a grid formatting context." Laid out as flow; grid layout
    /// is delegated.
    Grid,
}

/// A parsed `display` value, split along the two axes.
///
/// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayValue {
    /// Role of the principal box in its parent's formatting context.
    pub outer: OuterDisplayType,
    /// Formatting context established for the element's contents.
    pub inner: InnerDisplayType,
}

impl DisplayValue {
    /// `display: block`
    #[must_use]
    pub const fn block() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `display: inline`
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `display: inline-block`
    ///
    /// "Inline-level block containers... participate in inline layout as a
    /// single opaque box."
    #[must_use]
    pub const fn inline_block() -> Self {
        Self {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::FlowRoot,
        }
    }

    /// `display: flow-root`
    ///
    /// "It always establishes a new block formatting context for its
    /// contents."
    #[must_use]
    pub const fn flow_root() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::FlowRoot,
        }
    }

    /// `display: table`
    #[must_use]
    pub const fn table() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Table,
        }
    }

    /// `display: flex`
    #[must_use]
    pub const fn flex() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flex,
        }
    }

    /// `display: grid`
    #[must_use]
    pub const fn grid() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Grid,
        }
    }

    /// True when the principal box participates in inline layout.
    ///
    /// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        matches!(self.outer, OuterDisplayType::Inline)
    }

    /// True when the element's contents form their own block formatting
    /// context regardless of float, overflow, or positioning.
    ///
    /// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
    #[must_use]
    pub const fn is_flow_root(&self) -> bool {
        matches!(self.inner, InnerDisplayType::FlowRoot)
    }
}

impl Default for DisplayValue {
    /// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    /// "Initial: inline"
    fn default() -> Self {
        Self::inline()
    }
}
