//! CSS box-model and flow layout engine for the Wallaby project.
//!
//! Given a [`wallaby_dom::DomTree`], a map of computed styles co-indexed by
//! [`wallaby_dom::NodeId`], a viewport size, a [`FontMetrics`] implementation,
//! and pre-resolved replaced-element dimensions, [`layout_document`] produces
//! a tree of positioned, sized boxes ready for painting.
//!
//! # Scope
//!
//! This crate implements:
//! - **Block layout** ([CSS 2.1 § 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Width resolution with auto margins ([§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth))
//!   - Auto heights and min/max clamping ([§ 10.6](https://www.w3.org/TR/CSS2/visudet.html#Computing_heights_and_margins))
//!   - Margin collapsing ([§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins))
//! - **Floats and clearance** ([§ 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats))
//!   - Placement through an immutable exclusion space
//!   - Block formatting context scoping and containment
//! - **Inline layout** ([§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting))
//!   - Three-phase pipeline: item collection, line breaking, fragment
//!     construction, with a bounded retry loop when floats invalidate
//!     breaking decisions
//!   - Block-in-inline fragmentation ([§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level))
//! - **Positioning schemes** ([§ 9.3](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme))
//!   - Relative offsets, absolute and fixed positioning
//! - **Intrinsic sizing** ([CSS Sizing Level 3](https://www.w3.org/TR/css-sizing-3/))
//!   - Min-content/max-content queries and shrink-to-fit
//!
//! # Not Implemented
//!
//! - Style computation, cascade, and selector matching (styles arrive
//!   computed)
//! - Table, flexbox, and grid layout
//! - Painting and pixel output
//! - Text shaping (text is measured through the [`FontMetrics`] trait;
//!   [`ApproximateFontMetrics`] provides fixed-ratio estimates)

/// The visual formatting model per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod layout;
/// Computed style representation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;

// Re-exports for convenience
pub use layout::{
    build_box_tree, collapse_margins, layout_document, layout_tree, max_content_width,
    min_content_width, shrink_to_fit_width, ApproximateFontMetrics, BoxDimensions, BoxType,
    ClearSide, ConstraintSpace, EdgeSizes, Exclusion, ExclusionSpace, FloatManager, FloatSide,
    FontMetrics, Fragment, FragmentKind, LayoutBox, LayoutContext, LineBox, Rect, ReplacedSizes,
    Size,
};
pub use style::{
    AutoLength, ComputedStyle, DisplayValue, InnerDisplayType, LengthValue, OuterDisplayType,
    StyleMap, DEFAULT_FONT_SIZE_PX,
};
