//! CSS box-model and flow layout.
//!
//! This module implements the CSS Visual Formatting Model: block layout with
//! margin collapsing, float placement, and the three-phase inline pipeline.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box dimensions, rectangles, and edge sizes
//! - [`values`] - Unresolved and auto value types
//! - [`layout_box`] - Layout box types and box tree construction
//! - [`exclusion`] - Immutable exclusion space for float intrusions
//! - [`constraint`] - Immutable constraint space for the inline pipeline
//! - [`float`] - Float placement, clearance, and BFC containment
//! - [`intrinsic`] - Min/max-content measurement and shrink-to-fit
//! - [`inline`] - Inline item collection (pipeline phase 1)
//! - [`line_breaker`] - Line breaking (pipeline phase 2)
//! - [`fragment`] - Fragment construction (pipeline phase 3)
//! - [`flow`] - The recursive flow builder tying everything together

pub mod box_model;
pub mod constraint;
pub mod exclusion;
pub mod float;
pub mod flow;
pub mod fragment;
pub mod inline;
pub mod intrinsic;
pub mod layout_box;
pub mod line_breaker;
pub mod values;

// Re-exports for convenience
pub use box_model::{BoxDimensions, EdgeSizes, Rect, Size};
pub use constraint::ConstraintSpace;
pub use exclusion::{Exclusion, ExclusionSpace, FloatSide};
pub use float::{ClearSide, FloatManager, PlacedFloat};
pub use flow::{collapse_margins, layout_document, layout_tree, LayoutContext};
pub use fragment::{Fragment, FragmentKind, LineBox};
pub use inline::{
    collect_inline_items, ApproximateFontMetrics, BoxPath, FontMetrics, InlineItem, InlineItemKind,
};
pub use intrinsic::{max_content_width, min_content_width, shrink_to_fit_width};
pub use layout_box::{
    box_at_path, box_at_path_mut, build_box_tree, BoxType, FirstLetterStyle, LayoutBox,
    ReplacedSizes, FALLBACK_REPLACED_HEIGHT, FALLBACK_REPLACED_WIDTH,
};
pub use line_breaker::{break_into_lines, find_break_opportunity, LineInfo};
pub use values::{AutoEdgeSizes, AutoOr, UnresolvedAutoEdgeSizes, UnresolvedEdgeSizes};

use crate::style::DisplayValue;

// [HTML Living Standard § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
// defines the default CSS styles for HTML elements.

/// Returns the default display value for an HTML element.
///
/// [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
/// [§ 15.3.2 The page](https://html.spec.whatwg.org/multipage/rendering.html#the-page)
/// [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3)
#[must_use]
pub fn default_display_for_element(tag_name: &str) -> Option<DisplayValue> {
    // [§ 15.3.1 Hidden elements]
    // "The following elements must have their display set to none:"
    // area, base, basefont, datalist, head, link, meta, noembed,
    // noframes, param, rp, script, style, template, title
    let hidden = [
        "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
        "param", "rp", "script", "style", "template", "title",
    ];
    if hidden.contains(&tag_name) {
        return None; // display: none
    }

    // [§ 15.3.3 Flow content]
    // Block-level elements by default. List items are laid out as plain
    // blocks here; marker generation is a paint concern this engine leaves
    // to the embedder.
    let block_elements = [
        "address",
        "article",
        "aside",
        "blockquote",
        "body",
        "center",
        "dd",
        "details",
        "dialog",
        "dir",
        "div",
        "dl",
        "dt",
        "fieldset",
        "figcaption",
        "figure",
        "footer",
        "form",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "header",
        "hgroup",
        "hr",
        "html",
        "legend",
        "li",
        "listing",
        "main",
        "menu",
        "nav",
        "ol",
        "p",
        "plaintext",
        "pre",
        "search",
        "section",
        "summary",
        "ul",
        "xmp",
    ];
    if block_elements.contains(&tag_name) {
        return Some(DisplayValue::block());
    }

    // [§ 15.5.12 The input element](https://html.spec.whatwg.org/multipage/rendering.html#the-input-element-as-a-form-control)
    // [§ 15.5.13 The button element](https://html.spec.whatwg.org/multipage/rendering.html#the-button-element)
    // [§ 15.5.14 The textarea element](https://html.spec.whatwg.org/multipage/rendering.html#the-textarea-element)
    // [§ 15.5.15 The select element](https://html.spec.whatwg.org/multipage/rendering.html#the-select-element)
    //
    // Form controls are inline-block by default.
    if matches!(tag_name, "input" | "button" | "textarea" | "select") {
        return Some(DisplayValue::inline_block());
    }

    // Inline elements (default)
    // a, abbr, b, br, cite, code, em, i, img, kbd, label, mark, q, s, samp,
    // small, span, strong, sub, sup, time, u, var, wbr
    Some(DisplayValue::inline())
}
