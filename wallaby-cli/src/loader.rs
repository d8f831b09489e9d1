//! JSON document loader.
//!
//! The engine has no HTML or CSS parser; documents reach it as a DOM tree
//! plus a computed-style map. This loader builds both from a JSON
//! description: a node tree where each node carries an optional inline
//! style string in CSS declaration syntax, restricted to the properties
//! layout consumes.
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "root": {
//!     "tag": "body",
//!     "children": [
//!       { "tag": "div", "style": "width: 50%; margin: 0 auto" },
//!       { "text": "Hello, world" }
//!     ]
//!   }
//! }
//! ```
//!
//! Error handling follows
//! [§ 4.2 Rules for handling parsing errors](https://www.w3.org/TR/CSS21/syndata.html#parsing-errors):
//! a declaration with an unknown property or an unparsable value is skipped
//! with a warning instead of failing the document. Only structural problems
//! (bad JSON, a node with neither tag nor text, a declaration with no
//! colon) are hard errors.

use serde::Deserialize;
use thiserror::Error;
use wallaby_common::warn_once;
use wallaby_dom::{DomTree, NodeId};
use wallaby_layout::style::{
    BoxSizingValue, ClearValue, FloatValue, LineHeightValue, OverflowValue, PositionValue,
    TextAlignValue, WhiteSpaceValue,
};
use wallaby_layout::{
    AutoLength, ComputedStyle, DisplayValue, LengthValue, ReplacedSizes, Size, StyleMap,
};

/// Everything the driver needs to lay out one document.
#[derive(Debug)]
pub struct LoadedDocument {
    /// The document tree.
    pub tree: DomTree,
    /// Computed styles, co-indexed with the tree.
    pub styles: StyleMap,
    /// Intrinsic sizes for replaced elements.
    pub replaced_sizes: ReplacedSizes,
    /// Viewport from the document, before any command-line override.
    pub viewport: Size,
}

/// Errors from loading a document description.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input was not valid JSON or did not match the document shape.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node was missing both of the fields that decide its kind.
    #[error("node at {path} needs a \"tag\" or \"text\" field")]
    NodeShape {
        /// Path to the offending node, like `root.children[2]`.
        path: String,
    },

    /// A style declaration had no `name: value` separator.
    #[error("malformed declaration {declaration:?} at {path}")]
    Declaration {
        /// Path to the node carrying the style.
        path: String,
        /// The declaration text as written.
        declaration: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentSpec {
    #[serde(default)]
    viewport: ViewportSpec,
    root: NodeSpec,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ViewportSpec {
    #[serde(default = "default_viewport_width")]
    width: f32,
    #[serde(default = "default_viewport_height")]
    height: f32,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

fn default_viewport_width() -> f32 {
    800.0
}

fn default_viewport_height() -> f32 {
    600.0
}

/// One node in the document description.
///
/// A node with a `tag` becomes an element; a node with only `text` becomes
/// a text node. A node with both becomes an element holding a single text
/// child, which covers the common `<p>some words</p>` case without
/// nesting.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSpec {
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    style: Option<String>,
    /// Intrinsic `[width, height]` for replaced elements.
    #[serde(default)]
    intrinsic: Option<[f32; 2]>,
    #[serde(default)]
    children: Vec<NodeSpec>,
}

/// Load a document description from JSON text.
///
/// # Errors
/// Returns [`LoadError`] for malformed JSON, a node with neither tag nor
/// text, or a style declaration with no colon.
pub fn load_document(input: &str) -> Result<LoadedDocument, LoadError> {
    let spec: DocumentSpec = serde_json::from_str(input)?;

    let mut tree = DomTree::new();
    let mut styles = StyleMap::new();
    let mut replaced_sizes = ReplacedSizes::new();
    let root = tree.root();
    build_node(&mut tree, &mut styles, &mut replaced_sizes, root, &spec.root, "root")?;

    Ok(LoadedDocument {
        tree,
        styles,
        replaced_sizes,
        viewport: Size {
            width: spec.viewport.width,
            height: spec.viewport.height,
        },
    })
}

fn build_node(
    tree: &mut DomTree,
    styles: &mut StyleMap,
    replaced_sizes: &mut ReplacedSizes,
    parent: NodeId,
    spec: &NodeSpec,
    path: &str,
) -> Result<(), LoadError> {
    match (&spec.tag, &spec.text) {
        (Some(tag), text) => {
            let id = tree.append_element(parent, tag);
            if let Some(style_text) = &spec.style {
                let style = parse_style(style_text, path)?;
                let _ = styles.insert(id, style);
            }
            if let Some([width, height]) = spec.intrinsic {
                let _ = replaced_sizes.insert(id, Size { width, height });
            }
            if let Some(text) = text {
                let _ = tree.append_text(id, text);
            }
            for (index, child) in spec.children.iter().enumerate() {
                let child_path = format!("{path}.children[{index}]");
                build_node(tree, styles, replaced_sizes, id, child, &child_path)?;
            }
            Ok(())
        }
        (None, Some(text)) => {
            // Style, intrinsic size, and children do not apply to bare text.
            let _ = tree.append_text(parent, text);
            Ok(())
        }
        (None, None) => Err(LoadError::NodeShape {
            path: path.to_string(),
        }),
    }
}

/// Parse an inline style string into a computed style.
fn parse_style(style_text: &str, path: &str) -> Result<ComputedStyle, LoadError> {
    let mut style = ComputedStyle::new();
    for declaration in style_text.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((name, value)) = declaration.split_once(':') else {
            return Err(LoadError::Declaration {
                path: path.to_string(),
                declaration: declaration.to_string(),
            });
        };
        apply_declaration(&mut style, name.trim(), value.trim());
    }
    Ok(style)
}

/// Apply one declaration to a computed style.
fn apply_declaration(style: &mut ComputedStyle, name: &str, value: &str) {
    match name.to_ascii_lowercase().as_str() {
        // [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
        "display" => {
            if value.eq_ignore_ascii_case("none") {
                // [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
                // "The element and its descendants generate no boxes."
                style.display = None;
                style.display_none = true;
            } else if let Some(display) = parse_display(value) {
                style.display = Some(display);
                style.display_none = false;
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
        "position" => {
            if let Some(position) = parse_position(value) {
                style.position = Some(position);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
        "float" => {
            if let Some(float) = parse_float(value) {
                style.float = Some(float);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
        "clear" => {
            if let Some(clear) = parse_clear(value) {
                style.clear = Some(clear);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
        "width" => {
            if let Some(length) = parse_auto_length(value) {
                style.width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
        "height" => {
            if let Some(length) = parse_auto_length(value) {
                style.height = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
        "min-width" => {
            if let Some(length) = parse_length(value) {
                style.min_width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "max-width" => {
            if let Some(length) = parse_length(value) {
                style.max_width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
        "min-height" => {
            if let Some(length) = parse_length(value) {
                style.min_height = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "max-height" => {
            if let Some(length) = parse_length(value) {
                style.max_height = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 4.1 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
        "box-sizing" => match value.to_ascii_lowercase().as_str() {
            "content-box" => style.box_sizing = Some(BoxSizingValue::ContentBox),
            "border-box" => style.box_sizing = Some(BoxSizingValue::BorderBox),
            _ => warn_unsupported(name, value),
        },
        // [§ 9.2 Shorthand properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
        "margin" => apply_margin_shorthand(style, value),
        // [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
        "margin-top" => {
            if let Some(length) = parse_auto_length(value) {
                style.margin_top = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "margin-right" => {
            if let Some(length) = parse_auto_length(value) {
                style.margin_right = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "margin-bottom" => {
            if let Some(length) = parse_auto_length(value) {
                style.margin_bottom = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "margin-left" => {
            if let Some(length) = parse_auto_length(value) {
                style.margin_left = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "padding" => apply_padding_shorthand(style, value),
        // [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
        "padding-top" => {
            if let Some(length) = parse_length(value) {
                style.padding_top = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "padding-right" => {
            if let Some(length) = parse_length(value) {
                style.padding_right = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "padding-bottom" => {
            if let Some(length) = parse_length(value) {
                style.padding_bottom = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "padding-left" => {
            if let Some(length) = parse_length(value) {
                style.padding_left = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // Only the width component of a border participates in layout;
        // style and color tokens are skipped.
        "border" => {
            if value.eq_ignore_ascii_case("none") {
                set_border_widths(style, LengthValue::Px(0.0));
            } else if let Some(width) = value.split_whitespace().find_map(parse_length) {
                set_border_widths(style, width);
            } else {
                warn_unsupported(name, value);
            }
        }
        "border-width" => apply_border_width_shorthand(style, value),
        // [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
        "border-top-width" => {
            if let Some(length) = parse_length(value) {
                style.border_top_width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "border-right-width" => {
            if let Some(length) = parse_length(value) {
                style.border_right_width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "border-bottom-width" => {
            if let Some(length) = parse_length(value) {
                style.border_bottom_width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "border-left-width" => {
            if let Some(length) = parse_length(value) {
                style.border_left_width = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
        "top" => {
            if let Some(length) = parse_auto_length(value) {
                style.top = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "right" => {
            if let Some(length) = parse_auto_length(value) {
                style.right = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "bottom" => {
            if let Some(length) = parse_auto_length(value) {
                style.bottom = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        "left" => {
            if let Some(length) = parse_auto_length(value) {
                style.left = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
        "overflow" => match value.to_ascii_lowercase().as_str() {
            "visible" => style.overflow = Some(OverflowValue::Visible),
            "hidden" => style.overflow = Some(OverflowValue::Hidden),
            "scroll" => style.overflow = Some(OverflowValue::Scroll),
            "auto" => style.overflow = Some(OverflowValue::Auto),
            _ => warn_unsupported(name, value),
        },
        // [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
        "z-index" => {
            if let Ok(z) = value.parse::<i32>() {
                style.z_index = Some(z);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
        "font-size" => {
            if let Some(length) = parse_length(value) {
                style.font_size = Some(length);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
        "line-height" => {
            if let Some(line_height) = parse_line_height(value) {
                style.line_height = Some(line_height);
            } else {
                warn_unsupported(name, value);
            }
        }
        // [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
        "text-align" => match value.to_ascii_lowercase().as_str() {
            "left" => style.text_align = Some(TextAlignValue::Left),
            "right" => style.text_align = Some(TextAlignValue::Right),
            "center" => style.text_align = Some(TextAlignValue::Center),
            "justify" => style.text_align = Some(TextAlignValue::Justify),
            _ => warn_unsupported(name, value),
        },
        // [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
        "white-space" => match value.to_ascii_lowercase().as_str() {
            "normal" => style.white_space = Some(WhiteSpaceValue::Normal),
            "nowrap" => style.white_space = Some(WhiteSpaceValue::Nowrap),
            _ => warn_unsupported(name, value),
        },
        _ => warn_once("Loader", &format!("unsupported property '{name}'")),
    }
}

fn warn_unsupported(name: &str, value: &str) {
    warn_once("Loader", &format!("unsupported value in '{name}: {value}'"));
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// "If there is only one component value, it applies to all sides. If
/// there are two values, the top and bottom margins are set to the first
/// value and the right and left margins are set to the second. If there
/// are three values, the top is set to the first value, the left and right
/// are set to the second, and the bottom is set to the third. If there are
/// four values, they apply to the top, right, bottom, and left,
/// respectively."
fn apply_margin_shorthand(style: &mut ComputedStyle, value: &str) {
    let sides: Vec<AutoLength> = value
        .split_whitespace()
        .filter_map(parse_auto_length)
        .collect();
    let expanded = match sides.as_slice() {
        // RULE 1-VALUE: "it applies to all sides."
        &[all] => (all, all, all, all),
        // RULE 2-VALUE: vertical then horizontal.
        &[vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
        // RULE 3-VALUE: top, horizontal, bottom.
        &[top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
        // RULE 4-VALUE: top, right, bottom, left.
        &[top, right, bottom, left] => (top, right, bottom, left),
        _ => {
            warn_unsupported("margin", value);
            return;
        }
    };
    style.margin_top = Some(expanded.0);
    style.margin_right = Some(expanded.1);
    style.margin_bottom = Some(expanded.2);
    style.margin_left = Some(expanded.3);
}

/// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
///
/// Same expansion rules as the margin shorthand, without `auto`.
fn apply_padding_shorthand(style: &mut ComputedStyle, value: &str) {
    let Some(expanded) = expand_length_shorthand(value) else {
        warn_unsupported("padding", value);
        return;
    };
    style.padding_top = Some(expanded.0);
    style.padding_right = Some(expanded.1);
    style.padding_bottom = Some(expanded.2);
    style.padding_left = Some(expanded.3);
}

/// [§ 8.5.1 'border-width'](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
fn apply_border_width_shorthand(style: &mut ComputedStyle, value: &str) {
    let Some(expanded) = expand_length_shorthand(value) else {
        warn_unsupported("border-width", value);
        return;
    };
    style.border_top_width = Some(expanded.0);
    style.border_right_width = Some(expanded.1);
    style.border_bottom_width = Some(expanded.2);
    style.border_left_width = Some(expanded.3);
}

/// Expand a 1-4 value length list to (top, right, bottom, left).
fn expand_length_shorthand(value: &str) -> Option<(LengthValue, LengthValue, LengthValue, LengthValue)> {
    let sides: Vec<LengthValue> = value.split_whitespace().filter_map(parse_length).collect();
    match sides.as_slice() {
        &[all] => Some((all, all, all, all)),
        &[vertical, horizontal] => Some((vertical, horizontal, vertical, horizontal)),
        &[top, horizontal, bottom] => Some((top, horizontal, bottom, horizontal)),
        &[top, right, bottom, left] => Some((top, right, bottom, left)),
        _ => None,
    }
}

fn set_border_widths(style: &mut ComputedStyle, width: LengthValue) {
    style.border_top_width = Some(width);
    style.border_right_width = Some(width);
    style.border_bottom_width = Some(width);
    style.border_left_width = Some(width);
}

fn parse_display(value: &str) -> Option<DisplayValue> {
    match value.to_ascii_lowercase().as_str() {
        "block" => Some(DisplayValue::block()),
        "inline" => Some(DisplayValue::inline()),
        "inline-block" => Some(DisplayValue::inline_block()),
        "flow-root" => Some(DisplayValue::flow_root()),
        "table" => Some(DisplayValue::table()),
        "flex" => Some(DisplayValue::flex()),
        "grid" => Some(DisplayValue::grid()),
        _ => None,
    }
}

fn parse_position(value: &str) -> Option<PositionValue> {
    match value.to_ascii_lowercase().as_str() {
        "static" => Some(PositionValue::Static),
        "relative" => Some(PositionValue::Relative),
        "absolute" => Some(PositionValue::Absolute),
        "fixed" => Some(PositionValue::Fixed),
        _ => None,
    }
}

fn parse_float(value: &str) -> Option<FloatValue> {
    match value.to_ascii_lowercase().as_str() {
        "none" => Some(FloatValue::None),
        "left" => Some(FloatValue::Left),
        "right" => Some(FloatValue::Right),
        _ => None,
    }
}

fn parse_clear(value: &str) -> Option<ClearValue> {
    match value.to_ascii_lowercase().as_str() {
        "none" => Some(ClearValue::None),
        "left" => Some(ClearValue::Left),
        "right" => Some(ClearValue::Right),
        "both" => Some(ClearValue::Both),
        _ => None,
    }
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// "after a zero length, the unit identifier is optional"
fn parse_length(value: &str) -> Option<LengthValue> {
    let value = value.trim();
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok().map(LengthValue::Px);
    }
    if let Some(number) = value.strip_suffix("em") {
        return number.trim().parse().ok().map(LengthValue::Em);
    }
    if let Some(number) = value.strip_suffix("vw") {
        return number.trim().parse().ok().map(LengthValue::Vw);
    }
    if let Some(number) = value.strip_suffix("vh") {
        return number.trim().parse().ok().map(LengthValue::Vh);
    }
    if let Some(number) = value.strip_suffix('%') {
        return number.trim().parse().ok().map(LengthValue::Percent);
    }
    if value == "0" {
        return Some(LengthValue::Px(0.0));
    }
    None
}

fn parse_auto_length(value: &str) -> Option<AutoLength> {
    if value.eq_ignore_ascii_case("auto") {
        return Some(AutoLength::Auto);
    }
    parse_length(value).map(AutoLength::Length)
}

fn parse_line_height(value: &str) -> Option<LineHeightValue> {
    if value.eq_ignore_ascii_case("normal") {
        return Some(LineHeightValue::Normal);
    }
    // A bare number is a font-size multiplier, not a length.
    if let Ok(number) = value.parse::<f64>() {
        return Some(LineHeightValue::Number(number));
    }
    parse_length(value).map(LineHeightValue::Length)
}
