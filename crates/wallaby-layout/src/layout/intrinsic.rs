//! Intrinsic width measurement and shrink-to-fit sizing.
//!
//! [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//!
//! "Calculate the preferred width by formatting the content without breaking
//! lines other than where explicit line breaks occur... Also calculate the
//! preferred minimum width, e.g., by trying all possible line breaks."
//!
//! Everything here is a READ-ONLY measurement: no positions are stored and
//! no layout results are written back. Measurement never calls the flow
//! layout and the flow layout consumes only the returned widths, so boxes
//! can be measured as often as the float and inline machinery needs.

use crate::style::{AutoLength, WhiteSpaceValue};

use super::box_model::Size;
use super::inline::FontMetrics;
use super::layout_box::{BoxType, LayoutBox, FALLBACK_REPLACED_WIDTH};

/// Maximum recursion depth for intrinsic measurement.
///
/// Measurement recursion happens on top of the flow layout recursion that
/// requested it, so deeply nested trees would otherwise double their stack
/// cost. Content below the limit contributes zero width.
const MAX_MEASURE_DEPTH: usize = 64;

/// The box's max-content width: the content formatted with no line breaks
/// except forced ones.
///
/// [§ 4.2 Preferred Size Properties](https://www.w3.org/TR/css-sizing-3/#preferred-size-properties)
/// "The max-content size... the narrowest size it could take while fitting
/// around its contents if none of the soft wrap opportunities within the
/// box were taken."
///
/// Returns a content-box width; the caller adds the box's own edges.
#[must_use]
pub fn max_content_width(layout_box: &LayoutBox, metrics: &dyn FontMetrics, viewport: Size) -> f32 {
    max_content_inner(layout_box, metrics, viewport, 0)
}

/// The box's min-content width: the widest unbreakable unit of content.
///
/// "The min-content size... the largest size it could take while still
/// fitting around its contents if all of the soft wrap opportunities within
/// the box were taken."
///
/// Returns a content-box width; the caller adds the box's own edges.
#[must_use]
pub fn min_content_width(layout_box: &LayoutBox, metrics: &dyn FontMetrics, viewport: Size) -> f32 {
    min_content_inner(layout_box, metrics, viewport, 0)
}

/// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "Then the shrink-to-fit width is:
/// min(max(preferred minimum width, available width), preferred width)"
///
/// `containing_width` is the containing block's content width; the
/// available width subtracts the box's own margins, borders, and padding
/// from it. Returns the used content width.
#[must_use]
pub fn shrink_to_fit_width(
    layout_box: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    containing_width: f32,
) -> f32 {
    // STEP 1: Preferred width, "formatting the content without breaking
    // lines other than where explicit line breaks occur."
    let preferred = max_content_width(layout_box, metrics, viewport);

    // STEP 2: Preferred minimum width, "by trying all possible line
    // breaks."
    let preferred_min = min_content_width(layout_box, metrics, viewport);

    // STEP 3: Available width: the containing block minus this box's own
    // horizontal edges.
    let margin = layout_box
        .margin
        .resolve(layout_box.font_size, viewport, containing_width);
    let padding = layout_box
        .padding
        .resolve(layout_box.font_size, viewport, containing_width);
    let border = layout_box
        .border_width
        .resolve(layout_box.font_size, viewport, containing_width);
    let available = containing_width
        - margin.left.to_px_or(0.0)
        - margin.right.to_px_or(0.0)
        - border.horizontal()
        - padding.horizontal();

    // STEP 4: min(max(preferred minimum, available), preferred).
    preferred_min.max(available).min(preferred)
}

/// A child's contribution to its parent's max-content width: the child's
/// own max-content plus its horizontal edges.
fn max_contribution(
    layout_box: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    depth: usize,
) -> f32 {
    match &layout_box.box_type {
        BoxType::AnonymousInline(text) => {
            return metrics.text_width(text, layout_box.font_size);
        }
        BoxType::LineBreak => return 0.0,
        BoxType::Principal(_) => {}
    }

    let edges = horizontal_edges(layout_box, viewport);

    // An explicit non-percentage width short-circuits content measurement.
    // Percentages need the containing block, which intrinsic measurement
    // does not have, so they measure as auto.
    if let Some(AutoLength::Length(length)) = layout_box.width {
        if !length.is_percent() {
            let resolved = length.resolve(
                f64::from(layout_box.font_size),
                (f64::from(viewport.width), f64::from(viewport.height)),
                0.0,
            );
            #[allow(clippy::cast_possible_truncation)]
            return resolved as f32 + edges;
        }
    }

    if layout_box.is_replaced {
        return layout_box
            .intrinsic_width
            .unwrap_or(FALLBACK_REPLACED_WIDTH)
            + edges;
    }

    if depth >= MAX_MEASURE_DEPTH {
        return edges;
    }

    edges + max_content_inner(layout_box, metrics, viewport, depth)
}

fn max_content_inner(
    layout_box: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    depth: usize,
) -> f32 {
    // Contiguous inline-level children lay out on one unbroken line, so
    // their contributions sum; each block-level child (or forced break)
    // starts a new line, so blocks and completed runs compete by max.
    let mut widest = 0.0_f32;
    let mut inline_run = 0.0_f32;
    for child in &layout_box.children {
        if child.position.is_absolutely_positioned() {
            continue;
        }
        if matches!(child.box_type, BoxType::LineBreak) {
            widest = widest.max(inline_run);
            inline_run = 0.0;
            continue;
        }
        let contribution = max_contribution(child, metrics, viewport, depth + 1);
        if child.is_inline_level() && child.float_side.is_none() {
            inline_run += contribution;
        } else {
            widest = widest.max(inline_run);
            inline_run = 0.0;
            widest = widest.max(contribution);
        }
    }
    widest.max(inline_run)
}

/// A child's contribution to its parent's min-content width.
fn min_contribution(
    layout_box: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    depth: usize,
) -> f32 {
    match &layout_box.box_type {
        BoxType::AnonymousInline(text) => {
            // "Trying all possible line breaks" on a text run leaves its
            // widest word; under nowrap there are no break opportunities
            // and the whole run is unbreakable.
            if layout_box.white_space == WhiteSpaceValue::Nowrap {
                return metrics.text_width(text, layout_box.font_size);
            }
            return text
                .split_whitespace()
                .map(|word| metrics.text_width(word, layout_box.font_size))
                .fold(0.0, f32::max);
        }
        BoxType::LineBreak => return 0.0,
        BoxType::Principal(_) => {}
    }

    let edges = horizontal_edges(layout_box, viewport);

    if let Some(AutoLength::Length(length)) = layout_box.width {
        if !length.is_percent() {
            let resolved = length.resolve(
                f64::from(layout_box.font_size),
                (f64::from(viewport.width), f64::from(viewport.height)),
                0.0,
            );
            #[allow(clippy::cast_possible_truncation)]
            return resolved as f32 + edges;
        }
    }

    if layout_box.is_replaced {
        return layout_box
            .intrinsic_width
            .unwrap_or(FALLBACK_REPLACED_WIDTH)
            + edges;
    }

    if depth >= MAX_MEASURE_DEPTH {
        return edges;
    }

    edges + min_content_inner(layout_box, metrics, viewport, depth)
}

fn min_content_inner(
    layout_box: &LayoutBox,
    metrics: &dyn FontMetrics,
    viewport: Size,
    depth: usize,
) -> f32 {
    // With every soft wrap opportunity taken, each child wraps onto its
    // own lines; the widest single contribution wins.
    let mut widest = 0.0_f32;
    for child in &layout_box.children {
        if child.position.is_absolutely_positioned() {
            continue;
        }
        widest = widest.max(min_contribution(child, metrics, viewport, depth + 1));
    }
    widest
}

/// The box's horizontal margin, border, and padding, with percentages
/// measured as zero since no containing block is known yet.
fn horizontal_edges(layout_box: &LayoutBox, viewport: Size) -> f32 {
    let margin = layout_box.margin.resolve(layout_box.font_size, viewport, 0.0);
    let padding = layout_box
        .padding
        .resolve(layout_box.font_size, viewport, 0.0);
    let border = layout_box
        .border_width
        .resolve(layout_box.font_size, viewport, 0.0);
    margin.left.to_px_or(0.0)
        + margin.right.to_px_or(0.0)
        + border.horizontal()
        + padding.horizontal()
}

#[cfg(test)]
mod tests {
    use super::super::inline::ApproximateFontMetrics;
    use super::*;
    use crate::style::{DisplayValue, LengthValue};

    const VIEWPORT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn text_box(text: &str, font_size: f32) -> LayoutBox {
        let mut b = LayoutBox::new(
            BoxType::AnonymousInline(text.to_string()),
            DisplayValue::inline(),
        );
        b.font_size = font_size;
        b
    }

    fn block_with(children: Vec<LayoutBox>) -> LayoutBox {
        let mut b = LayoutBox::new(
            BoxType::Principal(wallaby_dom::NodeId(1)),
            DisplayValue::block(),
        );
        b.children = children;
        b
    }

    // ========== max-content ==========

    #[test]
    fn max_content_sums_inline_runs() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![text_box("aa", 10.0), text_box("bb", 10.0)]);
        // Four characters at 6px each.
        let width = max_content_width(&block, &metrics, VIEWPORT);
        assert!((width - 24.0).abs() < 0.01);
    }

    #[test]
    fn max_content_takes_max_across_block_children() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![
            block_with(vec![text_box("aaaa", 10.0)]),
            block_with(vec![text_box("bb", 10.0)]),
        ]);
        let width = max_content_width(&block, &metrics, VIEWPORT);
        assert!((width - 24.0).abs() < 0.01);
    }

    #[test]
    fn forced_break_splits_the_inline_run() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![
            text_box("aaaa", 10.0),
            LayoutBox::new(BoxType::LineBreak, DisplayValue::inline()),
            text_box("bb", 10.0),
        ]);
        let width = max_content_width(&block, &metrics, VIEWPORT);
        assert!((width - 24.0).abs() < 0.01);
    }

    #[test]
    fn explicit_width_short_circuits_measurement() {
        let metrics = ApproximateFontMetrics;
        let mut child = block_with(vec![text_box("aaaaaaaaaa", 10.0)]);
        child.width = Some(AutoLength::Length(LengthValue::Px(37.0)));
        let block = block_with(vec![child]);
        let width = max_content_width(&block, &metrics, VIEWPORT);
        assert!((width - 37.0).abs() < 0.01);
    }

    // ========== min-content ==========

    #[test]
    fn min_content_is_widest_word() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![text_box("aa bbbb cc", 10.0)]);
        let width = min_content_width(&block, &metrics, VIEWPORT);
        assert!((width - 24.0).abs() < 0.01);
    }

    #[test]
    fn nowrap_text_is_unbreakable() {
        let metrics = ApproximateFontMetrics;
        let mut text = text_box("aa bbbb cc", 10.0);
        text.white_space = WhiteSpaceValue::Nowrap;
        let block = block_with(vec![text]);
        let width = min_content_width(&block, &metrics, VIEWPORT);
        assert!((width - 60.0).abs() < 0.01);
    }

    // ========== shrink-to-fit ==========

    #[test]
    fn shrink_to_fit_uses_preferred_when_it_fits() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![text_box("aa bb", 10.0)]);
        let width = shrink_to_fit_width(&block, &metrics, VIEWPORT, 200.0);
        assert!((width - 30.0).abs() < 0.01);
    }

    #[test]
    fn shrink_to_fit_clamps_to_available_width() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![text_box("aa bb cc dd", 10.0)]);
        // Preferred is 66px; available is 40px; widest word is 12px.
        let width = shrink_to_fit_width(&block, &metrics, VIEWPORT, 40.0);
        assert!((width - 40.0).abs() < 0.01);
    }

    #[test]
    fn shrink_to_fit_never_goes_below_min_content() {
        let metrics = ApproximateFontMetrics;
        let block = block_with(vec![text_box("aaaaaaaaaa bb", 10.0)]);
        // The widest word is 60px, wider than the 20px available.
        let width = shrink_to_fit_width(&block, &metrics, VIEWPORT, 20.0);
        assert!((width - 60.0).abs() < 0.01);
    }
}
