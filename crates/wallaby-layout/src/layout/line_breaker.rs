//! Line breaking, the second phase of inline layout.
//!
//! [§ 5.5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "When inline-level content is laid out into lines, it is broken across
//! line boxes."
//!
//! The breaker consumes the measured item list from collection and decides
//! where lines end. It never positions anything: its output records which
//! items landed on each line (splitting text items at soft wrap
//! opportunities where needed) together with the vertical position and the
//! band of available width the decision was made against. The input item
//! list is read-only; split continuations are fresh items.

use super::box_model::Size;
use super::constraint::ConstraintSpace;
use super::inline::{FontMetrics, InlineItem, InlineItemKind};

/// One broken line: the items placed on it and the geometry the breaking
/// decision used.
///
/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The width of a line box is determined by a containing block and the
/// presence of floats."
#[derive(Debug, Clone, PartialEq)]
pub struct LineInfo {
    /// Items on this line, in order. Text items may be split continuations
    /// of a collected item.
    pub items: Vec<InlineItem>,

    /// Top of the line, relative to the start position given to the
    /// breaker.
    pub y: f32,

    /// Line height: the maximum height contribution among the items.
    ///
    /// "The height of the line box is the distance between the uppermost
    /// box top and the lowermost box bottom."
    pub height: f32,

    /// Distance from the containing block's content left edge to where
    /// this line starts, as dictated by left-side exclusions at its band.
    pub left_offset: f32,

    /// Width that was available for this line after subtracting exclusions
    /// on both sides. Fragment construction compares these between passes
    /// to detect convergence.
    pub available_width: f32,
}

/// Break a collected item list into lines.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "In general, the left edge of a line box touches the left edge of its
/// containing block and the right edge touches the right edge of its
/// containing block. However, floating boxes may come between the
/// containing block edge and the line box edge."
///
/// Available width for each line comes from probing `constraint`'s
/// exclusion space with a band of `strut_height` at the line's
/// candidate Y. `start_y` is the Y of the first line in the same
/// coordinate space as the exclusions.
#[must_use]
pub fn break_into_lines(
    items: &[InlineItem],
    constraint: &ConstraintSpace,
    metrics: &dyn FontMetrics,
    start_y: f32,
    strut_height: f32,
) -> Vec<LineInfo> {
    let mut breaker = LineBreaker {
        constraint,
        metrics,
        strut_height,
        lines: Vec::new(),
        current: Vec::new(),
        width_used: 0.0,
        has_content: false,
        y: start_y,
        left_offset: 0.0,
        available_width: 0.0,
    };
    breaker.probe_band();

    for item in items {
        match &item.kind {
            InlineItemKind::Text { text, font_size } => {
                breaker.add_text(text, *font_size, item.size.height);
            }
            InlineItemKind::OpenTag { .. } | InlineItemKind::CloseTag { .. } => {
                breaker.add_marker(item.clone());
            }
            InlineItemKind::Atomic { .. } => breaker.add_atomic(item.clone()),
            InlineItemKind::Float { .. } => {
                // Floats consume no inline width; they ride along on the
                // line where they occur so fragment construction can place
                // them at that line's position.
                breaker.current.push(item.clone());
            }
            InlineItemKind::Control => breaker.add_forced_break(item.clone()),
            InlineItemKind::BlockChild { .. } => breaker.add_block_child(item.clone()),
        }
    }
    breaker.finish_line();
    breaker.lines
}

/// Breaking state for one pass over the item list.
struct LineBreaker<'a> {
    constraint: &'a ConstraintSpace,
    metrics: &'a dyn FontMetrics,
    strut_height: f32,
    lines: Vec<LineInfo>,
    /// Items accumulated on the line being built.
    current: Vec<InlineItem>,
    /// Inline width consumed on the current line, markers included.
    width_used: f32,
    /// Whether the current line holds any advance-consuming content (text
    /// or an atomic). Markers and floats do not count; a line without
    /// content always accepts the next item rather than wrapping again.
    has_content: bool,
    y: f32,
    left_offset: f32,
    available_width: f32,
}

impl LineBreaker<'_> {
    /// Query the exclusion space for the band this line would occupy.
    ///
    /// The line's real height is unknown until its items are chosen, so
    /// the probe uses the strut height. A float short enough to sit inside
    /// a taller line's lower reaches is rare enough not to chase.
    fn probe_band(&mut self) {
        let (left, _right) = self
            .constraint
            .available_inline_offsets(self.y, self.strut_height);
        self.left_offset = left;
        self.available_width = self
            .constraint
            .available_inline_size(self.y, self.strut_height)
            .max(0.0);
    }

    /// [§ 5.5.1](https://www.w3.org/TR/css-text-3/#line-break-details)
    ///
    /// Add a text run, splitting it across lines at soft wrap
    /// opportunities as needed.
    fn add_text(&mut self, text: &str, font_size: f32, height: f32) {
        let mut remaining = text;
        loop {
            // "A sequence of collapsible spaces at the beginning of a line
            // is removed."
            let candidate = if self.has_content {
                remaining
            } else {
                remaining.trim_start()
            };
            if candidate.is_empty() {
                return;
            }

            // STEP 1: Place the run whole when it fits.
            let width = self.metrics.text_width(candidate, font_size);
            if self.width_used + width <= self.available_width || self.constraint.no_wrap() {
                self.push_text(candidate, font_size, width, height);
                return;
            }

            // STEP 2: Split at the last soft wrap opportunity that still
            // fits in the remaining width, then carry on with the tail.
            let remaining_width = self.available_width - self.width_used;
            if let Some(break_index) =
                find_break_opportunity(candidate, remaining_width, font_size, self.metrics)
            {
                let (head, tail) = candidate.split_at(break_index);
                // "A sequence of collapsible spaces at the end of a line is
                // removed."
                let head = head.trim_end();
                if !head.is_empty() {
                    let head_width = self.metrics.text_width(head, font_size);
                    self.push_text(head, font_size, head_width, height);
                }
                self.finish_line();
                remaining = tail;
                continue;
            }

            // STEP 3: No opportunity fits. On a line that already holds
            // content, wrap everything to the next line and retry there.
            if self.has_content {
                self.finish_line();
                remaining = candidate;
                continue;
            }

            // STEP 4: Not even the first word fits on a fresh line. Words
            // are never broken internally, so the run is placed anyway and
            // overflows.
            self.push_text(candidate, font_size, width, height);
            return;
        }
    }

    fn push_text(&mut self, text: &str, font_size: f32, width: f32, height: f32) {
        self.current.push(InlineItem {
            kind: InlineItemKind::Text {
                text: text.to_string(),
                font_size,
            },
            size: Size { width, height },
        });
        self.width_used += width;
        self.has_content = true;
    }

    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "When an inline box exceeds the width of a line box, it is split
    /// into several boxes... An atomic inline cannot be split, so it moves
    /// to the next line whole."
    fn add_atomic(&mut self, item: InlineItem) {
        let fits = self.width_used + item.size.width <= self.available_width
            || !self.has_content
            || self.constraint.no_wrap();
        if !fits {
            self.finish_line();
        }
        self.width_used += item.size.width;
        self.has_content = true;
        self.current.push(item);
    }

    /// Open and close markers occupy width like atomics but never make a
    /// line non-empty on their own.
    fn add_marker(&mut self, item: InlineItem) {
        let fits = self.width_used + item.size.width <= self.available_width
            || !self.has_content
            || self.constraint.no_wrap();
        if !fits {
            self.finish_line();
        }
        self.width_used += item.size.width;
        self.current.push(item);
    }

    /// A forced break ends the line unconditionally. The break item itself
    /// rides on the line it ends so a break on an otherwise empty line
    /// still advances by the strut.
    fn add_forced_break(&mut self, item: InlineItem) {
        self.current.push(item);
        self.finish_line();
    }

    /// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// An in-flow block-level box interrupting inline content gets a line
    /// of its own: the current line ends, the block item is emitted as a
    /// single-item line of zero height, and subsequent items start fresh.
    /// The flow builder lays the block out at that point and resumes below
    /// it.
    fn add_block_child(&mut self, item: InlineItem) {
        self.finish_line();
        // Markers still pending after the flush (an inline box opened
        // right before the interruption) ride on the block's line so
        // open/close bookkeeping survives across it.
        let mut items = std::mem::take(&mut self.current);
        items.push(item);
        self.lines.push(LineInfo {
            items,
            y: self.y,
            height: 0.0,
            left_offset: self.left_offset,
            available_width: self.available_width,
        });
        self.width_used = 0.0;
    }

    /// Close out the current line, if it has anything worth a line box.
    ///
    /// A line holding only open/close markers produces no line box; its
    /// markers carry over so they surface on the next real line.
    fn finish_line(&mut self) {
        self.trim_line_end();
        if self.current.is_empty() {
            return;
        }
        if self.current.iter().all(InlineItem::is_marker) {
            // Only markers: keep them for the next line. Y does not
            // advance and the band is unchanged.
            return;
        }

        let height = self
            .current
            .iter()
            .map(|item| item.size.height)
            .fold(0.0, f32::max);
        let items = std::mem::take(&mut self.current);
        self.lines.push(LineInfo {
            items,
            y: self.y,
            height,
            left_offset: self.left_offset,
            available_width: self.available_width,
        });

        self.y += height;
        self.width_used = 0.0;
        self.has_content = false;
        self.probe_band();
    }

    /// [§ 4.1.3 Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
    ///
    /// "A sequence of collapsible spaces at the end of a line is removed."
    fn trim_line_end(&mut self) {
        let Some(last_text) = self
            .current
            .iter_mut()
            .rev()
            .find(|item| matches!(item.kind, InlineItemKind::Text { .. }))
        else {
            return;
        };
        let InlineItemKind::Text { text, font_size } = &mut last_text.kind else {
            return;
        };
        if !text.ends_with(' ') {
            return;
        }
        let trimmed = text.trim_end().to_string();
        let new_width = self.metrics.text_width(&trimmed, *font_size);
        self.width_used -= last_text.size.width - new_width;
        last_text.size.width = new_width;
        *text = trimmed;

        if text.is_empty() {
            // The run was whitespace only; drop it entirely.
            let Some(position) = self
                .current
                .iter()
                .rposition(|item| matches!(item.kind, InlineItemKind::Text { .. }))
            else {
                return;
            };
            let _ = self.current.remove(position);
            if !self.current.iter().any(|item| {
                matches!(
                    item.kind,
                    InlineItemKind::Text { .. } | InlineItemKind::Atomic { .. }
                )
            }) {
                self.has_content = false;
            }
        }
    }
}

/// [§ 5.5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
///
/// Find the last soft wrap opportunity in `text` whose prefix fits within
/// `max_width`, as a byte index into `text`.
///
/// "A soft wrap opportunity is a position in the text where the UA may
/// choose to break."
///
/// [§ 5.5.2 Breaking Rules](https://www.w3.org/TR/css-text-3/#word-breaking)
///
/// Opportunities exist only at whitespace boundaries; words are never
/// broken internally. Returns `None` when not even the first word fits,
/// leaving the caller to wrap or force-place the whole run.
#[must_use]
pub fn find_break_opportunity(
    text: &str,
    max_width: f32,
    font_size: f32,
    metrics: &dyn FontMetrics,
) -> Option<usize> {
    let mut last_fitting_break: Option<usize> = None;

    // A break opportunity sits at each transition from whitespace to
    // non-whitespace, i.e. at the start of every word after the first.
    // Prefix widths grow monotonically, so the scan can stop at the first
    // opportunity past the limit.
    let mut prev_was_space = false;
    for (byte_index, ch) in text.char_indices() {
        let is_space = ch == ' ' || ch == '\t';
        if !is_space && prev_was_space {
            let prefix_width = metrics.text_width(&text[..byte_index], font_size);
            if prefix_width <= max_width {
                last_fitting_break = Some(byte_index);
            } else {
                return last_fitting_break;
            }
        }
        prev_was_space = is_space;
    }

    // Trailing whitespace is itself removable, so breaking right at the
    // end of the run is allowed when everything before it fits.
    if prev_was_space && metrics.text_width(text, font_size) <= max_width {
        last_fitting_break = Some(text.len());
    }

    last_fitting_break
}
