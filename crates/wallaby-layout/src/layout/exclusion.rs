//! Immutable exclusion space.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current
//! line. The most interesting characteristic of a float (or "floated" or
//! "floating" box) is that content may flow along its side."
//!
//! The exclusion space answers one question for the inline pipeline: how far
//! do floats intrude into a given vertical band. It is a value type. Adding
//! an exclusion produces a new space and leaves the receiver untouched, so a
//! constraint space snapshot taken before a float was placed keeps answering
//! queries as if the float did not exist.

use std::rc::Rc;

use serde::Serialize;

use super::box_model::Rect;

/// Which side of the formatting context an exclusion hangs from.
///
/// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left.
    /// Content flows on the right side of the box."
    Left,
    /// "Similar to 'left', except the box is floated to the right, and
    /// content flows on the left side of the box."
    Right,
}

/// One float's intrusion into the available inline space.
///
/// The rect is the float's margin box. Its x coordinate is relative to the
/// formatting context's content-left edge; its y coordinate is in document
/// space, the same frame the inline pipeline runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exclusion {
    /// The float's margin box.
    pub rect: Rect,
    /// Which container edge the float is attached to.
    pub side: FloatSide,
}

/// An immutable set of exclusions for one formatting context.
///
/// The exclusion list is reference-counted so that cloning a space (which
/// every constraint-space "with" operation does) copies a pointer, not the
/// list. Only [`ExclusionSpace::add`] allocates.
#[derive(Debug, Clone)]
pub struct ExclusionSpace {
    exclusions: Rc<Vec<Exclusion>>,
    /// Content width of the formatting context the exclusions live in.
    /// Right-float intrusions are measured back from this edge.
    inline_size: f32,
}

impl ExclusionSpace {
    /// An empty space for a formatting context `inline_size` wide.
    #[must_use]
    pub fn new(inline_size: f32) -> Self {
        Self {
            exclusions: Rc::new(Vec::new()),
            inline_size,
        }
    }

    /// Width of the formatting context this space describes.
    #[must_use]
    pub const fn inline_size(&self) -> f32 {
        self.inline_size
    }

    /// Number of exclusions recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exclusions.len()
    }

    /// True when no float has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty()
    }

    /// A new space containing everything in `self` plus `exclusion`.
    ///
    /// The receiver is not modified; existing references keep observing the
    /// old set. This is the only operation that copies the exclusion list.
    #[must_use]
    pub fn add(&self, exclusion: Exclusion) -> Self {
        let mut exclusions = (*self.exclusions).clone();
        exclusions.push(exclusion);
        Self {
            exclusions: Rc::new(exclusions),
            inline_size: self.inline_size,
        }
    }

    /// Float intrusion into the vertical band `[y, y + height)`.
    ///
    /// Returns `(left_offset, right_offset)`: how far content in that band
    /// must start after the content-left edge, and how far before the
    /// content-right edge it must end. An empty space reports `(0, 0)`.
    ///
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    /// "a line box is next to a float when there exists a vertical position
    /// that satisfies all of these four conditions: (a) at or below the top
    /// of the line box, (b) at or above the bottom of the line box, (c)
    /// below the top margin edge of the float, and (d) above the float's
    /// bottom margin edge."
    ///
    /// Overlap is strict: a float whose bottom edge sits exactly at `y`, or
    /// whose top edge sits exactly at `y + height`, does not constrain the
    /// band.
    #[must_use]
    pub fn available_inline_offsets(&self, y: f32, height: f32) -> (f32, f32) {
        let band_bottom = y + height;
        // Innermost edges seen so far; floats can overlap each other, so the
        // intrusion is the outermost occupied edge, not a sum of widths.
        let mut left_edge = 0.0_f32;
        let mut right_edge = self.inline_size;

        for exclusion in self.exclusions.iter() {
            if !exclusion.rect.overlaps_vertical_band(y, band_bottom) {
                continue;
            }
            match exclusion.side {
                FloatSide::Left => left_edge = left_edge.max(exclusion.rect.right()),
                FloatSide::Right => right_edge = right_edge.min(exclusion.rect.x),
            }
        }

        (left_edge, self.inline_size - right_edge)
    }
}
