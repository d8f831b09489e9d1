//! Immutable constraint space for the inline pipeline.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The width of a line box is determined by a containing block and the
//! presence of floats."
//!
//! A constraint space bundles everything line breaking and fragment
//! construction need to know about their surroundings: the available size,
//! the floats already placed, and the text properties of the block being
//! laid out. It is a value type. Every `with_*` operation returns a new
//! space and shares the unchanged parts, so holding an old snapshot is
//! always safe and cloning is cheap.

use crate::style::{TextAlignValue, WhiteSpaceValue};

use super::box_model::Size;
use super::exclusion::{Exclusion, ExclusionSpace};

/// The inputs one inline layout pass runs against.
#[derive(Debug, Clone)]
pub struct ConstraintSpace {
    /// Available content size of the containing block.
    available: Size,
    /// Floats intruding into the available space.
    exclusions: ExclusionSpace,
    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    text_align: TextAlignValue,
    /// Line breaking is suppressed under `white-space: nowrap`.
    no_wrap: bool,
}

impl ConstraintSpace {
    /// A space with no exclusions, left alignment, and wrapping enabled.
    #[must_use]
    pub fn new(available: Size) -> Self {
        Self {
            available,
            exclusions: ExclusionSpace::new(available.width),
            text_align: TextAlignValue::default(),
            no_wrap: false,
        }
    }

    /// The same space with one more exclusion recorded.
    #[must_use]
    pub fn with_exclusion(&self, exclusion: Exclusion) -> Self {
        Self {
            exclusions: self.exclusions.add(exclusion),
            ..self.clone()
        }
    }

    /// The same space with its exclusion set replaced wholesale.
    ///
    /// Used when seeding a pipeline run with floats placed by earlier
    /// siblings in the same block formatting context.
    #[must_use]
    pub fn with_exclusion_space(&self, exclusions: ExclusionSpace) -> Self {
        Self {
            exclusions,
            ..self.clone()
        }
    }

    /// The same space with a different available width.
    ///
    /// The exclusion set is carried over unchanged; intrusion offsets keep
    /// being measured in the frame the exclusions were recorded in.
    #[must_use]
    pub fn with_available_width(&self, width: f32) -> Self {
        Self {
            available: Size {
                width,
                height: self.available.height,
            },
            ..self.clone()
        }
    }

    /// The same space with a different text alignment.
    #[must_use]
    pub fn with_text_align(&self, text_align: TextAlignValue) -> Self {
        Self {
            text_align,
            ..self.clone()
        }
    }

    /// The same space with wrapping suppressed or restored.
    #[must_use]
    pub fn with_white_space(&self, white_space: WhiteSpaceValue) -> Self {
        Self {
            no_wrap: matches!(white_space, WhiteSpaceValue::Nowrap),
            ..self.clone()
        }
    }

    /// Available content size of the containing block.
    #[must_use]
    pub const fn available(&self) -> Size {
        self.available
    }

    /// Available content width, ignoring floats.
    #[must_use]
    pub const fn available_width(&self) -> f32 {
        self.available.width
    }

    /// The exclusion set this space carries.
    #[must_use]
    pub const fn exclusions(&self) -> &ExclusionSpace {
        &self.exclusions
    }

    /// Text alignment of the block being laid out.
    #[must_use]
    pub const fn text_align(&self) -> TextAlignValue {
        self.text_align
    }

    /// True when line breaking is suppressed.
    #[must_use]
    pub const fn no_wrap(&self) -> bool {
        self.no_wrap
    }

    /// Float intrusion offsets for the band `[y, y + height)`.
    #[must_use]
    pub fn available_inline_offsets(&self, y: f32, height: f32) -> (f32, f32) {
        self.exclusions.available_inline_offsets(y, height)
    }

    /// Inline space left for content in the band `[y, y + height)`.
    ///
    /// Available width minus both float intrusions. May be negative when
    /// floats overconstrain the band; callers clamp.
    #[must_use]
    pub fn available_inline_size(&self, y: f32, height: f32) -> f32 {
        let (left, right) = self.available_inline_offsets(y, height);
        self.available.width - left - right
    }
}
