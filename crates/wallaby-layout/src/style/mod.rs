//! Style input for the layout engine
//!
//! [Cascading Style Sheets Level 2 Revision 1](https://www.w3.org/TR/CSS2/)
//!
//! The engine takes already-computed style as input. The embedder is
//! responsible for parsing and cascading; this module defines the value
//! types and the per-element [`ComputedStyle`] record the engine reads.

pub mod computed;
mod display;
mod values;

pub use computed::{ComputedStyle, StyleMap};
pub use display::{DisplayValue, InnerDisplayType, OuterDisplayType};
pub use values::{
    AutoLength, BoxSizingValue, ClearValue, DEFAULT_FONT_SIZE_PX, FloatValue, LengthValue,
    LineHeightValue, OverflowValue, PositionValue, TextAlignValue, WhiteSpaceValue,
};
