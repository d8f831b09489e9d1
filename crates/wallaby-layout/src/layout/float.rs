//! Float placement, clearance, and containment.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! "A floated box is shifted to the left or right until its outer edge touches
//! the containing block edge or the outer edge of another float."
//!
//! Floats placed anywhere inside a block formatting context affect later
//! content anywhere in that context, so the set of active floats is carried
//! by the layout context across the whole recursive traversal. Each
//! BFC-establishing box opens a scope on entry and closes it on exit;
//! closing a scope discards the floats placed inside it, which is what keeps
//! floats from leaking past their formatting context.

use super::box_model::{Rect, Size};
use super::exclusion::{Exclusion, ExclusionSpace, FloatSide};

/// Give up searching for a lower float position after this many candidate
/// rows. Each candidate sits at an existing float's bottom edge, so a loop
/// this long means pathological float stacking.
const MAX_DROP_ITERATIONS: usize = 100;

/// Give up searching once a float has been pushed down this far past its
/// natural position.
const MAX_DROP_DESCENT_PX: f32 = 1000.0;

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
///
/// "Values have the following meanings:
///
/// left
///   Requires that the top border edge of the box be below the bottom
///   outer edge of any left-floating boxes.
///
/// right
///   Requires that the top border edge of the box be below the bottom
///   outer edge of any right-floating boxes.
///
/// both
///   Requires that the top border edge of the box be below the bottom
///   outer edge of any right-floating and left-floating boxes."
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ClearSide {
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

/// A single float that has been placed in the flow.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
#[derive(Debug, Clone)]
pub struct PlacedFloat {
    /// Which side this float is on.
    pub side: FloatSide,
    /// The margin box of the float, in document coordinates.
    pub margin_box: Rect,
}

/// One block formatting context's view of the float stack.
#[derive(Debug, Clone, Copy)]
struct FloatScope {
    /// Index into the float stack where this context's floats begin.
    base: usize,
    /// Document X of the context's content-left edge.
    origin_x: f32,
    /// Content width of the context.
    content_width: f32,
}

/// Tracks every active float during a layout traversal.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "Since a float is not in the flow, non-positioned block boxes created
/// before and after the float box flow vertically as if the float did not
/// exist. However, the current and subsequent line boxes created next to
/// the float are shortened as necessary to make room for the margin box
/// of the float."
///
/// Floats are recorded with document-space margin boxes. Queries only ever
/// see the floats of the innermost open scope, the current block formatting
/// context.
///
/// The manager is `Clone` so the inline pipeline can run trial passes: a
/// pass places floats into a copy, and the copy replaces the original only
/// once the pass's line breaks are accepted.
#[derive(Debug, Clone)]
pub struct FloatManager {
    floats: Vec<PlacedFloat>,
    root: FloatScope,
    nested: Vec<FloatScope>,
}

impl FloatManager {
    /// A manager for a document whose root formatting context starts at
    /// `origin_x` and is `content_width` wide.
    #[must_use]
    pub const fn new(origin_x: f32, content_width: f32) -> Self {
        Self {
            floats: Vec::new(),
            root: FloatScope {
                base: 0,
                origin_x,
                content_width,
            },
            nested: Vec::new(),
        }
    }

    fn current_scope(&self) -> FloatScope {
        self.nested.last().copied().unwrap_or(self.root)
    }

    /// Floats belonging to the current block formatting context.
    #[must_use]
    pub fn visible_floats(&self) -> &[PlacedFloat] {
        &self.floats[self.current_scope().base..]
    }

    /// True when the current context has placed no floats yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible_floats().is_empty()
    }

    /// True while no nested scope is open, i.e. the current context is the
    /// document's initial block formatting context.
    #[must_use]
    pub fn at_root_scope(&self) -> bool {
        self.nested.is_empty()
    }

    /// Open a scope for a box establishing a new block formatting context.
    ///
    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    /// "Floats, absolutely positioned elements, block containers... that are
    /// not block boxes, and block boxes with 'overflow' other than 'visible'
    /// ... establish new block formatting contexts for their contents."
    pub fn push_context(&mut self, origin_x: f32, content_width: f32) {
        self.nested.push(FloatScope {
            base: self.floats.len(),
            origin_x,
            content_width,
        });
    }

    /// Close the innermost scope, discarding the floats placed inside it.
    ///
    /// The root scope cannot be closed.
    pub fn pop_context(&mut self) {
        if let Some(scope) = self.nested.pop() {
            self.floats.truncate(scope.base);
        }
    }

    /// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a float of the given margin-box size at or below `candidate_y`,
    /// record it, and return its margin box in document coordinates.
    ///
    /// "A floated box is shifted to the left or right until its outer edge
    /// touches the containing block edge or the outer edge of another float."
    ///
    /// The spec defines 9 precise rules for float placement. This
    /// implementation covers:
    ///
    /// - Rule 1: a left float's left outer edge stays at or right of the
    ///   containing block's left edge.
    /// - Rules 4, 8: the float is placed as high as possible, at or below
    ///   `candidate_y`.
    /// - Rule 6: "the outer top of an element's floating box may not be
    ///   higher than the top of any line-box containing a box generated by
    ///   an element earlier in the source document" - a float moves down
    ///   only to resolve a conflict with an opposite-side float. Same-side
    ///   floats stack horizontally, extending past the container edge if
    ///   need be, and never push each other down.
    /// - Rule 9: left floats go as far left as possible, right floats as
    ///   far right.
    pub fn place(&mut self, side: FloatSide, size: Size, candidate_y: f32) -> Rect {
        let scope = self.current_scope();

        // STEP 1: Start at the highest allowed position.
        // [§ 9.5.1 Rule 8]: "A floating box must be placed as high as possible."
        let mut y = candidate_y;

        // STEP 2: Scan downward for a row where the float fits, stopping at
        // each existing float's bottom edge. The search is bounded; past the
        // bound the float is placed at its original candidate position and
        // allowed to overflow.
        for _ in 0..MAX_DROP_ITERATIONS {
            if y - candidate_y > MAX_DROP_DESCENT_PX {
                break;
            }

            let band = self.band_at(scope, y, size.height);
            let fits = band.available() >= size.width;
            let opposite_conflict = match side {
                FloatSide::Left => band.right_occupied,
                FloatSide::Right => band.left_occupied,
            };

            // STEP 3: Place unless an opposite-side float leaves too little
            // room. A band narrowed only by same-side floats never causes a
            // drop (Rule 6): the float stacks beside them instead.
            if fits || !opposite_conflict {
                return self.commit(scope, side, size, y, &band);
            }

            // STEP 4: Advance to the next float bottom edge. Stepping
            // per-edge rather than per-pixel keeps the search short.
            let next_y = self.next_float_bottom_after(y);
            if next_y <= y {
                break;
            }
            y = next_y;
        }

        // Fail open: no fitting row within bounds, keep the original
        // position and let the float overflow.
        let band = self.band_at(scope, candidate_y, size.height);
        self.commit(scope, side, size, candidate_y, &band)
    }

    fn commit(
        &mut self,
        scope: FloatScope,
        side: FloatSide,
        size: Size,
        y: f32,
        band: &Band,
    ) -> Rect {
        // [§ 9.5.1 Rule 9]: "A left-floating box must be put as far to the
        // left as possible, a right-floating box as far to the right as
        // possible."
        let local_x = match side {
            // [§ 9.5.1 Rule 1]: "The left outer edge of a left-floating box
            // may not be to the left of the left edge of its containing
            // block."
            FloatSide::Left => band.left_edge,
            // "An analogous rule holds for right-floating elements."
            FloatSide::Right => (band.right_edge - size.width).max(0.0),
        };

        let margin_box = Rect {
            x: scope.origin_x + local_x,
            y,
            width: size.width,
            height: size.height,
        };
        self.floats.push(PlacedFloat { side, margin_box });
        margin_box
    }

    /// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// Return the Y an element with this `clear` value must move down to,
    /// never less than `current_y`.
    ///
    /// "the top border edge of the box [must] be below the bottom outer edge"
    /// of the relevant floats. The bottom outer edge is the margin-box
    /// bottom, so a float's negative bottom margin pulls its clearance line
    /// up.
    #[must_use]
    pub fn clearance_y(&self, clear_side: ClearSide, current_y: f32) -> f32 {
        let mut cleared_y = current_y;
        for float in self.visible_floats() {
            let applies = match float.side {
                FloatSide::Left => matches!(clear_side, ClearSide::Left | ClearSide::Both),
                FloatSide::Right => matches!(clear_side, ClearSide::Right | ClearSide::Both),
            };
            if applies {
                cleared_y = cleared_y.max(float.margin_box.bottom());
            }
        }
        cleared_y
    }

    /// Lowest margin-box bottom among the current context's floats.
    ///
    /// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// "In addition, if the element has any floating descendants whose
    /// bottom margin edge is below the element's bottom content edge, then
    /// the height is increased to include those edges."
    #[must_use]
    pub fn max_float_bottom(&self) -> Option<f32> {
        self.visible_floats()
            .iter()
            .map(|f| f.margin_box.bottom())
            .reduce(f32::max)
    }

    /// Snapshot the current context's floats as an exclusion space for a
    /// block whose content-left edge is at document X `origin_x` and whose
    /// content is `content_width` wide.
    ///
    /// Line boxes anywhere in a block formatting context are shortened by
    /// that context's floats, so a nested block seeds its inline pipeline
    /// from this snapshot rather than starting empty.
    #[must_use]
    pub fn exclusion_space(&self, origin_x: f32, content_width: f32) -> ExclusionSpace {
        let mut space = ExclusionSpace::new(content_width);
        for float in self.visible_floats() {
            space = space.add(Exclusion {
                rect: float.margin_box.translated(-origin_x, 0.0),
                side: float.side,
            });
        }
        space
    }

    fn band_at(&self, scope: FloatScope, y: f32, height: f32) -> Band {
        let band_bottom = y + height;
        let mut band = Band {
            left_edge: 0.0,
            right_edge: scope.content_width,
            left_occupied: false,
            right_occupied: false,
        };

        for float in self.visible_floats() {
            if !float.margin_box.overlaps_vertical_band(y, band_bottom) {
                continue;
            }
            let local = float.margin_box.translated(-scope.origin_x, 0.0);
            match float.side {
                FloatSide::Left => {
                    band.left_edge = band.left_edge.max(local.right());
                    band.left_occupied = true;
                }
                FloatSide::Right => {
                    band.right_edge = band.right_edge.min(local.x);
                    band.right_occupied = true;
                }
            }
        }
        band
    }

    /// Smallest float bottom edge strictly greater than `y`, used to step
    /// the placement search downward one row at a time.
    fn next_float_bottom_after(&self, y: f32) -> f32 {
        let mut next: Option<f32> = None;
        for float in self.visible_floats() {
            let bottom = float.margin_box.bottom();
            if bottom > y && next.is_none_or(|current| bottom < current) {
                next = Some(bottom);
            }
        }
        next.unwrap_or(y)
    }
}

/// Horizontal room in one vertical band of a scope, in scope-local
/// coordinates.
struct Band {
    left_edge: f32,
    right_edge: f32,
    left_occupied: bool,
    right_occupied: bool,
}

impl Band {
    fn available(&self) -> f32 {
        (self.right_edge - self.left_edge).max(0.0)
    }
}
