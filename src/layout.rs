//! Rectangle splitting for the interface layout
//!
//! Every region of the display is derived from the window rectangle by
//! repeatedly cutting a sized piece off one edge. The results are plain
//! values, recomputed on every iteration of the render loop.
//!
//! A split never fails. If the requested size is bigger than the
//! rectangle, the remainder comes out with a negative width or height,
//! which callers treat as "too small to render".

/// An axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// True if the rectangle has positive area and can be drawn into
    pub fn is_drawable(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    /// True if either dimension went negative during layout
    pub fn is_degenerate(&self) -> bool {
        self.w < 0 || self.h < 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Intersection with another rectangle, or `None` if they don't overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }
}

/// Which edge of a rectangle a split is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

/// How to divide a rectangle in two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Cut `size` pixels from one edge, leaving `spacer` pixels between
    /// the piece and the remainder
    Fixed { anchor: Anchor, size: i32, spacer: i32 },

    /// Take column `index` of `count` equal columns, with `border`
    /// pixels between neighbouring columns
    Column { index: i32, count: i32, border: i32 },

    /// Take row `index` of `count` equal rows, with `border` pixels
    /// between neighbouring rows
    Row { index: i32, count: i32, border: i32 },
}

pub fn from_top(size: i32, spacer: i32) -> Edge {
    Edge::Fixed { anchor: Anchor::Top, size, spacer }
}

pub fn from_bottom(size: i32, spacer: i32) -> Edge {
    Edge::Fixed { anchor: Anchor::Bottom, size, spacer }
}

pub fn from_left(size: i32, spacer: i32) -> Edge {
    Edge::Fixed { anchor: Anchor::Left, size, spacer }
}

pub fn from_right(size: i32, spacer: i32) -> Edge {
    Edge::Fixed { anchor: Anchor::Right, size, spacer }
}

/// Equal 1-of-n partition across the width
///
/// Intended to be applied repeatedly to the remainder of the previous
/// split, with `index` counting up from zero, so that each call peels
/// off the left-most of the columns still to be placed.
pub fn columns(index: i32, count: i32, border: i32) -> Edge {
    Edge::Column { index, count, border }
}

/// Equal 1-of-n partition down the height; see [`columns`]
pub fn rows(index: i32, count: i32, border: i32) -> Edge {
    Edge::Row { index, count, border }
}

/// Piece width for one of the remaining `count - index` columns
fn share(extent: i32, index: i32, count: i32, border: i32) -> (i32, i32) {
    let remaining = (count - index).max(1);
    let spacer = if remaining > 1 { border } else { 0 };
    let size = (extent - border * (remaining - 1)) / remaining;
    (size, spacer)
}

/// Divide `rect` along one edge, returning the sized piece and the
/// remainder
pub fn split(rect: Rect, edge: Edge) -> (Rect, Rect) {
    let (anchor, size, spacer) = match edge {
        Edge::Fixed { anchor, size, spacer } => (anchor, size, spacer),
        Edge::Column { index, count, border } => {
            let (size, spacer) = share(rect.w, index, count, border);
            (Anchor::Left, size, spacer)
        }
        Edge::Row { index, count, border } => {
            let (size, spacer) = share(rect.h, index, count, border);
            (Anchor::Top, size, spacer)
        }
    };

    let rest = |extent: i32| extent - size - spacer;

    match anchor {
        Anchor::Top => (
            Rect::new(rect.x, rect.y, rect.w, size),
            Rect::new(rect.x, rect.y + size + spacer, rect.w, rest(rect.h)),
        ),
        Anchor::Bottom => (
            Rect::new(rect.x, rect.y + rect.h - size, rect.w, size),
            Rect::new(rect.x, rect.y, rect.w, rest(rect.h)),
        ),
        Anchor::Left => (
            Rect::new(rect.x, rect.y, size, rect.h),
            Rect::new(rect.x + size + spacer, rect.y, rest(rect.w), rect.h),
        ),
        Anchor::Right => (
            Rect::new(rect.x + rect.w - size, rect.y, size, rect.h),
            Rect::new(rect.x, rect.y, rest(rect.w), rect.h),
        ),
    }
}

/// Inset all four edges by `margin`
pub fn shrink(rect: Rect, margin: i32) -> Rect {
    Rect::new(
        rect.x + margin,
        rect.y + margin,
        rect.w - 2 * margin,
        rect.h - 2 * margin,
    )
}

/// Number of whole rows of height `row_height` that fit in `rect`
pub fn count_rows(rect: Rect, row_height: i32) -> usize {
    if row_height <= 0 || rect.h <= 0 {
        return 0;
    }
    (rect.h / row_height) as usize
}
