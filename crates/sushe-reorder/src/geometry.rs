#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixels (viewport coordinates, origin top-left).

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise difference `self - other`.
    #[inline]
    #[must_use]
    pub fn offset_from(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise difference `self - offset`.
    #[inline]
    #[must_use]
    pub fn translate_back(self, offset: Self) -> Self {
        Self::new(self.x - offset.x, self.y - offset.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, as reported by `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge (`top + height`).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Vertical midpoint.
    #[inline]
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Translate vertically by `dy`.
    #[inline]
    #[must_use]
    pub fn offset_y(self, dy: f64) -> Self {
        Self { y: self.y + dy, ..self }
    }

    /// All components finite and size non-negative.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// The scroll container's vertical extent, frozen at drag activation.
///
/// Mobile browser chrome showing or hiding mid-drag resizes the viewport;
/// holding this snapshot fixed keeps the auto-scroll trigger zones still for
/// the whole gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBounds {
    pub top: f64,
    pub bottom: f64,
}

impl ContainerBounds {
    /// Create bounds, swapping the edges if given inverted.
    #[must_use]
    pub fn new(top: f64, bottom: f64) -> Self {
        if bottom < top {
            Self {
                top: bottom,
                bottom: top,
            }
        } else {
            Self { top, bottom }
        }
    }

    /// Snapshot the vertical extent of a container rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.top(), rect.bottom())
    }

    /// Visible height of the container.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}
