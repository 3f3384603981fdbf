//! Geometric primitives for OCR layout reconstruction.
//!
//! OCR engines return quadrilateral bounding boxes that may be slightly
//! rotated, so spans are always derived from min/max across corners, never
//! by subtracting adjacent corners directly.

/// A 2D point in page space (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A four-corner polygon describing a word or line's position on the page.
///
/// Corners are ordered top-left, top-right, bottom-right, bottom-left as
/// returned by OCR engines, but consumers must not assume axis alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Top-left corner
    pub tl: Point,
    /// Top-right corner
    pub tr: Point,
    /// Bottom-right corner
    pub br: Point,
    /// Bottom-left corner
    pub bl: Point,
}

/// Axis-aligned extent of a [`Quad`], derived from min/max corner spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge (min of the two left-corner x's)
    pub left: f64,
    /// Top edge (min of the two top-corner y's)
    pub top: f64,
    /// Right edge (max of the two right-corner x's)
    pub right: f64,
    /// Bottom edge (max of the two bottom-corner y's)
    pub bottom: f64,
    /// `right - left`
    pub width: f64,
    /// `bottom - top`
    pub height: f64,
    /// `(top + bottom) / 2`
    pub center_y: f64,
}

impl Quad {
    /// Create a quad from four corners.
    pub fn new(tl: Point, tr: Point, br: Point, bl: Point) -> Self {
        Self { tl, tr, br, bl }
    }

    /// Create an axis-aligned quad from edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanlayer::geometry::Quad;
    ///
    /// let q = Quad::axis_aligned(10.0, 20.0, 110.0, 40.0);
    /// let b = q.bounds();
    /// assert_eq!(b.width, 100.0);
    /// assert_eq!(b.height, 20.0);
    /// assert_eq!(b.center_y, 30.0);
    /// ```
    pub fn axis_aligned(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            tl: Point::new(left, top),
            tr: Point::new(right, top),
            br: Point::new(right, bottom),
            bl: Point::new(left, bottom),
        }
    }

    /// Parse a quad from the wire's flat corner list
    /// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
    ///
    /// Returns `None` for short arrays or non-finite coordinates; callers
    /// treat that as unknown geometry and use the textual fallback path.
    pub fn from_flat(coords: &[f64]) -> Option<Self> {
        if coords.len() < 8 || coords[..8].iter().any(|c| !c.is_finite()) {
            return None;
        }
        Some(Self {
            tl: Point::new(coords[0], coords[1]),
            tr: Point::new(coords[2], coords[3]),
            br: Point::new(coords[4], coords[5]),
            bl: Point::new(coords[6], coords[7]),
        })
    }

    /// Derive the axis-aligned extent of this quad.
    pub fn bounds(&self) -> Bounds {
        let left = self.tl.x.min(self.bl.x);
        let right = self.tr.x.max(self.br.x);
        let top = self.tl.y.min(self.tr.y);
        let bottom = self.bl.y.max(self.br.y);
        Bounds {
            left,
            top,
            right,
            bottom,
            width: right - left,
            height: bottom - top,
            center_y: (top + bottom) / 2.0,
        }
    }

    /// Smallest axis-aligned quad covering both inputs.
    pub fn union(&self, other: &Quad) -> Quad {
        let a = self.bounds();
        let b = other.bounds();
        Quad::axis_aligned(
            a.left.min(b.left),
            a.top.min(b.top),
            a.right.max(b.right),
            a.bottom.max(b.bottom),
        )
    }
}

/// Average glyph height of two boxes, guarded against degenerate
/// zero-area geometry.
///
/// Returns `fallback` (normally 12.0 units) when the computed average is
/// not positive, so threshold ratios always have a usable scale.
pub fn safe_height(a: &Bounds, b: &Bounds, fallback: f64) -> f64 {
    let avg = (a.height + b.height) / 2.0;
    if avg > 0.0 {
        avg
    } else {
        fallback
    }
}

/// Safely compare two floating point numbers, handling NaN cases.
///
/// NaN values are treated as equal to each other and greater than all
/// other values, so sorting never panics.
#[inline]
pub fn safe_float_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_rotated_quad() {
        // Slightly rotated: corners are not axis aligned.
        let q = Quad::new(
            Point::new(10.0, 2.0),
            Point::new(100.0, 0.0),
            Point::new(102.0, 20.0),
            Point::new(12.0, 22.0),
        );
        let b = q.bounds();
        assert_eq!(b.left, 10.0);
        assert_eq!(b.right, 102.0);
        assert_eq!(b.top, 0.0);
        assert_eq!(b.bottom, 22.0);
        assert_eq!(b.width, 92.0);
        assert_eq!(b.height, 22.0);
        assert_eq!(b.center_y, 11.0);
    }

    #[test]
    fn test_from_flat_rejects_short_input() {
        assert!(Quad::from_flat(&[1.0, 2.0, 3.0]).is_none());
        assert!(Quad::from_flat(&[]).is_none());
    }

    #[test]
    fn test_from_flat_rejects_nan() {
        let coords = [0.0, 0.0, 10.0, f64::NAN, 10.0, 10.0, 0.0, 10.0];
        assert!(Quad::from_flat(&coords).is_none());
    }

    #[test]
    fn test_from_flat_valid() {
        let coords = [0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0];
        let q = Quad::from_flat(&coords).unwrap();
        assert_eq!(q.bounds().width, 10.0);
        assert_eq!(q.bounds().height, 5.0);
    }

    #[test]
    fn test_safe_height_fallback() {
        let degenerate = Quad::axis_aligned(5.0, 5.0, 5.0, 5.0).bounds();
        assert_eq!(safe_height(&degenerate, &degenerate, 12.0), 12.0);

        let normal = Quad::axis_aligned(0.0, 0.0, 10.0, 20.0).bounds();
        assert_eq!(safe_height(&normal, &normal, 12.0), 20.0);
        // Mixed: average of 20 and 0 is 10, still positive.
        assert_eq!(safe_height(&normal, &degenerate, 12.0), 10.0);
    }

    #[test]
    fn test_union() {
        let a = Quad::axis_aligned(0.0, 0.0, 10.0, 10.0);
        let b = Quad::axis_aligned(20.0, 5.0, 30.0, 25.0);
        let u = a.union(&b).bounds();
        assert_eq!(u.left, 0.0);
        assert_eq!(u.right, 30.0);
        assert_eq!(u.bottom, 25.0);
    }

    #[test]
    fn test_safe_float_cmp_nan() {
        use std::cmp::Ordering;
        assert_eq!(safe_float_cmp(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(safe_float_cmp(f64::NAN, 1.0), Ordering::Greater);
        assert_eq!(safe_float_cmp(1.0, f64::NAN), Ordering::Less);
        assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
    }
}
