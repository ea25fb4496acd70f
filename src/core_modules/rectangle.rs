// THEORY:
// `Rectangle` is the output shape of the detection layer: an axis-aligned box in
// pixel coordinates with exclusive right/bottom edges, so a single pixel at (x, y)
// is `Rectangle { x0: x, y0: y, x1: x + 1, y1: y + 1 }`.
//
// Rectangles are immutable values. Merging never edits one in place; it produces a
// new bounding rectangle that replaces the group it was built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which contacts count as an overlap when merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapRule {
    /// Shared edges and shared corners count. `(0,0,1,1)` and `(1,1,2,2)` overlap.
    #[default]
    Touching,
    /// Only a shared area of positive size counts. This is the intersection test
    /// PDF toolkits such as PyMuPDF's `Rect.intersects` apply.
    Interior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rectangle {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rectangle {
    /// Corners may be given in any order; they are sorted so `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// The 1x1 box covering pixel (x, y).
    pub fn pixel(x: u32, y: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + 1,
            y1: y + 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }

    pub fn overlaps(&self, other: &Rectangle, rule: OverlapRule) -> bool {
        match rule {
            OverlapRule::Touching => {
                self.x0 <= other.x1
                    && other.x0 <= self.x1
                    && self.y0 <= other.y1
                    && other.y0 <= self.y1
            }
            OverlapRule::Interior => {
                self.x0 < other.x1
                    && other.x0 < self.x1
                    && self.y0 < other.y1
                    && other.y0 < self.y1
            }
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Bounding box of a set of rectangles, `None` when the set is empty.
    pub fn bounding<'a, I>(rects: I) -> Option<Rectangle>
    where
        I: IntoIterator<Item = &'a Rectangle>,
    {
        rects.into_iter().copied().reduce(|acc, r| acc.union(&r))
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_rectangle_has_exclusive_edges() {
        let r = Rectangle::pixel(3, 4);
        assert_eq!(r, Rectangle::new(3, 4, 4, 5));
        assert_eq!(r.area(), 1);
        assert!(r.contains_pixel(3, 4));
        assert!(!r.contains_pixel(4, 4));
    }

    #[test]
    fn new_sorts_corners() {
        assert_eq!(Rectangle::new(5, 6, 1, 2), Rectangle::new(1, 2, 5, 6));
    }

    #[test]
    fn corner_contact_depends_on_rule() {
        let a = Rectangle::pixel(0, 0);
        let b = Rectangle::pixel(1, 1);
        assert!(a.overlaps(&b, OverlapRule::Touching));
        assert!(!a.overlaps(&b, OverlapRule::Interior));
    }

    #[test]
    fn edge_contact_depends_on_rule() {
        let a = Rectangle::new(0, 0, 2, 2);
        let b = Rectangle::new(2, 0, 4, 2);
        assert!(a.overlaps(&b, OverlapRule::Touching));
        assert!(!a.overlaps(&b, OverlapRule::Interior));
    }

    #[test]
    fn shared_area_overlaps_under_both_rules() {
        let a = Rectangle::new(0, 0, 3, 3);
        let b = Rectangle::new(2, 2, 5, 5);
        for rule in [OverlapRule::Touching, OverlapRule::Interior] {
            assert!(a.overlaps(&b, rule));
            assert!(b.overlaps(&a, rule));
        }
    }

    #[test]
    fn separated_rectangles_never_overlap() {
        let a = Rectangle::pixel(0, 0);
        let b = Rectangle::pixel(2, 0);
        assert!(!a.overlaps(&b, OverlapRule::Touching));
        assert!(!a.overlaps(&b, OverlapRule::Interior));
    }

    #[test]
    fn bounding_of_group() {
        let rects = [
            Rectangle::pixel(0, 0),
            Rectangle::pixel(1, 1),
            Rectangle::pixel(2, 2),
        ];
        assert_eq!(Rectangle::bounding(&rects), Some(Rectangle::new(0, 0, 3, 3)));
        assert_eq!(Rectangle::bounding(std::iter::empty::<&Rectangle>()), None);
    }
}
