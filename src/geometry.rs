use serde::{Deserialize, Serialize};

/// A point in continuous scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Axis-aligned rectangle, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two arbitrary corner points, normalized so that
    /// width and height are non-negative.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Positive overlap area only; rectangles that merely touch share none.
    pub fn overlap_area(&self, other: &Rect) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 { w * h } else { 0.0 }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Grown outward by `dx`/`dy` on each side.
    pub fn expanded(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + dx * 2.0,
            self.height + dy * 2.0,
        )
    }

    pub fn translated(&self, by: Point) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }
}

/// Coordinate mapping a node exposes to the routing core, so anchor
/// resolution does not depend on any rendering framework's item parenting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub translate: Point,
}

impl Transform {
    pub fn new(translate: Point) -> Self {
        Self { translate }
    }

    pub fn local_to_world(&self, p: Point) -> Point {
        Point::new(p.x + self.translate.x, p.y + self.translate.y)
    }

    pub fn world_to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.translate.x, p.y - self.translate.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_normalizes_corners() {
        let r = Rect::from_points(Point::new(50.0, 10.0), Point::new(-20.0, 40.0));
        assert_eq!(r.x, -20.0);
        assert_eq!(r.y, 10.0);
        assert_eq!(r.width, 70.0);
        assert_eq!(r.height, 30.0);
    }

    #[test]
    fn touching_rects_have_no_overlap_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.overlap_area(&b), 0.0);
        assert!(a.overlap_area(&Rect::new(5.0, 5.0, 10.0, 10.0)) > 0.0);
    }

    #[test]
    fn transform_round_trips() {
        let t = Transform::new(Point::new(100.0, -25.0));
        let p = Point::new(3.0, 4.0);
        let back = t.world_to_local(t.local_to_world(p));
        assert_eq!(back, p);
    }
}
