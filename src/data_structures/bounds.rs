//! Axis-aligned bounding boxes.
//!
//! `Box3` starts out empty (min at +inf, max at -inf) and grows as points or
//! other boxes are folded in. Reporting the size of an empty box yields zero
//! on every axis so callers never have to special-case scenes without geometry.

use cgmath::{Matrix4, Point3, Transform, Vector3};

/// An axis-aligned box that may be empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl Box3 {
    /// A box containing nothing.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// A box spanning `min` to `max`. Inverted corners give an empty box.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Self {
        points.into_iter().fold(Self::empty(), |bbox, p| bbox.expand_by_point(p))
    }

    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    /// True as long as nothing has been added (or only NaN garbage was).
    pub fn is_empty(&self) -> bool {
        !(self.max.x >= self.min.x && self.max.y >= self.min.y && self.max.z >= self.min.z)
    }

    pub fn expand_by_point(self, p: Point3<f32>) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    /// Merges another box into this one. Empty boxes leave `self` untouched.
    pub fn union(self, other: &Box3) -> Self {
        if other.is_empty() {
            return self;
        }
        self.expand_by_point(other.min).expand_by_point(other.max)
    }

    /// Transforms all eight corners and returns the box around them.
    ///
    /// This is how a mesh's local geometry box becomes a world-space extent:
    /// the result is axis-aligned in the target space, not a rotated box.
    pub fn apply_matrix(&self, matrix: &Matrix4<f32>) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, hi.z),
        ];
        Self::from_points(corners.into_iter().map(|c| matrix.transform_point(c)))
    }

    /// Width, height and depth. Zero on every axis for an empty box.
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::new(0.0, 0.0, 0.0)
        } else {
            self.max - self.min
        }
    }
}

impl Default for Box3 {
    fn default() -> Self {
        Self::empty()
    }
}
