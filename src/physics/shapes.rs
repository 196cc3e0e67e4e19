//! Shape primitives: circles and axis-aligned boxes
//!
//! `Aabb` keeps `min <= max` on both axes only when built through one of its
//! factories. Code that edits `min`/`max` directly (an editor dragging a
//! corner, for instance) must call [`Aabb::validate`] afterwards.

use serde::{Deserialize, Serialize};

use super::math::{Real, Vec2};

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center
    pub position: Vec2,
    /// Radius, expected non-negative (not enforced)
    pub radius: Real,
}

impl Circle {
    pub fn new(position: Vec2, radius: Real) -> Self {
        Self { position, radius }
    }

    /// Smallest axis-aligned box containing the circle
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center_half_size(self.position, Vec2::splat(self.radius))
    }
}

/// An axis-aligned box given by its two extreme corners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from two corners, swapping components as needed
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        let mut aabb = Self { min, max };
        aabb.validate();
        aabb
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self::from_center_half_size(center, size * 0.5)
    }

    pub fn from_center_half_size(center: Vec2, half_size: Vec2) -> Self {
        Self::from_min_max(center - half_size, center + half_size)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn half_size(&self) -> Vec2 {
        self.size() * 0.5
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Restore `min <= max` on both axes by swapping offending components
    pub fn validate(&mut self) {
        if self.max.x < self.min.x {
            std::mem::swap(&mut self.max.x, &mut self.min.x);
        }
        if self.max.y < self.min.y {
            std::mem::swap(&mut self.max.y, &mut self.min.y);
        }
    }

    /// Whether a point lies inside or on the border
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Point of the box closest to `point` (the point itself when inside)
    #[inline]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aabb_from_center_size() {
        let aabb = Aabb::from_center_size(Vec2::new(1.0, 2.0), Vec2::new(4.0, 2.0));
        assert_eq!(aabb.min, Vec2::new(-1.0, 1.0));
        assert_eq!(aabb.max, Vec2::new(3.0, 3.0));
        assert_eq!(aabb.center(), Vec2::new(1.0, 2.0));
        assert_eq!(aabb.size(), Vec2::new(4.0, 2.0));
        assert_eq!(aabb.half_size(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_aabb_validate_after_direct_edit() {
        let mut aabb = Aabb::from_min_max(Vec2::ZERO, Vec2::ONE);
        // Editor drags the max corner past the min corner
        aabb.max = Vec2::new(-2.0, 0.5);
        aabb.validate();
        assert_eq!(aabb.min, Vec2::new(-2.0, 0.0));
        assert_eq!(aabb.max, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_negative_size_is_repaired() {
        let aabb = Aabb::from_center_size(Vec2::ZERO, Vec2::new(-2.0, 4.0));
        assert_eq!(aabb.min, Vec2::new(-1.0, -2.0));
        assert_eq!(aabb.max, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_contains_and_closest_point() {
        let aabb = Aabb::from_min_max(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert!(aabb.contains_point(Vec2::new(1.0, 0.0)));
        assert!(!aabb.contains_point(Vec2::new(1.1, 0.0)));
        assert_eq!(aabb.closest_point(Vec2::new(3.0, 0.5)), Vec2::new(1.0, 0.5));
        assert_eq!(aabb.closest_point(Vec2::new(0.2, 0.3)), Vec2::new(0.2, 0.3));
    }

    #[test]
    fn test_circle_bounding_box() {
        let circle = Circle::new(Vec2::new(2.0, -1.0), 0.5);
        let aabb = circle.bounding_box();
        assert_eq!(aabb.min, Vec2::new(1.5, -1.5));
        assert_eq!(aabb.max, Vec2::new(2.5, -0.5));
    }

    proptest! {
        #[test]
        fn factories_keep_min_below_max(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            for aabb in [
                Aabb::from_min_max(a, b),
                Aabb::from_center_size(a, b),
                Aabb::from_center_half_size(a, b),
            ] {
                prop_assert!(aabb.min.x <= aabb.max.x);
                prop_assert!(aabb.min.y <= aabb.max.y);
            }
        }
    }
}
