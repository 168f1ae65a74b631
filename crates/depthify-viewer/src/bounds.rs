//! Axis-aligned bounding boxes

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box holding a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Smallest box containing every point, or `None` for an empty set
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::from_point(first);
        for p in iter {
            aabb.extend(p);
        }
        Some(aabb)
    }

    /// Grow to include a point
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow to include another box
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent along any axis
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// Bounds of `points` after transforming each by `matrix`
    pub fn from_transformed(points: &[[f32; 3]], matrix: Mat4) -> Option<Self> {
        Self::from_points(points.iter().map(|p| matrix.transform_point3(Vec3::from_array(*p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_no_bounds() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn center_size_and_max_dimension() {
        let aabb = Aabb::from_points([Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 3.0)]).unwrap();
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 2.5));
        assert_eq!(aabb.size(), Vec3::new(4.0, 4.0, 1.0));
        assert_eq!(aabb.max_dimension(), 4.0);
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::from_point(Vec3::ZERO);
        let b = Aabb::from_point(Vec3::new(2.0, -1.0, 5.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(2.0, 0.0, 5.0));
    }

    #[test]
    fn transformed_points_are_bounded_in_world_space() {
        let points = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let matrix = Mat4::from_scale(Vec3::splat(2.0)) * Mat4::from_translation(Vec3::X);
        let aabb = Aabb::from_transformed(&points, matrix).unwrap();
        assert_eq!(aabb.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 2.0, 2.0));
    }
}
