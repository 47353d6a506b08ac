/// WEIRD Project
/// `File` geom/aabb.rs
/// `Description` Axis aligned bounding box implementation module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use crate::math::Vec2;

/// 2D axis aligned bounding box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
} // struct Aabb

impl Aabb {
    /// Box that contains nothing. Union with it is identity.
    pub const EMPTY: Aabb = Aabb {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounding box of point set
    /// * `points` - points to bound
    /// * Returns Aabb::EMPTY for empty point set
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Self {
        points.into_iter().fold(Self::EMPTY, |aabb, point| aabb.include(*point))
    } // fn from_points

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn include(self, point: Vec2) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn union(self, other: Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box grown by `amount` in every direction
    pub fn expand(self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Interval overlap on both axes. Touching boxes overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    } // fn overlaps

    pub fn size(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
} // impl Aabb

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_union_identity() {
        let b = Aabb::new(Vec2::new(-1.0, 0.0), Vec2::new(2.0, 3.0));

        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.union(b), b);
        assert_eq!(Aabb::from_points(&[]), Aabb::EMPTY);
    }

    #[test]
    fn overlap_is_symmetric_and_inclusive() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let touching = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let apart = Aabb::new(Vec2::new(1.5, 0.0), Vec2::new(2.0, 1.0));

        assert!(a.overlaps(&touching) && touching.overlaps(&a));
        assert!(!a.overlaps(&apart) && !apart.overlaps(&a));
        assert!(!a.overlaps(&Aabb::EMPTY));
    }

    #[test]
    fn bounds_of_points() {
        let b = Aabb::from_points(&[Vec2::new(1.0, 5.0), Vec2::new(-2.0, 3.0), Vec2::new(0.0, -1.0)]);

        assert_eq!(b.min, Vec2::new(-2.0, -1.0));
        assert_eq!(b.max, Vec2::new(1.0, 5.0));
        assert!(b.contains(Vec2::new(0.0, 0.0)));
        assert!(!b.contains(Vec2::new(2.0, 0.0)));
    }
}

// file geom/aabb.rs
