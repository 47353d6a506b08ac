/// WEIRD Project
/// `File` geom/frustum.rs
/// `Description` 2D view frustum (angular wedge) implementation module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::math::*;

/// Wedge tolerance, both angular and linear
const FRUSTUM_EPSILON: f32 = 1e-4;

/// Frustum buffer inline capacity
const FRUSTUM_BUFFER_CAPACITY: usize = 4;

/// Angular bounds of non-full frustum
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrustumBounds {
    /// Clockwise-most unit direction
    pub right: Vec2,
    /// Counter-clockwise-most unit direction
    pub left: Vec2,
} // struct FrustumBounds

/// 2D frustum: all points seen from `origin` between two directions.
/// Bounded frustums always span less than PI.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    /// Frustum origin (viewer location in the current frame)
    pub origin: Vec2,
    /// Angular bounds, None for full circle
    pub bounds: Option<FrustumBounds>,
} // struct Frustum

/// Angle from `from` to `to` counter-clockwise, in [0; TAU)
fn ccw_angle(from: Vec2, to: Vec2) -> f32 {
    cross(from, to).atan2(from.dot(to)).rem_euclid(TAU)
} // fn ccw_angle

/// Polygon by half-plane `cross(direction, p - origin) * sign >= 0` clipping function
fn clip_polygon_half_plane(points: &[Vec2], origin: Vec2, direction: Vec2, sign: f32) -> Vec<Vec2> {
    let side = |p: Vec2| cross(direction, p - origin) * sign;
    let mut result = Vec::with_capacity(points.len() + 1);

    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        let (fa, fb) = (side(*a), side(*b));

        if fa >= 0.0 {
            result.push(*a);
        }
        if (fa >= 0.0) != (fb >= 0.0) {
            result.push(*a + (*b - *a) * (fa / (fa - fb)));
        }
    }

    result
} // fn clip_polygon_half_plane

impl Frustum {
    /// Full circle frustum
    pub fn full(origin: Vec2) -> Self {
        Self { origin, bounds: None }
    }

    /// Bounded frustum create function
    /// * `origin` - frustum origin
    /// * `right` - clockwise-most direction
    /// * `left` - counter-clockwise-most direction
    /// * Returns frustum. Spans of PI and more collapse to full frustum.
    pub fn new(origin: Vec2, right: Vec2, left: Vec2) -> Self {
        let right = right.normalize_or_zero();
        let left = left.normalize_or_zero();

        if right == Vec2::ZERO || left == Vec2::ZERO || ccw_angle(right, left) >= PI - FRUSTUM_EPSILON {
            return Self::full(origin);
        }

        Self { origin, bounds: Some(FrustumBounds { right, left }) }
    } // fn new

    /// Horizontal projection of 3D view frustum construction function
    /// * `position` - viewer position
    /// * `view_dir` - view direction, may be pitched
    /// * `hor_fov` - horizontal field of view, radians
    /// * `ver_fov` - vertical field of view, radians
    /// * Returns frustum covering horizontal projection of view volume
    pub fn from_view(position: Vec3, view_dir: Vec3, hor_fov: f32, ver_fov: f32) -> Self {
        let origin = xy(position);
        let horizontal = xy(view_dir);
        let horizontal_length = horizontal.length();

        if horizontal_length <= FRUSTUM_EPSILON || hor_fov >= PI - FRUSTUM_EPSILON || ver_fov >= PI - FRUSTUM_EPSILON {
            return Self::full(origin);
        }

        let pitch = view_dir.z.atan2(horizontal_length);

        // Forward component of the lowest (or highest) corner ray, right component is tan(hor_fov / 2)
        let forward = pitch.cos() - pitch.sin().abs() * (ver_fov * 0.5).tan();

        if forward <= FRUSTUM_EPSILON {
            return Self::full(origin);
        }

        let half_angle = ((hor_fov * 0.5).tan() / forward).atan();

        if half_angle >= FRAC_PI_2 - FRUSTUM_EPSILON {
            return Self::full(origin);
        }

        let direction = horizontal / horizontal_length;

        Self::new(
            origin,
            Vec2::from_angle(-half_angle).rotate(direction),
            Vec2::from_angle(half_angle).rotate(direction),
        )
    } // fn from_view

    pub fn is_full(&self) -> bool {
        self.bounds.is_none()
    }

    /// Angular span, TAU for full frustum
    pub fn span(&self) -> f32 {
        match self.bounds {
            Some(bounds) => ccw_angle(bounds.right, bounds.left),
            None => TAU,
        }
    } // fn span

    /// Direction containment check
    pub fn contains_direction(&self, direction: Vec2) -> bool {
        match self.bounds {
            Some(FrustumBounds { right, left }) => {
                let length = direction.length();
                cross(right, direction) >= -FRUSTUM_EPSILON * length
                    && cross(direction, left) >= -FRUSTUM_EPSILON * length
            }
            None => true,
        }
    } // fn contains_direction

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.contains_direction(point - self.origin)
    }

    /// Other frustum containment check. Frustums with different origins never contain each other.
    pub fn contains(&self, other: &Frustum) -> bool {
        if (self.origin - other.origin).length() > FRUSTUM_EPSILON {
            return false;
        }

        match (self.bounds, other.bounds) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(bounds)) => self.contains_direction(bounds.right) && self.contains_direction(bounds.left),
        }
    } // fn contains

    /// Segment by frustum clipping function
    /// * `a`, `b` - segment to clip
    /// * Returns visible part of segment, if any
    pub fn clip_segment(&self, a: Vec2, b: Vec2) -> Option<(Vec2, Vec2)> {
        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => return Some((a, b)),
        };

        let mut segment = (a, b);

        for (direction, sign) in [(bounds.right, 1.0f32), (bounds.left, -1.0f32)] {
            let fa = cross(direction, segment.0 - self.origin) * sign;
            let fb = cross(direction, segment.1 - self.origin) * sign;

            if fa < 0.0 && fb < 0.0 {
                return None;
            }
            if fa < 0.0 || fb < 0.0 {
                let point = segment.0 + (segment.1 - segment.0) * (fa / (fa - fb));

                if fa < 0.0 {
                    segment.0 = point;
                } else {
                    segment.1 = point;
                }
            }
        }

        if (segment.1 - segment.0).length() <= FRUSTUM_EPSILON {
            return None;
        }

        Some(segment)
    } // fn clip_segment

    /// Frustum through portal construction function
    /// * `a`, `b` - portal segment, `a` is seen on the right
    /// * Returns sub-frustum, that sees through the portal only
    pub fn through_segment(&self, a: Vec2, b: Vec2) -> Option<Frustum> {
        let (a, b) = self.clip_segment(a, b)?;
        let right = a - self.origin;
        let left = b - self.origin;

        if cross(right, left) <= 0.0 {
            return None;
        }

        let frustum = Frustum::new(self.origin, right, left);

        // Numerical widening must not escape parent
        match (self.bounds, frustum.bounds) {
            (Some(_), None) => Some(*self),
            _ => Some(frustum),
        }
    } // fn through_segment

    /// Frustum and convex polygon intersection function
    /// * `points` - counter-clockwise convex polygon
    /// * Returns sub-frustum bounding visible part of polygon, None if nothing is visible
    pub fn clip_polygon(&self, points: &[Vec2]) -> Option<Frustum> {
        if points.len() < 3 {
            return None;
        }

        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => return Some(*self),
        };

        let clipped = clip_polygon_half_plane(points, self.origin, bounds.right, 1.0);
        let clipped = clip_polygon_half_plane(&clipped, self.origin, bounds.left, -1.0);

        if clipped.len() < 3 {
            return None;
        }

        let mut min_angle = f32::MAX;
        let mut max_angle = f32::MIN;
        let mut in_front = false;

        for point in &clipped {
            let direction = *point - self.origin;

            if direction.length() <= FRUSTUM_EPSILON {
                // Origin on polygon boundary sees whole frustum
                return Some(*self);
            }

            in_front |= direction.dot(bounds.right + bounds.left) > 0.0;

            let angle = cross(bounds.right, direction).atan2(bounds.right.dot(direction));
            min_angle = min_angle.min(angle);
            max_angle = max_angle.max(angle);
        }

        if !in_front || max_angle - min_angle <= FRUSTUM_EPSILON {
            return None;
        }

        let min_angle = min_angle.max(0.0);
        let max_angle = max_angle.min(self.span());

        Some(Frustum::new(
            self.origin,
            Vec2::from_angle(min_angle).rotate(bounds.right),
            Vec2::from_angle(max_angle).rotate(bounds.right),
        ))
    } // fn clip_polygon

    /// Frustum in another coordinate frame
    pub fn transformed(&self, transform: &Affine2) -> Frustum {
        Frustum {
            origin: transform.transform_point2(self.origin),
            bounds: self.bounds.map(|FrustumBounds { right, left }| FrustumBounds {
                right: transform.transform_vector2(right).normalize_or_zero(),
                left: transform.transform_vector2(left).normalize_or_zero(),
            }),
        }
    } // fn transformed

    /// Smallest frustum containing both `self` and `other`.
    /// * Returns (union frustum, union span)
    fn union(&self, other: &Frustum) -> (Frustum, f32) {
        let (a, b) = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => (a, b),
            _ => return (Frustum::full(self.origin), TAU),
        };

        let la = self.span();
        let lb = other.span();

        // Arc starting at a.right, and arc starting at b.right
        let from_a = la.max(ccw_angle(a.right, b.right) + lb);
        let from_b = lb.max(ccw_angle(b.right, a.right) + la);

        let (right, span) = if from_a <= from_b {
            (a.right, from_a)
        } else {
            (b.right, from_b)
        };

        if span >= PI - FRUSTUM_EPSILON {
            return (Frustum::full(self.origin), TAU);
        }

        (Frustum::new(self.origin, right, Vec2::from_angle(span).rotate(right)), span)
    } // fn union

    /// Uncovered angle between frustums, zero for overlapping ones
    pub fn angular_gap(&self, other: &Frustum) -> f32 {
        let (a, b) = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => (a, b),
            _ => return 0.0,
        };

        if self.contains_direction(b.right) || other.contains_direction(a.right) {
            return 0.0;
        }

        ccw_angle(a.left, b.right).min(ccw_angle(b.left, a.right))
    } // fn angular_gap

    /// Bounding frustum of two frustums. Result contains both inputs.
    pub fn bounding(&self, other: &Frustum) -> Frustum {
        self.union(other).0
    } // fn bounding
} // impl Frustum

/// Bounded collection of frustums sharing one origin
#[derive(Clone, Debug, Default)]
pub struct FrustumBuffer {
    frustums: SmallVec<[Frustum; FRUSTUM_BUFFER_CAPACITY]>,
} // struct FrustumBuffer

impl FrustumBuffer {
    /// Maximal frustum count
    pub const CAPACITY: usize = FRUSTUM_BUFFER_CAPACITY;

    pub fn new() -> Self {
        Self { frustums: SmallVec::new() }
    }

    pub fn with_frustum(frustum: Frustum) -> Self {
        let mut buffer = Self::new();
        buffer.push(frustum);
        buffer
    }

    /// Frustum adding function. Overflowing buffer merges its two closest frustums into bounding one.
    /// * `frustum` - frustum to add
    /// * Returns false if frustum was already covered by buffer contents
    pub fn push(&mut self, frustum: Frustum) -> bool {
        if self.covers(&frustum) {
            return false;
        }

        self.frustums.retain(|existing| !frustum.contains(existing));
        self.frustums.push(frustum);

        while self.frustums.len() > Self::CAPACITY {
            self.merge_closest();
        }

        true
    } // fn push

    /// Two frustums with the smallest angular gap merging function
    fn merge_closest(&mut self) {
        let mut best: Option<(usize, usize, f32)> = None;

        for i in 0..self.frustums.len() {
            for j in i + 1..self.frustums.len() {
                let gap = self.frustums[i].angular_gap(&self.frustums[j]);

                if best.map_or(true, |(_, _, best_gap)| gap < best_gap) {
                    best = Some((i, j, gap));
                }
            }
        }

        if let Some((i, j, _)) = best {
            let removed = self.frustums.remove(j);
            let merged = self.frustums[i].bounding(&removed);

            self.frustums[i] = merged;
            // Merged frustum may swallow others
            let mut index = 0;
            self.frustums.retain(|existing| {
                let keep = index == i || !merged.contains(existing);
                index += 1;
                keep
            });
        }
    } // fn merge_closest

    /// Frustum coverage check
    pub fn covers(&self, frustum: &Frustum) -> bool {
        self.frustums.iter().any(|existing| existing.contains(frustum))
    }

    /// Buffer contents by another buffer extending function
    /// * Returns true if anything was added
    pub fn extend(&mut self, other: &FrustumBuffer) -> bool {
        let mut changed = false;
        for frustum in other.iter() {
            changed |= self.push(*frustum);
        }
        changed
    } // fn extend

    pub fn iter(&self) -> std::slice::Iter<'_, Frustum> {
        self.frustums.iter()
    }

    pub fn len(&self) -> usize {
        self.frustums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frustums.is_empty()
    }
} // impl FrustumBuffer

#[cfg(test)]
mod tests {
    use super::*;

    fn wedge(from_degrees: f32, to_degrees: f32) -> Frustum {
        Frustum::new(
            Vec2::ZERO,
            Vec2::from_angle(from_degrees.to_radians()),
            Vec2::from_angle(to_degrees.to_radians()),
        )
    }

    #[test]
    fn view_frustum_horizontal() {
        let frustum = Frustum::from_view(Vec3::new(1.0, 2.0, 0.5), Vec3::X, FRAC_PI_2, FRAC_PI_2);
        let bounds = frustum.bounds.unwrap();

        assert_eq!(frustum.origin, Vec2::new(1.0, 2.0));
        assert!((frustum.span() - FRAC_PI_2).abs() < 1e-4);
        assert!((bounds.right - Vec2::new(1.0, -1.0).normalize()).length() < 1e-4);
        assert!((bounds.left - Vec2::new(1.0, 1.0).normalize()).length() < 1e-4);
    }

    #[test]
    fn view_frustum_pitch_widens_and_saturates() {
        let level = Frustum::from_view(Vec3::ZERO, Vec3::X, 1.0, 1.0);
        let pitched = Frustum::from_view(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.5), 1.0, 1.0);

        assert!(pitched.span() > level.span());
        assert!(Frustum::from_view(Vec3::ZERO, Vec3::Z, 1.0, 1.0).is_full());
        assert!(Frustum::from_view(Vec3::ZERO, Vec3::new(1.0, 0.0, 10.0), 1.0, 1.5).is_full());
        assert!(Frustum::from_view(Vec3::ZERO, Vec3::X, PI, 1.0).is_full());
    }

    #[test]
    fn angular_gap_of_wide_overlap_is_zero() {
        let a = wedge(0.0, 100.0);
        let b = wedge(90.0, 190.0);

        assert_eq!(a.angular_gap(&b), 0.0);
        assert_eq!(b.angular_gap(&a), 0.0);
        assert!((b.angular_gap(&wedge(200.0, 210.0)) - 10f32.to_radians()).abs() < 1e-4);
        assert!((wedge(200.0, 210.0).angular_gap(&a) - 100f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn segment_clipping() {
        let frustum = wedge(-45.0, 45.0);

        // Wall x = 1, wider than the wedge
        let (a, b) = frustum.clip_segment(Vec2::new(1.0, -3.0), Vec2::new(1.0, 3.0)).unwrap();
        assert!((a - Vec2::new(1.0, -1.0)).length() < 1e-4);
        assert!((b - Vec2::new(1.0, 1.0)).length() < 1e-4);

        // Entirely outside
        assert!(frustum.clip_segment(Vec2::new(-1.0, 2.0), Vec2::new(1.0, 3.0)).is_none());
        // Behind viewer
        assert!(frustum.clip_segment(Vec2::new(-1.0, -0.1), Vec2::new(-1.0, 0.1)).is_none());
    }

    #[test]
    fn through_segment_narrows() {
        let frustum = wedge(-45.0, 45.0);
        let child = frustum.through_segment(Vec2::new(2.0, -0.5), Vec2::new(2.0, 0.5)).unwrap();

        assert!(frustum.contains(&child));
        assert!(child.span() < frustum.span());
        // Reversed segment is seen from behind
        assert!(frustum.through_segment(Vec2::new(2.0, 0.5), Vec2::new(2.0, -0.5)).is_none());
    }

    #[test]
    fn polygon_clipping() {
        let frustum = wedge(-45.0, 45.0);
        let square = [
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 1.0),
            Vec2::new(2.0, 1.0),
        ];
        let visible = frustum.clip_polygon(&square).unwrap();

        assert!(frustum.contains(&visible));
        assert!(visible.contains_point(Vec2::new(2.5, 0.5)));
        assert!(!visible.contains_point(Vec2::new(2.5, -0.5)));

        let behind = square.map(|p| -p);
        assert!(frustum.clip_polygon(&behind).is_none());

        // Origin inside polygon keeps frustum
        let around = [Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)];
        assert_eq!(frustum.clip_polygon(&around), Some(frustum));
    }

    #[test]
    fn bounding_contains_both() {
        let a = wedge(0.0, 10.0);
        let b = wedge(30.0, 40.0);
        let merged = a.bounding(&b);

        assert!(merged.contains(&a) && merged.contains(&b));
        assert!((merged.span() - 40f32.to_radians()).abs() < 1e-4);
        assert!((a.angular_gap(&b) - 20f32.to_radians()).abs() < 1e-4);

        // Wrap-around pair
        let c = wedge(350.0, 355.0);
        let merged = a.bounding(&c);
        assert!(merged.contains(&a) && merged.contains(&c));
        assert!((merged.span() - 20f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn buffer_merges_outward_on_overflow() {
        let mut buffer = FrustumBuffer::new();

        for (from, to) in [(0.0, 5.0), (20.0, 25.0), (40.0, 45.0), (60.0, 65.0)] {
            assert!(buffer.push(wedge(from, to)));
        }
        assert_eq!(buffer.len(), FrustumBuffer::CAPACITY);

        // 66..67 is closest to 60..65
        let extra = wedge(66.0, 67.0);
        assert!(buffer.push(extra));
        assert_eq!(buffer.len(), FrustumBuffer::CAPACITY);

        for input in [wedge(0.0, 5.0), wedge(20.0, 25.0), wedge(40.0, 45.0), wedge(60.0, 65.0), extra] {
            assert!(buffer.covers(&input));
        }
        assert!(buffer.iter().any(|f| (f.span() - 7f32.to_radians()).abs() < 1e-4));
    }

    #[test]
    fn buffer_skips_covered() {
        let mut buffer = FrustumBuffer::with_frustum(wedge(0.0, 50.0));

        assert!(!buffer.push(wedge(10.0, 20.0)));
        assert!(buffer.push(wedge(-10.0, 60.0)));
        assert_eq!(buffer.len(), 1);
    }
}

// file geom/frustum.rs
