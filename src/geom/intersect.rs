/// WEIRD Project
/// `File` geom/intersect.rs
/// `Description` Segment, circle and convex polygon intersection module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use crate::math::*;

/// Segment-segment intersection result.
/// Parallel segments are reported by flag, `t` and `u` are zero then.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentIntersection {
    /// Segments do intersect (both parameters in [0; 1])
    pub intersects: bool,
    /// Segments are parallel (or one of them is degenerate)
    pub parallel: bool,
    /// Parameter along the first segment
    pub t: f32,
    /// Parameter along the second segment
    pub u: f32,
} // struct SegmentIntersection

impl SegmentIntersection {
    const PARALLEL: SegmentIntersection = SegmentIntersection {
        intersects: false,
        parallel: true,
        t: 0.0,
        u: 0.0,
    };
}

/// Segment intersection function
/// * `p0`, `p1` - first segment
/// * `q0`, `q1` - second segment
/// * Returns intersection description
pub fn segment_intersection(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> SegmentIntersection {
    let d = p1 - p0;
    let e = q1 - q0;
    let denom = cross(d, e);

    if denom.abs() <= EPSILON * d.length() * e.length() || denom == 0.0 {
        return SegmentIntersection::PARALLEL;
    }

    let w = q0 - p0;
    let t = cross(w, e) / denom;
    let u = cross(w, d) / denom;

    SegmentIntersection {
        intersects: (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u),
        parallel: false,
        t,
        u,
    }
} // fn segment_intersection

/// Ray-circle intersection function
/// * `origin` - ray origin
/// * `direction` - ray direction (not normalized, t is measured in its lengths)
/// * `center` - circle center
/// * `radius` - circle radius
/// * Returns both roots in ascending order, if any
pub fn ray_circle(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<(f32, f32)> {
    let a = direction.length_squared();

    if a <= EPSILON * EPSILON {
        return None;
    }

    let oc = origin - center;
    let b = direction.dot(oc);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - a * c;

    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();

    Some(((-b - root) / a, (-b + root) / a))
} // fn ray_circle

/// Moving circle versus wall contact
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepHit {
    /// Movement fraction of first contact. Negative if circle already penetrates wall.
    pub t: f32,
    /// Contact normal, pointing from the wall to the circle
    pub normal: Vec2,
} // struct SweepHit

/// Inward (left) unit normal of directed wall
#[inline]
pub fn wall_normal(a: Vec2, b: Vec2) -> Vec2 {
    (b - a).perp().normalize_or_zero()
} // fn wall_normal

/// Motionless circle versus wall overlap
/// * Returns zero fraction contact if circle center is in front of wall and circle touches it
fn resting_overlap(center: Vec2, radius: f32, a: Vec2, b: Vec2, normal: Vec2, distance: f32) -> Option<SweepHit> {
    if radius <= 0.0 || distance < 0.0 {
        return None;
    }

    let edge = b - a;
    let s = ((center - a).dot(edge) / edge.length_squared().max(EPSILON)).clamp(0.0, 1.0);
    let offset = center - (a + edge * s);

    if offset.length() >= radius {
        return None;
    }

    let normal = if s > 0.0 && s < 1.0 { normal } else { offset.try_normalize().unwrap_or(normal) };

    Some(SweepHit { t: 0.0, normal })
} // fn resting_overlap

/// Moving circle versus one-sided wall sweep. The wall's front side is on the left of `a` -> `b`.
/// * `start` - circle center at movement start
/// * `delta` - whole movement
/// * `radius` - circle radius, 0 for ray
/// * `a`, `b` - wall segment
/// * Returns first contact, if any happens up to the movement end. Motionless circle reports its overlap at zero fraction.
pub fn circle_segment_sweep(start: Vec2, delta: Vec2, radius: f32, a: Vec2, b: Vec2) -> Option<SweepHit> {
    let normal = wall_normal(a, b);
    let distance = (start - a).dot(normal);
    let approach = delta.dot(normal);
    let edge = b - a;

    if delta.length_squared() <= EPSILON * EPSILON {
        return resting_overlap(start, radius, a, b, normal, distance);
    }

    let mut best: Option<SweepHit> = None;

    // Face, from the front side only
    if distance >= -EPSILON && approach < 0.0 {
        let t = (distance - radius) / -approach;
        if t <= 1.0 {
            let center = start + delta * t;
            let s = (center - a).dot(edge) / edge.length_squared();

            if (0.0..=1.0).contains(&s) {
                best = Some(SweepHit { t, normal });
            }
        }
    }

    if radius > 0.0 {
        for corner in [a, b] {
            // Approaching corner only
            if delta.dot(start - corner) >= 0.0 {
                continue;
            }

            let Some((t0, t1)) = ray_circle(start, delta, corner, radius) else {
                continue;
            };
            if t0 > 1.0 || t1 < 0.0 {
                continue;
            }

            let contact_normal = (start + delta * t0 - corner).normalize_or_zero();

            // Grazing contact
            if contact_normal.dot(delta) >= 0.0 {
                continue;
            }

            if best.map_or(true, |hit| t0 < hit.t) {
                best = Some(SweepHit { t: t0, normal: contact_normal });
            }
        }
    }

    best
} // fn circle_segment_sweep

/// Point in convex counter-clockwise polygon check. Boundary points are inside.
/// * `points` - polygon
/// * `point` - point to check
/// * Returns true if all of edge cross products share positive sign
pub fn point_in_convex(points: &[Vec2], point: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }

    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .all(|(a, b)| orient(*a, *b, point) >= -EPSILON * (*b - *a).length())
} // fn point_in_convex

/// Twice the signed polygon area. Positive for counter-clockwise polygons.
pub fn polygon_area2(points: &[Vec2]) -> f32 {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| cross(*a, *b))
        .sum()
} // fn polygon_area2

/// Convex polygon overlap check (separating axis test).
/// Polygons sharing only an edge or a vertex do not overlap.
/// * `a`, `b` - counter-clockwise convex polygons
/// * `tolerance` - penetration depth that is still considered touching
/// * Returns some point of the overlap region if polygons do overlap
pub fn convex_overlap(a: &[Vec2], b: &[Vec2], tolerance: f32) -> Option<Vec2> {
    if a.len() < 3 || b.len() < 3 {
        return None;
    }

    let separated_by = |edges: &[Vec2], others: &[Vec2]| -> bool {
        edges
            .iter()
            .zip(edges.iter().cycle().skip(1))
            .any(|(p0, p1)| {
                let normal = wall_normal(*p0, *p1);
                others.iter().all(|q| (*q - *p0).dot(normal) <= tolerance)
            })
    };

    if separated_by(a, b) || separated_by(b, a) {
        return None;
    }

    // Witness: proper edge crossing, then contained vertex, then centroid
    for (a0, a1) in a.iter().zip(a.iter().cycle().skip(1)) {
        for (b0, b1) in b.iter().zip(b.iter().cycle().skip(1)) {
            let hit = segment_intersection(*a0, *a1, *b0, *b1);
            let inner = 1e-4..=1.0 - 1e-4;

            if hit.intersects && inner.contains(&hit.t) && inner.contains(&hit.u) {
                return Some(*a0 + (*a1 - *a0) * hit.t);
            }
        }
    }

    let strictly_inside = |polygon: &[Vec2], point: Vec2| {
        polygon
            .iter()
            .zip(polygon.iter().cycle().skip(1))
            .all(|(p0, p1)| (point - *p0).dot(wall_normal(*p0, *p1)) > tolerance)
    };

    a.iter()
        .find(|p| strictly_inside(b, **p))
        .or_else(|| b.iter().find(|p| strictly_inside(a, **p)))
        .copied()
        .or_else(|| Some(a.iter().copied().sum::<Vec2>() / a.len() as f32))
} // fn convex_overlap

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ]
    }

    #[test]
    fn crossing_segments() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
        );

        assert!(hit.intersects);
        assert!(!hit.parallel);
        assert!((hit.t - 0.5).abs() < 1e-6);
        assert!((hit.u - 0.5).abs() < 1e-6);
    }

    #[test]
    fn parallel_segments_are_flagged() {
        let hit = segment_intersection(Vec2::ZERO, Vec2::X, Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0));

        assert!(hit.parallel);
        assert!(!hit.intersects);
        assert!(hit.t.is_finite() && hit.u.is_finite());

        let degenerate = segment_intersection(Vec2::ZERO, Vec2::ZERO, Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0));
        assert!(degenerate.parallel);
    }

    #[test]
    fn missing_segments() {
        let hit = segment_intersection(Vec2::ZERO, Vec2::X, Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0));

        assert!(!hit.intersects);
        assert!(!hit.parallel);
        assert!((hit.t - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ray_circle_roots() {
        let (t0, t1) = ray_circle(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.0), 1.0).unwrap();

        assert!((t0 - 0.4).abs() < 1e-5);
        assert!((t1 - 0.6).abs() < 1e-5);
        assert!(ray_circle(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 3.0), 1.0).is_none());
        assert!(ray_circle(Vec2::ZERO, Vec2::ZERO, Vec2::ZERO, 1.0).is_none());
    }

    #[test]
    fn circle_sweep_stops_at_radius() {
        // Wall x = 4, a -> b goes up so the front side is -x
        let a = Vec2::new(4.0, -2.0);
        let b = Vec2::new(4.0, 2.0);
        let hit = circle_segment_sweep(Vec2::ZERO, Vec2::new(8.0, 0.0), 1.0, a, b).unwrap();

        assert!((hit.t - 3.0 / 8.0).abs() < 1e-5);
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn circle_sweep_ignores_walls_behind_and_receding() {
        let a = Vec2::new(4.0, -2.0);
        let b = Vec2::new(4.0, 2.0);

        assert!(circle_segment_sweep(Vec2::ZERO, Vec2::new(-8.0, 0.0), 1.0, a, b).is_none());
        assert!(circle_segment_sweep(Vec2::new(5.0, 0.0), Vec2::new(8.0, 0.0), 1.0, a, b).is_none());
    }

    #[test]
    fn circle_sweep_penetration_is_negative() {
        let a = Vec2::new(4.0, -2.0);
        let b = Vec2::new(4.0, 2.0);
        let hit = circle_segment_sweep(Vec2::new(3.5, 0.0), Vec2::new(1.0, 0.0), 1.0, a, b).unwrap();

        assert!(hit.t < 0.0);
        assert!((hit.t + 0.5).abs() < 1e-5);
    }

    #[test]
    fn circle_sweep_hits_corner() {
        let a = Vec2::new(4.0, 0.0);
        let b = Vec2::new(4.0, 2.0);
        // Passes below the wall start, touches corner a
        let hit = circle_segment_sweep(Vec2::new(0.0, -0.5), Vec2::new(8.0, 0.0), 1.0, a, b).unwrap();
        let center = Vec2::new(0.0, -0.5) + Vec2::new(8.0, 0.0) * hit.t;

        assert!(((center - a).length() - 1.0).abs() < 1e-4);
        assert!(hit.normal.x < 0.0 && hit.normal.y < 0.0);
    }

    #[test]
    fn circle_sweep_hits_corner_moving_parallel() {
        let a = Vec2::new(4.0, 2.0);
        let b = Vec2::new(4.0, 4.0);
        let hit = circle_segment_sweep(Vec2::new(3.9, 1.0), Vec2::new(0.0, 2.0), 0.5, a, b).unwrap();

        assert!((hit.t - (2.0 - 0.96f32.sqrt()) / 4.0).abs() < 1e-4);
        assert!(hit.normal.y < 0.0);

        // Passing by, never closer than radius
        assert!(circle_segment_sweep(Vec2::new(3.0, 1.0), Vec2::new(0.0, 2.0), 0.5, a, b).is_none());
    }

    #[test]
    fn motionless_circle_overlap() {
        let a = Vec2::new(4.0, -2.0);
        let b = Vec2::new(4.0, 2.0);

        let hit = circle_segment_sweep(Vec2::new(3.5, 0.0), Vec2::ZERO, 1.0, a, b).unwrap();
        assert_eq!(hit.t, 0.0);
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < 1e-5);

        assert!(circle_segment_sweep(Vec2::new(2.0, 0.0), Vec2::ZERO, 1.0, a, b).is_none());
        assert!(circle_segment_sweep(Vec2::new(3.5, 0.0), Vec2::ZERO, 0.0, a, b).is_none());
    }

    #[test]
    fn convex_point_location() {
        let s = square(0.0, 0.0, 2.0);

        assert!(point_in_convex(&s, Vec2::new(1.0, 1.0)));
        assert!(point_in_convex(&s, Vec2::new(2.0, 1.0)));
        assert!(!point_in_convex(&s, Vec2::new(2.1, 1.0)));
        assert!(polygon_area2(&s) > 0.0);
    }

    #[test]
    fn convex_overlap_cases() {
        let a = square(0.0, 0.0, 2.0);

        // Shared edge
        assert!(convex_overlap(&a, &square(2.0, 0.0, 2.0), 1e-4).is_none());
        // Apart
        assert!(convex_overlap(&a, &square(3.0, 3.0, 1.0), 1e-4).is_none());

        // Crossing
        let witness = convex_overlap(&a, &square(1.0, 1.0, 2.0), 1e-4).unwrap();
        assert!(point_in_convex(&a, witness));

        // Containment
        let inner = square(0.5, 0.5, 0.5);
        let witness = convex_overlap(&a, &inner, 1e-4).unwrap();
        assert!(point_in_convex(&inner, witness));
    }
}

// file geom/intersect.rs
