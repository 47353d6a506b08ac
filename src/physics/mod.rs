/// WEIRD Project
/// `File` physics/mod.rs
/// `Description` Ray and shape casting through portals
/// `Author` TioT2
/// `Last changed` 16.10.2026

mod movement;

pub use movement::*;

use crate::entity::{CastFilter, EntityCollider, EntityId, SectorEntities};
use crate::geom::{circle_segment_sweep, ray_circle};
use crate::map::{MapSectors, Portal, Sector, SectorId, WallId};
use crate::math::*;

/// Tolerance of height and parameter comparisons
const CAST_EPSILON: f32 = 1e-4;

/// Maximal count of sectors single cast may visit
const MAX_CAST_STEPS: usize = 1024;

/// Sector surface kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceHit {
    Wall(WallId),
    Floor,
    Ceiling,
} // enum SurfaceHit

/// Cast result
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CollisionHit {
    None,
    Sector {
        sector: SectorId,
        surface: SurfaceHit,
        /// Hit is a non-euclidean portal the shape does not fit into
        non_euclidean: bool,
        /// Fraction of cast segment, negative if shape already penetrates the surface
        t: f32,
        /// Surface normal, in the cast's starting frame
        normal: Vec3,
    },
    Entity {
        entity: EntityId,
        sector: SectorId,
        t: f32,
        normal: Vec3,
    },
} // enum CollisionHit

impl CollisionHit {
    pub fn no_hit() -> Self {
        Self::None
    }

    pub fn is_hit(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Hit fraction, 1 for no hit
    pub fn t(&self) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Sector { t, .. } | Self::Entity { t, .. } => *t,
        }
    }

    /// Hit normal, zero for no hit
    pub fn normal(&self) -> Vec3 {
        match self {
            Self::None => Vec3::ZERO,
            Self::Sector { normal, .. } | Self::Entity { normal, .. } => *normal,
        }
    }

    pub fn sector(&self) -> Option<SectorId> {
        match self {
            Self::None => None,
            Self::Sector { sector, .. } | Self::Entity { sector, .. } => Some(*sector),
        }
    }

    /// Copy with normal mapped by transform
    fn with_normal(self, map: impl FnOnce(Vec3) -> Vec3) -> Self {
        match self {
            Self::None => Self::None,
            Self::Sector { sector, surface, non_euclidean, t, normal } => {
                Self::Sector { sector, surface, non_euclidean, t, normal: map(normal) }
            }
            Self::Entity { entity, sector, t, normal } => Self::Entity { entity, sector, t, normal: map(normal) },
        }
    } // fn with_normal
} // impl CollisionHit

/// Portal crossed by a cast
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PortalCrossing {
    pub from: SectorId,
    pub wall: WallId,
    pub to: SectorId,
    /// Fraction of cast segment at crossing
    pub t: f32,
    /// Cast start frame to destination sector frame transform
    pub transform: Affine2,
} // struct PortalCrossing

/// Optional cast details
#[derive(Clone, Debug, Default)]
pub struct CastTrace {
    /// Crossed portals, in crossing order
    pub portals: Vec<PortalCrossing>,
    /// Report-only entities touched before the cast stopped
    pub reports: Vec<CollisionHit>,
} // struct CastTrace

impl CastTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.portals.clear();
        self.reports.clear();
    }

    pub fn crossed_non_euclidean(&self) -> bool {
        self.portals.iter().any(|crossing| !affine2_approx_eq(&crossing.transform, &Affine2::IDENTITY, CAST_EPSILON))
    }
} // impl CastTrace

/// Swept shape
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct CastShape {
    pub radius: f32,
    /// Vertical extent above cast point, 3D casts only
    pub height: f32,
    /// Heights (floors, ceilings, portal openings) are considered
    pub vertical: bool,
} // struct CastShape

impl CastShape {
    pub fn flat(radius: f32) -> Self {
        Self { radius, height: 0.0, vertical: false }
    }

    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self { radius, height, vertical: true }
    }
} // impl CastShape

/// Complete cast result
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct CastOutcome {
    /// Hit, normal is in starting frame
    pub hit: CollisionHit,
    /// Sector of hit or of cast end, None if cast started outside of map
    pub sector: Option<SectorId>,
    /// Start frame to `sector` frame transform
    pub transform: Affine2,
} // struct CastOutcome

/// Closest event within one sector
enum SectorEvent {
    Hit(CollisionHit),
    Cross(WallId, Portal),
} // enum SectorEvent

/// Map with entities, physics queries target
#[derive(Copy, Clone)]
pub struct PhysicsWorld<'a, E: SectorEntities> {
    pub map: &'a MapSectors,
    pub entities: &'a E,
} // struct PhysicsWorld

/// Moving shape versus entity cylinder test
/// * Returns (t, normal) of first contact
fn entity_sweep(start: Vec3, delta: Vec3, shape: CastShape, collider: &EntityCollider) -> Option<(f32, Vec3)> {
    let center = xy(collider.position);
    let radius = shape.radius + collider.radius;
    let bottom = collider.position.z;
    let top = collider.position.z + collider.height;

    let overlaps_vertically = |t: f32| {
        let z = start.z + delta.z * t;
        !shape.vertical || (z <= top && z + shape.height >= bottom)
    };

    let mut best: Option<(f32, Vec3)> = None;

    if let Some((t0, t1)) = ray_circle(xy(start), xy(delta), center, radius) {
        if t1 >= 0.0 && t0 <= 1.0 && overlaps_vertically(t0.max(0.0)) {
            let normal = (xy(start) + xy(delta) * t0 - center).normalize_or_zero().extend(0.0);
            best = Some((t0, normal));
        }
    }

    if shape.vertical && delta.z != 0.0 {
        let (t, normal) = if delta.z < 0.0 {
            ((top - start.z) / delta.z, Vec3::Z)
        } else {
            ((bottom - start.z - shape.height) / delta.z, -Vec3::Z)
        };

        let inside = (xy(start) + xy(delta) * t - center).length() <= radius;
        if (0.0..=1.0).contains(&t) && inside && best.map_or(true, |(best_t, _)| t < best_t) {
            best = Some((t, normal));
        }
    }

    best
} // fn entity_sweep

impl<'a, E: SectorEntities> PhysicsWorld<'a, E> {
    pub fn new(map: &'a MapSectors, entities: &'a E) -> Self {
        Self { map, entities }
    }

    /// Shape fits into portal opening check
    fn fits_opening(shape: CastShape, z: f32, from: &Sector, to: &Sector) -> bool {
        if !shape.vertical {
            return true;
        }

        let bottom = from.floor.max(to.floor);
        let top = from.ceiling.min(to.ceiling);

        z >= bottom - CAST_EPSILON && z + shape.height <= top + CAST_EPSILON
    } // fn fits_opening

    /// Closest event of single sector finding function
    /// * `start`, `delta` - whole cast, in sector frame
    /// * `t_enter` - fraction cast entered sector at
    /// * `entered_through` - wall cast entered sector through
    fn sector_event(
        &self,
        sector_id: SectorId,
        start: Vec3,
        delta: Vec3,
        shape: CastShape,
        t_enter: f32,
        entered_through: Option<WallId>,
        filter: &CastFilter,
        reports: &mut Vec<CollisionHit>,
    ) -> Option<(f32, SectorEvent)> {
        let sector = self.map.sector(sector_id);
        let start2 = xy(start);
        let delta2 = xy(delta);
        let delta_length = delta2.length();

        // Walls touched before the center crossed into the sector still count
        let slack = if entered_through.is_some() && delta_length > 0.0 {
            shape.radius / delta_length + CAST_EPSILON
        } else {
            f32::INFINITY
        };
        let accepts = |t: f32| t >= t_enter - slack && t <= 1.0;

        let vertical_only = shape.vertical && delta_length <= EPSILON && delta.z != 0.0;

        let mut best: Option<(f32, SectorEvent)> = None;
        let consider = |t: f32, event: SectorEvent, best: &mut Option<(f32, SectorEvent)>| {
            let t = if entered_through.is_some() { t.max(t_enter) } else { t };
            if best.as_ref().map_or(true, |(best_t, _)| t < *best_t) {
                *best = Some((t, event));
            }
        };

        for wall_id in sector.wall_ids() {
            if Some(wall_id) == entered_through {
                continue;
            }

            let wall = self.map.wall(wall_id);
            // Purely vertical moves slide past walls the shape already touches
            let sweep = if vertical_only {
                None
            } else {
                circle_segment_sweep(start2, delta2, shape.radius, wall.start, wall.end)
            };

            let wall_hit = |t: f32, normal: Vec2, non_euclidean: bool| {
                SectorEvent::Hit(CollisionHit::Sector {
                    sector: sector_id,
                    surface: SurfaceHit::Wall(wall_id),
                    non_euclidean,
                    t,
                    normal: normal.extend(0.0),
                })
            };

            match wall.portal {
                None => {
                    if let Some(sweep) = sweep.filter(|sweep| accepts(sweep.t)) {
                        consider(sweep.t, wall_hit(sweep.t, sweep.normal, false), &mut best);
                    }
                }
                Some(portal) => {
                    // Center ray crossing
                    let approach = delta2.dot(wall.normal);
                    let crossing = if approach < 0.0 {
                        let t = wall.distance(start2) / -approach;
                        let point = start2 + delta2 * t;
                        let edge = wall.end - wall.start;
                        let s = (point - wall.start).dot(edge) / edge.length_squared();

                        Some(t).filter(|t| *t >= t_enter - CAST_EPSILON && *t <= 1.0 && (0.0..=1.0).contains(&s))
                    } else {
                        None
                    };

                    let contact = sweep.map(|sweep| sweep.t).or(crossing);
                    let Some(contact) = contact else {
                        continue;
                    };

                    let z = start.z + delta.z * contact.max(t_enter);
                    if Self::fits_opening(shape, z, sector, self.map.sector(portal.sector)) {
                        if let Some(t) = crossing {
                            consider(t, SectorEvent::Cross(wall_id, portal), &mut best);
                        }
                    } else if accepts(contact) {
                        let normal = sweep.map_or(wall.normal, |sweep| sweep.normal);
                        consider(contact, wall_hit(contact, normal, portal.is_non_euclidean()), &mut best);
                    }
                }
            }
        }

        if shape.vertical && delta.z != 0.0 {
            let (t, surface, normal) = if delta.z < 0.0 {
                ((sector.floor - start.z) / delta.z, SurfaceHit::Floor, Vec3::Z)
            } else {
                ((sector.ceiling - start.z - shape.height) / delta.z, SurfaceHit::Ceiling, -Vec3::Z)
            };

            if t >= t_enter - CAST_EPSILON && t <= 1.0 {
                consider(t, SectorEvent::Hit(CollisionHit::Sector {
                    sector: sector_id,
                    surface,
                    non_euclidean: false,
                    t,
                    normal,
                }), &mut best);
            }
        }

        for collider in self.entities.entities_in(sector_id) {
            if !filter.accepts(collider) {
                continue;
            }

            let Some((t, normal)) = entity_sweep(start, delta, shape, collider).filter(|(t, _)| accepts(*t)) else {
                continue;
            };

            let hit = CollisionHit::Entity { entity: collider.id, sector: sector_id, t, normal };

            if filter.colliders.intersects(collider.kind) {
                consider(t, SectorEvent::Hit(hit), &mut best);
            } else if !reports.iter().any(|report| matches!(report, CollisionHit::Entity { entity, .. } if *entity == collider.id)) {
                reports.push(hit);
            }
        }

        best
    } // fn sector_event

    /// General cast function
    /// * `sector` - start sector, located by point if None
    /// * `start`, `end` - cast segment
    /// * `shape` - swept shape
    /// * Returns hit, final sector and frame
    pub(crate) fn cast(
        &self,
        sector: Option<SectorId>,
        start: Vec3,
        end: Vec3,
        shape: CastShape,
        filter: &CastFilter,
        mut trace: Option<&mut CastTrace>,
    ) -> CastOutcome {
        let Some(mut current) = sector.or_else(|| self.map.get_sector_from_point(xy(start))) else {
            return CastOutcome { hit: CollisionHit::no_hit(), sector: None, transform: Affine2::IDENTITY };
        };

        let delta = end - start;
        let mut transform = Affine2::IDENTITY;
        let mut t_enter = 0.0;
        let mut entered_through = None;
        let mut reports = Vec::new();

        for _ in 0..MAX_CAST_STEPS {
            let local_start = transform_point3(&transform, start);
            let local_delta = transform_vector3(&transform, delta);

            let reported = reports.len();
            let event = self.sector_event(current, local_start, local_delta, shape, t_enter, entered_through, filter, &mut reports);

            // Reports go to the starting frame, like hits
            if reports.len() > reported {
                let inverse = transform.inverse();
                for report in &mut reports[reported..] {
                    *report = report.with_normal(|normal| transform_vector3(&inverse, normal));
                }
            }

            match event {
                None => {
                    return self.finish(CollisionHit::no_hit(), current, transform, reports, trace);
                }
                Some((_, SectorEvent::Hit(hit))) => {
                    let inverse = transform.inverse();
                    let hit = hit.with_normal(|normal| transform_vector3(&inverse, normal));

                    return self.finish(hit, current, transform, reports, trace);
                }
                Some((t, SectorEvent::Cross(wall, portal))) => {
                    transform = portal.transform() * transform;

                    if let Some(trace) = trace.as_deref_mut() {
                        trace.portals.push(PortalCrossing { from: current, wall, to: portal.sector, t, transform });
                    }

                    current = portal.sector;
                    entered_through = Some(portal.wall);
                    t_enter = t;
                }
            }
        }

        log::warn!("Cast from {start} to {end} crossed more than {MAX_CAST_STEPS} portals, stopped");

        CastOutcome { hit: CollisionHit::no_hit(), sector: Some(current), transform }
    } // fn cast

    /// Cast result assembling function
    fn finish(
        &self,
        hit: CollisionHit,
        sector: SectorId,
        transform: Affine2,
        reports: Vec<CollisionHit>,
        trace: Option<&mut CastTrace>,
    ) -> CastOutcome {
        if let Some(trace) = trace {
            trace.reports.extend(reports.into_iter().filter(|report| report.t() <= hit.t()));
        }

        CastOutcome { hit, sector: Some(sector), transform }
    } // fn finish

    /// 2D ray cast
    /// * `sector` - start sector, located by point if None
    /// * `start`, `end` - ray segment
    /// * `filter` - entity filter
    /// * `trace` - crossed portals and report-only hits output
    /// * Returns first hit
    pub fn ray_cast_2d(&self, sector: Option<SectorId>, start: Vec2, end: Vec2, filter: &CastFilter, trace: Option<&mut CastTrace>) -> CollisionHit {
        self.cast(sector, start.extend(0.0), end.extend(0.0), CastShape::flat(0.0), filter, trace).hit
    }

    /// 3D ray cast, floors, ceilings and portal openings are considered
    pub fn ray_cast_3d(&self, sector: Option<SectorId>, start: Vec3, end: Vec3, filter: &CastFilter, trace: Option<&mut CastTrace>) -> CollisionHit {
        self.cast(sector, start, end, CastShape::cylinder(0.0, 0.0), filter, trace).hit
    }

    /// 2D moving circle cast
    pub fn circle_cast_2d(
        &self,
        sector: Option<SectorId>,
        start: Vec2,
        end: Vec2,
        radius: f32,
        filter: &CastFilter,
        trace: Option<&mut CastTrace>,
    ) -> CollisionHit {
        self.cast(sector, start.extend(0.0), end.extend(0.0), CastShape::flat(radius), filter, trace).hit
    }

    /// Moving vertical cylinder cast
    /// * `start`, `end` - cylinder bottom center movement
    /// * `radius`, `height` - cylinder size
    pub fn cylinder_cast_3d(
        &self,
        sector: Option<SectorId>,
        start: Vec3,
        end: Vec3,
        radius: f32,
        height: f32,
        filter: &CastFilter,
        trace: Option<&mut CastTrace>,
    ) -> CollisionHit {
        self.cast(sector, start, end, CastShape::cylinder(radius, height), filter, trace).hit
    }
} // impl PhysicsWorld

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityMask, NoEntities, SectorEntityMap};
    use crate::map::WallRelId;
    use crate::test_maps;

    const NONE: NoEntities = NoEntities;

    #[test]
    fn ray_hits_far_wall_through_portal() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);
        let mut trace = CastTrace::new();

        let hit = world.ray_cast_2d(None, Vec2::new(1.0, 2.0), Vec2::new(11.0, 2.0), &CastFilter::world(), Some(&mut trace));

        // Wall x = 8
        assert!((hit.t() - 0.7).abs() < 1e-4);
        assert!((hit.normal() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
        assert!(matches!(hit, CollisionHit::Sector { surface: SurfaceHit::Wall(_), non_euclidean: false, .. }));
        assert_eq!(hit.sector(), Some(SectorId::new(1)));

        assert_eq!(trace.portals.len(), 1);
        assert!((trace.portals[0].t - 0.3).abs() < 1e-4);
        assert!(!trace.crossed_non_euclidean());
    }

    #[test]
    fn ray_inside_sector_has_no_hit() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);

        let hit = world.ray_cast_2d(None, Vec2::new(1.0, 1.0), Vec2::new(6.0, 3.0), &CastFilter::world(), None);
        assert_eq!(hit, CollisionHit::no_hit());
        assert!(!hit.is_hit());
    }

    #[test]
    fn cast_from_outside_has_no_hit() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);

        assert_eq!(
            world.ray_cast_2d(None, Vec2::new(-5.0, 2.0), Vec2::new(5.0, 2.0), &CastFilter::world(), None),
            CollisionHit::no_hit(),
        );
    }

    #[test]
    fn circle_stops_radius_before_wall() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);

        let hit = world.circle_cast_2d(None, Vec2::new(6.0, 2.0), Vec2::new(10.0, 2.0), 0.5, &CastFilter::world(), None);
        assert!((hit.t() - 1.5 / 4.0).abs() < 1e-4);

        // North wall
        let hit = world.circle_cast_2d(None, Vec2::new(2.0, 2.0), Vec2::new(2.0, 10.0), 0.5, &CastFilter::world(), None);
        assert!((hit.t() - 1.5 / 8.0).abs() < 1e-4);
    }

    #[test]
    fn circle_hits_jamb_corner_moving_along_doorway() {
        let map = test_maps::doorway();
        let world = PhysicsWorld::new(&map, &NONE);
        let jamb = Vec2::new(4.0, 2.0);
        let jamb_wall = SurfaceHit::Wall(map.wall_id(SectorId::new(0), WallRelId(2)));

        // Moving away from the jamb wall line
        let hit = world.circle_cast_2d(None, Vec2::new(3.9, 1.0), Vec2::new(3.7, 3.0), 0.5, &CastFilter::world(), None);
        assert!(matches!(hit, CollisionHit::Sector { surface, .. } if surface == jamb_wall));
        assert!(hit.t() > 0.0 && hit.t() < 0.3);
        assert!(hit.normal().x < 0.0 && hit.normal().y < 0.0);

        // Parallel to the jamb wall line
        let start = Vec2::new(3.9, 1.0);
        let delta = Vec2::new(0.0, 2.0);
        let hit = world.circle_cast_2d(None, start, start + delta, 0.5, &CastFilter::world(), None);
        assert!(matches!(hit, CollisionHit::Sector { surface, .. } if surface == jamb_wall));
        assert!(((start + delta * hit.t() - jamb).length() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn character_slides_around_jamb_corner() {
        let map = test_maps::doorway();
        let world = PhysicsWorld::new(&map, &NONE);
        let shape = CharacterShape { radius: 0.5, height: 1.0, step: 0.0 };
        let mut state = CharacterState::new(SectorId::new(0), Vec3::new(3.9, 1.0, 0.0));
        state.velocity = Vec3::new(0.0, 2.0, 0.0);

        let result = world.move_character(&mut state, &shape, 1.0, &CastFilter::world(), |_, _| {});

        assert!(!result.hits.is_empty());
        assert_eq!(state.sector, SectorId::new(0));
        assert!(state.position.y < 2.0);
        assert!((xy(state.position) - Vec2::new(4.0, 2.0)).length() >= 0.5 - 1e-3);
    }

    #[test]
    fn recast_from_hit_point_is_stable() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);
        let end = Vec2::new(11.0, 2.0);

        let first = world.ray_cast_2d(None, Vec2::new(1.0, 2.0), end, &CastFilter::world(), None);
        let point = Vec2::new(1.0, 2.0).lerp(end, first.t());
        assert!((point - Vec2::new(8.0, 2.0)).length() < 1e-4);

        // Same wall, no progress past it
        let again = world.ray_cast_2d(first.sector(), point, end, &CastFilter::world(), None);
        let surface = |hit: &CollisionHit| match hit {
            CollisionHit::Sector { surface, .. } => Some(*surface),
            _ => None,
        };
        assert_eq!(surface(&again), surface(&first));
        assert!(again.t().abs() < 1e-4);

        // Leaving the wall is free
        let back = world.ray_cast_2d(first.sector(), point, Vec2::new(1.0, 2.0), &CastFilter::world(), None);
        assert!(!back.is_hit());
    }

    #[test]
    fn resting_circle_reports_overlap() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);

        let at = Vec2::new(0.25, 2.0);
        let hit = world.circle_cast_2d(None, at, at, 0.5, &CastFilter::world(), None);
        assert!(hit.is_hit());
        assert_eq!(hit.t(), 0.0);
        assert!((hit.normal() - Vec3::X).length() < 1e-4);

        let free = Vec2::new(2.0, 2.0);
        assert!(!world.circle_cast_2d(None, free, free, 0.5, &CastFilter::world(), None).is_hit());
    }

    #[test]
    fn penetrating_circle_has_negative_t() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);

        let hit = world.circle_cast_2d(None, Vec2::new(0.25, 2.0), Vec2::new(-1.0, 2.0), 0.5, &CastFilter::world(), None);
        assert!(hit.t() < 0.0);
        assert!((hit.normal() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn floor_and_ceiling_hits() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);

        let hit = world.ray_cast_3d(None, Vec3::new(2.0, 2.0, 2.0), Vec3::new(6.0, 2.0, -1.0), &CastFilter::world(), None);
        assert!(matches!(hit, CollisionHit::Sector { surface: SurfaceHit::Floor, .. }));
        assert!((hit.t() - 2.0 / 3.0).abs() < 1e-4);
        assert_eq!(hit.sector(), Some(SectorId::new(1)));
        assert_eq!(hit.normal(), Vec3::Z);

        let hit = world.cylinder_cast_3d(None, Vec3::new(2.0, 2.0, 1.0), Vec3::new(2.0, 2.0, 3.0), 0.3, 1.0, &CastFilter::world(), None);
        assert!(matches!(hit, CollisionHit::Sector { surface: SurfaceHit::Ceiling, .. }));
        assert!((hit.t() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn high_step_blocks_like_wall() {
        let map = test_maps::corridor();
        let world = PhysicsWorld::new(&map, &NONE);

        // Floor 0.5 to floor 2: the portal at x = 12 is closed below z = 2
        let hit = world.ray_cast_3d(None, Vec3::new(9.0, 2.0, 1.0), Vec3::new(15.0, 2.0, 1.0), &CastFilter::world(), None);
        match hit {
            CollisionHit::Sector { sector, surface: SurfaceHit::Wall(wall), non_euclidean, t, .. } => {
                assert_eq!(sector, SectorId::new(2));
                assert_eq!(map.wall(wall).portal.map(|portal| portal.sector), Some(SectorId::new(3)));
                assert!(!non_euclidean);
                assert!((t - 0.5).abs() < 1e-4);
            }
            other => panic!("unexpected hit {other:?}"),
        }

        // Flat cast ignores heights
        let hit = world.ray_cast_2d(None, Vec2::new(9.0, 2.0), Vec2::new(15.0, 2.0), &CastFilter::world(), None);
        assert!(!hit.is_hit());
    }

    #[test]
    fn cast_through_non_euclidean_portal() {
        let map = test_maps::nc_pair();
        let world = PhysicsWorld::new(&map, &NONE);
        let mut trace = CastTrace::new();

        // East out of the first room is north in the second, its north wall is 4 units after the portal
        let hit = world.ray_cast_2d(None, Vec2::new(2.0, 2.0), Vec2::new(12.0, 2.0), &CastFilter::world(), Some(&mut trace));

        assert_eq!(hit.sector(), Some(SectorId::new(1)));
        assert!((hit.t() - 0.6).abs() < 1e-4);
        // Normal in the starting frame faces back west
        assert!((hit.normal() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);

        assert_eq!(trace.portals.len(), 1);
        assert!(trace.crossed_non_euclidean());
        let crossing = trace.portals[0];
        assert_eq!((crossing.from, crossing.to), (SectorId::new(0), SectorId::new(1)));
        assert!((crossing.transform.transform_point2(Vec2::new(4.0, 2.0)) - Vec2::new(22.0, 20.0)).length() < 1e-4);
    }

    #[test]
    fn one_way_portal_is_one_way_for_casts() {
        let map = test_maps::one_way();
        let world = PhysicsWorld::new(&map, &NONE);

        let forward = world.ray_cast_2d(None, Vec2::new(2.0, 2.0), Vec2::new(5.0, 2.0), &CastFilter::world(), None);
        assert!(!forward.is_hit());

        let backward = world.ray_cast_2d(None, Vec2::new(22.0, 22.0), Vec2::new(22.0, 18.0), &CastFilter::world(), None);
        match backward {
            CollisionHit::Sector { sector, surface: SurfaceHit::Wall(wall), t, .. } => {
                assert_eq!(sector, SectorId::new(1));
                assert!(map.wall(wall).portal.is_none());
                assert!((t - 0.5).abs() < 1e-4);
            }
            other => panic!("unexpected hit {other:?}"),
        }
    }

    #[test]
    fn non_euclidean_portal_too_low_is_flagged() {
        let mut builder = crate::map::MapBuilder::new();
        builder.add_sector(&test_maps::square(0.0, 0.0, 4.0), 0.0, 3.0);
        builder.add_sector(&test_maps::square(20.0, 20.0, 4.0), 2.0, 5.0);
        builder.link_portal_two_way(0, 1, 1, 0);
        let map = builder.build().unwrap();
        let world = PhysicsWorld::new(&map, &NONE);

        let hit = world.ray_cast_3d(None, Vec3::new(2.0, 2.0, 1.0), Vec3::new(6.0, 2.0, 1.0), &CastFilter::world(), None);
        assert!(matches!(hit, CollisionHit::Sector { non_euclidean: true, .. }));
        assert!((hit.t() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn entities_stop_or_report() {
        let map = test_maps::two_rooms();
        let mut entities = SectorEntityMap::new();
        entities.insert(SectorId::new(1), EntityCollider {
            id: EntityId(1),
            kind: EntityMask::ACTOR,
            position: Vec3::new(6.0, 2.0, 0.0),
            radius: 0.5,
            height: 2.0,
        });
        entities.insert(SectorId::new(0), EntityCollider {
            id: EntityId(2),
            kind: EntityMask::TRIGGER,
            position: Vec3::new(3.0, 2.0, 0.0),
            radius: 0.5,
            height: 2.0,
        });
        let world = PhysicsWorld::new(&map, &entities);

        let filter = CastFilter { colliders: EntityMask::ACTOR, report_only: EntityMask::TRIGGER, ignore: None };
        let mut trace = CastTrace::new();
        let hit = world.ray_cast_2d(None, Vec2::new(1.0, 2.0), Vec2::new(11.0, 2.0), &filter, Some(&mut trace));

        match hit {
            CollisionHit::Entity { entity, sector, t, normal } => {
                assert_eq!(entity, EntityId(1));
                assert_eq!(sector, SectorId::new(1));
                assert!((t - 0.45).abs() < 1e-4);
                assert!((normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
            }
            other => panic!("unexpected hit {other:?}"),
        }
        assert_eq!(trace.reports.len(), 1);
        assert!(matches!(trace.reports[0], CollisionHit::Entity { entity: EntityId(2), .. }));

        // Ignored collider, mask without actors
        assert!(!world.ray_cast_2d(None, Vec2::new(1.0, 2.0), Vec2::new(7.0, 2.0), &filter.ignoring(EntityId(1)), None).is_hit());
        assert!(!world.ray_cast_2d(None, Vec2::new(1.0, 2.0), Vec2::new(7.0, 2.0), &CastFilter::world(), None).is_hit());

        // Ray above the entity
        let over = world.ray_cast_3d(None, Vec3::new(1.0, 2.0, 2.5), Vec3::new(7.5, 2.0, 2.5), &filter, None);
        assert!(!over.is_hit());
    }

    #[test]
    fn portal_cycle_cast_is_bounded() {
        let map = test_maps::nc_loop();
        let world = PhysicsWorld::new(&map, &NONE);
        let mut trace = CastTrace::new();

        // 10 rooms long, there is no wall in the way
        let hit = world.ray_cast_2d(None, Vec2::new(2.0, 2.0), Vec2::new(42.0, 2.0), &CastFilter::world(), Some(&mut trace));

        assert!(!hit.is_hit());
        assert_eq!(trace.portals.len(), 10);
        assert_eq!(trace.portals.last().map(|crossing| crossing.to), Some(SectorId::new(0)));
    }

    #[test]
    fn explicit_start_sector() {
        let map = test_maps::two_rooms();
        let world = PhysicsWorld::new(&map, &NONE);
        let wall = map.wall_id(SectorId::new(0), WallRelId(0));

        let hit = world.ray_cast_2d(Some(SectorId::new(0)), Vec2::new(2.0, 2.0), Vec2::new(2.0, -2.0), &CastFilter::world(), None);
        assert!(matches!(hit, CollisionHit::Sector { surface: SurfaceHit::Wall(id), .. } if id == wall));
    }
}

// file physics/mod.rs
