/// WEIRD Project
/// `File` physics/movement.rs
/// `Description` Character and particle movement
/// `Author` TioT2
/// `Last changed` 16.10.2026

use smallvec::SmallVec;

use super::{CastShape, CollisionHit, PhysicsWorld, SurfaceHit};
use crate::entity::{CastFilter, SectorEntities};
use crate::map::SectorId;
use crate::math::*;

/// Slide iterations per move
const MAX_BUMPS: usize = 4;

/// Clip planes tracked during a single move
const MAX_CLIP_PLANES: usize = 5;

/// Velocity components below are zeroed after clipping
const STOP_EPSILON: f32 = 1e-3;

/// Clipped velocity leaves the plane a bit
const OVERBOUNCE: f32 = 1.01;

/// Distance kept between shape and surfaces it hit
const SKIN: f32 = 1e-3;

/// Maximal distance from floor to be standing on it
const GROUND_EPSILON: f32 = 1e-2;

/// Minimal normal Z of walkable surface
const MIN_FLOOR_NORMAL_Z: f32 = 0.7;

/// Character collision shape
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CharacterShape {
    pub radius: f32,
    pub height: f32,
    /// Maximal floor rise character walks onto
    pub step: f32,
} // struct CharacterShape

/// Moving character state
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CharacterState {
    pub sector: SectorId,
    /// Feet position, in `sector` frame
    pub position: Vec3,
    pub velocity: Vec3,
    /// Accumulated frame change of all moves, applied by caller to its own orientation
    pub transform_mod: Affine2,
} // struct CharacterState

impl CharacterState {
    pub fn new(sector: SectorId, position: Vec3) -> Self {
        Self {
            sector,
            position,
            velocity: Vec3::ZERO,
            transform_mod: Affine2::IDENTITY,
        }
    }
} // impl CharacterState

/// Character move result
#[derive(Clone, Debug, PartialEq)]
pub struct MoveResult {
    /// Character stands on floor after the move
    pub grounded: bool,
    /// Surfaces and entities touched, normals are in frame the move started in
    pub hits: SmallVec<[CollisionHit; 4]>,
    /// Frame change of this move
    pub transform: Affine2,
    pub sector_changed: bool,
} // struct MoveResult

/// Moving particle state
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParticleState {
    pub sector: SectorId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub transform_mod: Affine2,
} // struct ParticleState

impl ParticleState {
    pub fn new(sector: SectorId, position: Vec3, velocity: Vec3) -> Self {
        Self {
            sector,
            position,
            velocity,
            transform_mod: Affine2::IDENTITY,
        }
    }
} // impl ParticleState

/// Particle move result
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleResult {
    pub hits: SmallVec<[CollisionHit; 4]>,
    pub transform: Affine2,
    pub sector_changed: bool,
} // struct ParticleResult

/// Intermediate move state
#[derive(Clone, Debug)]
struct SlideState {
    sector: SectorId,
    position: Vec3,
    velocity: Vec3,
    /// Move start frame to current frame transform
    transform: Affine2,
    grounded: bool,
    hits: SmallVec<[CollisionHit; 4]>,
    /// Entered sectors, in order
    sectors: SmallVec<[SectorId; 4]>,
} // struct SlideState

impl SlideState {
    /// Horizontal distance from `start`, measured in the move start frame
    fn travelled(&self, start: &SlideState) -> f32 {
        let position = transform_point3(&self.transform.inverse(), self.position);

        xy(position).distance(xy(start.position))
    } // fn travelled

    /// Position, velocity and frame update after cast into other sector frame
    fn apply_frame(&mut self, transform: &Affine2, sector: Option<SectorId>) {
        self.position = transform_point3(transform, self.position);
        self.velocity = transform_vector3(transform, self.velocity);
        self.transform = *transform * self.transform;

        if let Some(sector) = sector.filter(|sector| *sector != self.sector) {
            self.sectors.push(sector);
            self.sector = sector;
        }
    } // fn apply_frame
} // impl SlideState

/// Velocity along plane clipping function
/// * `velocity` - velocity to clip
/// * `normal` - plane normal
/// * `overbounce` - normal part scale
/// * Returns clipped velocity
fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal) * overbounce;
    let mut out = velocity - normal * backoff;

    for i in 0..3 {
        if out[i].abs() < STOP_EPSILON {
            out[i] = 0.0;
        }
    }

    out
} // fn clip_velocity

/// Hit position of cast
/// * `start`, `delta` - cast
/// * `hit` - cast hit
/// * Returns position shape is moved to
fn contact_position(start: Vec3, delta: Vec3, hit: &CollisionHit) -> Vec3 {
    if !hit.is_hit() {
        return start + delta;
    }

    let normal = hit.normal();
    let t = hit.t().min(1.0);

    if t < 0.0 {
        // Penetration depth along normal
        start + normal * ((t * delta.dot(normal)).max(0.0) + SKIN)
    } else {
        start + delta * t + normal * SKIN
    }
} // fn contact_position

impl<'a, E: SectorEntities> PhysicsWorld<'a, E> {
    /// Slide along hit surfaces move
    fn slide_move(&self, state: &mut SlideState, shape: &CharacterShape, dt: f32, filter: &CastFilter) {
        let cylinder = CastShape::cylinder(shape.radius, shape.height);
        let mut primal_velocity = state.velocity;
        let mut planes = SmallVec::<[Vec3; MAX_CLIP_PLANES]>::new();
        let mut time_left = dt;

        for _ in 0..MAX_BUMPS {
            if state.velocity == Vec3::ZERO || time_left <= 0.0 {
                break;
            }

            let delta = state.velocity * time_left;
            let outcome = self.cast(Some(state.sector), state.position, state.position + delta, cylinder, filter, None);
            let hit = outcome.hit;
            let fraction = if hit.is_hit() { hit.t().clamp(0.0, 1.0) } else { 1.0 };

            let to_move_start = state.transform.inverse();
            state.position = contact_position(state.position, delta, &hit);
            state.apply_frame(&outcome.transform, outcome.sector);
            primal_velocity = transform_vector3(&outcome.transform, primal_velocity);
            for plane in planes.iter_mut() {
                *plane = transform_vector3(&outcome.transform, *plane);
            }

            if !hit.is_hit() {
                break;
            }

            let normal = transform_vector3(&outcome.transform, hit.normal());
            if normal.z >= MIN_FLOOR_NORMAL_Z {
                state.grounded = true;
            }
            let hit = hit.with_normal(|normal| transform_vector3(&to_move_start, normal));
            if !state.hits.contains(&hit) {
                state.hits.push(hit);
            }

            time_left -= time_left * fraction;

            if fraction > 0.0 {
                planes.clear();
            }

            if planes.len() >= MAX_CLIP_PLANES {
                state.velocity = Vec3::ZERO;
                break;
            }
            planes.push(normal);

            // Velocity that does not go into any of planes
            let clipped = (0..planes.len())
                .map(|i| (i, clip_velocity(state.velocity, planes[i], OVERBOUNCE)))
                .find(|(i, velocity)| planes
                    .iter()
                    .enumerate()
                    .all(|(j, plane)| j == *i || velocity.dot(*plane) >= 0.0)
                );

            match clipped {
                Some((_, velocity)) => state.velocity = velocity,
                None => {
                    if planes.len() != 2 {
                        state.velocity = Vec3::ZERO;
                        break;
                    }

                    // Slide along the crease
                    let direction = planes[0].cross(planes[1]);
                    state.velocity = direction * direction.dot(state.velocity);
                }
            }

            // Turned back, stop to avoid corner oscillations
            if state.velocity.dot(primal_velocity) <= 0.0 {
                state.velocity = Vec3::ZERO;
                break;
            }
        }
    } // fn slide_move

    /// Slide move that also tries to step up onto higher floor
    fn step_slide_move(&self, start: &SlideState, shape: &CharacterShape, dt: f32, filter: &CastFilter) -> SlideState {
        let mut down = start.clone();
        self.slide_move(&mut down, shape, dt, filter);

        let blocked = down.hits.iter().any(|hit| hit.normal().z.abs() < MIN_FLOOR_NORMAL_Z);
        if shape.step <= 0.0 || !blocked {
            return down;
        }

        let cylinder = CastShape::cylinder(shape.radius, shape.height);
        let mut up = start.clone();

        // Raise
        let raise = self.cast(Some(up.sector), up.position, up.position + Vec3::Z * shape.step, cylinder, filter, None);
        let lift = shape.step * raise.hit.t().clamp(0.0, 1.0) - if raise.hit.is_hit() { SKIN } else { 0.0 };
        if lift <= GROUND_EPSILON {
            return down;
        }
        up.position.z += lift;

        self.slide_move(&mut up, shape, dt, filter);

        // Lower back
        let drop = self.cast(Some(up.sector), up.position, up.position - Vec3::Z * lift, cylinder, filter, None);
        up.position.z -= lift * drop.hit.t().clamp(0.0, 1.0);
        if drop.hit.normal().z >= MIN_FLOOR_NORMAL_Z {
            up.grounded = true;
        }

        if up.travelled(start) <= down.travelled(start) + GROUND_EPSILON {
            return down;
        }

        log::trace!("Stepped up in {} to {}", up.sector, up.position.z);

        up.velocity.z = down.velocity.z;
        up
    } // fn step_slide_move

    /// Character movement function. Character slides along walls, steps onto low floors and
    /// keeps its position in frame of the sector it ends in.
    /// * `state` - character state, updated
    /// * `shape` - character shape
    /// * `dt` - time step
    /// * `filter` - entity filter
    /// * `on_sector_change` - called with (old, new) for each sector entered
    /// * Returns move result
    pub fn move_character(
        &self,
        state: &mut CharacterState,
        shape: &CharacterShape,
        dt: f32,
        filter: &CastFilter,
        mut on_sector_change: impl FnMut(SectorId, SectorId),
    ) -> MoveResult {
        let start = SlideState {
            sector: state.sector,
            position: state.position,
            velocity: state.velocity,
            transform: Affine2::IDENTITY,
            grounded: false,
            hits: SmallVec::new(),
            sectors: SmallVec::new(),
        };

        let mut result = self.step_slide_move(&start, shape, dt, filter);

        let sector = self.map.sector(result.sector);

        if result.position.z + shape.height > sector.ceiling {
            result.position.z = (sector.ceiling - shape.height).max(sector.floor);
            result.velocity.z = result.velocity.z.min(0.0);
        }

        if result.position.z <= sector.floor + GROUND_EPSILON && result.velocity.z <= 0.0 {
            result.position.z = sector.floor;
            result.velocity.z = 0.0;
            result.grounded = true;
        }

        let mut previous = state.sector;
        for sector in result.sectors.iter().copied() {
            on_sector_change(previous, sector);
            previous = sector;
        }

        state.sector = result.sector;
        state.position = result.position;
        state.velocity = result.velocity;
        state.transform_mod = result.transform * state.transform_mod;

        MoveResult {
            grounded: result.grounded,
            hits: result.hits,
            transform: result.transform,
            sector_changed: !result.sectors.is_empty(),
        }
    } // fn move_character

    /// Particle movement function. Particle is a point-sized sphere that bounces off everything it hits.
    /// * `state` - particle state, updated
    /// * `radius` - particle radius
    /// * `bounce` - restitution, 0 slides, 1 reflects perfectly
    /// * `dt` - time step
    /// * `filter` - entity filter
    /// * Returns move result
    pub fn move_particle(&self, state: &mut ParticleState, radius: f32, bounce: f32, dt: f32, filter: &CastFilter) -> ParticleResult {
        let shape = CastShape::cylinder(radius, 0.0);
        let mut slide = SlideState {
            sector: state.sector,
            position: state.position,
            velocity: state.velocity,
            transform: Affine2::IDENTITY,
            grounded: false,
            hits: SmallVec::new(),
            sectors: SmallVec::new(),
        };
        let mut time_left = dt;

        for _ in 0..MAX_BUMPS {
            if slide.velocity == Vec3::ZERO || time_left <= 0.0 {
                break;
            }

            let delta = slide.velocity * time_left;
            let outcome = self.cast(Some(slide.sector), slide.position, slide.position + delta, shape, filter, None);
            let hit = outcome.hit;

            let to_move_start = slide.transform.inverse();
            slide.position = contact_position(slide.position, delta, &hit);
            slide.apply_frame(&outcome.transform, outcome.sector);

            if !hit.is_hit() {
                break;
            }

            slide.hits.push(hit.with_normal(|normal| transform_vector3(&to_move_start, normal)));

            let normal = transform_vector3(&outcome.transform, hit.normal());
            let into = slide.velocity.dot(normal);
            if into < 0.0 {
                slide.velocity -= normal * (1.0 + bounce) * into;
            }

            time_left *= 1.0 - hit.t().clamp(0.0, 1.0);
        }

        // Resting on floor
        let sector = self.map.sector(slide.sector);
        if slide.position.z < sector.floor {
            slide.position.z = sector.floor;
        }

        state.sector = slide.sector;
        state.position = slide.position;
        state.velocity = slide.velocity;
        state.transform_mod = slide.transform * state.transform_mod;

        ParticleResult {
            hits: slide.hits,
            transform: slide.transform,
            sector_changed: !slide.sectors.is_empty(),
        }
    } // fn move_particle
} // impl PhysicsWorld


// file physics/movement.rs
