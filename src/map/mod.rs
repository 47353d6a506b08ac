/// WEIRD Project
/// `File` map/mod.rs
/// `Description` Map sectors storage implementation module
/// `Author` TioT2
/// `Last changed` 16.10.2026

pub mod builder;
pub mod portal;
pub mod wmt;

pub use builder::*;
pub use portal::*;
pub use wmt::*;

use crate::geom::{convex_overlap, point_in_convex, Aabb};
use crate::grid::SpatialGrid;
use crate::math::*;

/// Sector identifier, dense index into sector array
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct SectorId(u16);

impl SectorId {
    pub fn new(index: u16) -> Self {
        Self(index)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
} // impl SectorId

impl std::fmt::Display for SectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Sector({})", self.0))
    }
}

/// Absolute wall identifier
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct WallId(u32);

impl WallId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
} // impl WallId

impl std::fmt::Display for WallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Wall({})", self.0))
    }
}

/// Wall identifier relative to its sector's first wall
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct WallRelId(pub u16);

/// Portal kind
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PortalKind {
    /// Both sides share geometry, no coordinate change
    Classical,
    /// Arbitrary rigid transform between sides
    NonEuclidean {
        /// Source sector frame to destination sector frame transform
        to_destination: Affine2,
        /// Destination wall links back to this one
        two_way: bool,
    },
} // enum PortalKind

/// Portal wall link
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Portal {
    /// Destination sector
    pub sector: SectorId,
    /// Destination (twin) wall
    pub wall: WallId,
    pub kind: PortalKind,
} // struct Portal

impl Portal {
    /// Source to destination frame transform, identity for classical portals
    pub fn transform(&self) -> Affine2 {
        match self.kind {
            PortalKind::Classical => Affine2::IDENTITY,
            PortalKind::NonEuclidean { to_destination, .. } => to_destination,
        }
    }

    pub fn is_non_euclidean(&self) -> bool {
        matches!(self.kind, PortalKind::NonEuclidean { .. })
    }
} // impl Portal

/// Sector edge representation structure
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Wall {
    /// Edge start
    pub start: Vec2,
    /// Edge end, start of the next wall
    pub end: Vec2,
    /// Unit normal, pointing into the owning sector
    pub normal: Vec2,
    /// Owning sector
    pub sector: SectorId,
    /// Portal, if wall is passable
    pub portal: Option<Portal>,
} // struct Wall

impl Wall {
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    /// Signed distance from wall line, positive inside owning sector
    pub fn distance(&self, point: Vec2) -> f32 {
        (point - self.start).dot(self.normal)
    }

    /// Closest point of wall segment
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let edge = self.end - self.start;
        let t = ((point - self.start).dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
        self.start + edge * t
    } // fn closest_point
} // impl Wall

impl std::fmt::Display for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.portal {
            None => f.write_fmt(format_args!("Wall {} -> {}", self.start, self.end)),
            Some(portal) => f.write_fmt(format_args!(
                "Portal {} -> {} to {}{}",
                self.start,
                self.end,
                portal.sector,
                if portal.is_non_euclidean() { " (non-euclidean)" } else { "" },
            )),
        }
    }
} // impl std::fmt::Display for Wall

/// Sector representation structure
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sector {
    /// First wall
    pub first_wall: WallId,
    /// Wall after the last one
    pub last_wall: WallId,
    /// Height of sector floor
    pub floor: f32,
    /// Height of sector ceiling
    pub ceiling: f32,
    /// Footprint bounds
    pub aabb: Aabb,
} // struct Sector

impl Sector {
    pub fn wall_count(&self) -> usize {
        (self.last_wall.0 - self.first_wall.0) as usize
    }

    pub fn wall_ids(&self) -> impl DoubleEndedIterator<Item = WallId> + ExactSizeIterator {
        (self.first_wall.0..self.last_wall.0).map(WallId)
    }

    pub fn owns_wall(&self, wall: WallId) -> bool {
        (self.first_wall.0..self.last_wall.0).contains(&wall.0)
    }

    pub fn height(&self) -> f32 {
        self.ceiling - self.floor
    }
} // impl Sector

/// `#[repr(C)]` sector layout for renderer upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackedSector {
    pub first_wall: u32,
    pub last_wall: u32,
    pub floor: f32,
    pub ceiling: f32,
} // struct PackedSector

/// `#[repr(C)]` wall layout for renderer upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackedWall {
    pub start: [f32; 2],
    /// Destination sector, `u32::MAX` for solid walls
    pub portal_sector: u32,
    /// Twin wall, `u32::MAX` for solid walls
    pub portal_wall: u32,
} // struct PackedWall

/// Built map: packed sector and wall arrays plus portal data.
/// Immutable for its whole lifetime.
#[derive(Clone, Debug)]
pub struct MapSectors {
    sectors: Vec<Sector>,
    walls: Vec<Wall>,
    /// Wall start points, `points[i] == walls[i].start`. Sector loops are contiguous slices.
    points: Vec<Vec2>,
    portal_render_data: Vec<Option<PortalRenderData>>,
    grid: SpatialGrid,
    non_euclidean_portal_count: usize,
} // struct MapSectors

impl MapSectors {
    /// Map from packed arrays construction function
    pub(crate) fn from_parts(sectors: Vec<Sector>, walls: Vec<Wall>, grid: SpatialGrid) -> Self {
        let points = walls.iter().map(|wall| wall.start).collect();
        let non_euclidean_portal_count = walls
            .iter()
            .filter(|wall| wall.portal.map_or(false, |portal| portal.is_non_euclidean()))
            .count();

        let mut map = Self {
            sectors,
            walls,
            points,
            portal_render_data: Vec::new(),
            grid,
            non_euclidean_portal_count,
        };

        map.portal_render_data = (0..map.walls.len())
            .map(|index| PortalRenderData::compute(&map, WallId(index as u32)))
            .collect();

        map
    } // fn from_parts

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Sector getting function. Invalid identifiers are programmer errors.
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.index()]
    }

    pub fn try_sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id.index())
    }

    /// Wall getting function. Invalid identifiers are programmer errors.
    pub fn wall(&self, id: WallId) -> &Wall {
        &self.walls[id.index()]
    }

    pub fn try_wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(id.index())
    }

    /// Walls of sector
    pub fn sector_walls(&self, id: SectorId) -> &[Wall] {
        let sector = self.sector(id);
        &self.walls[sector.first_wall.index()..sector.last_wall.index()]
    }

    /// Sector point loop, counter-clockwise
    pub fn sector_points(&self, id: SectorId) -> &[Vec2] {
        let sector = self.sector(id);
        &self.points[sector.first_wall.index()..sector.last_wall.index()]
    }

    /// Absolute wall identifier by sector-relative one
    pub fn wall_id(&self, sector: SectorId, rel: WallRelId) -> WallId {
        let sector = self.sector(sector);
        assert!((rel.0 as usize) < sector.wall_count(), "wall {} is out of sector bounds", rel.0);
        WallId(sector.first_wall.0 + rel.0 as u32)
    } // fn wall_id

    /// Sector-relative wall identifier by absolute one
    pub fn wall_rel_id(&self, wall: WallId) -> WallRelId {
        let sector = self.sector(self.wall(wall).sector);
        WallRelId((wall.0 - sector.first_wall.0) as u16)
    }

    /// Portals leading out of sector
    pub fn sector_portals(&self, id: SectorId) -> impl Iterator<Item = (WallId, &Wall, Portal)> + '_ {
        let sector = self.sector(id);
        sector
            .wall_ids()
            .map(|wall_id| (wall_id, self.wall(wall_id)))
            .filter_map(|(wall_id, wall)| wall.portal.map(|portal| (wall_id, wall, portal)))
    } // fn sector_portals

    /// Portal transform (source to destination frame)
    pub fn portal_transform(&self, wall: WallId) -> Option<Affine2> {
        self.wall(wall).portal.map(|portal| portal.transform())
    }

    pub fn portal_render_data(&self, wall: WallId) -> Option<&PortalRenderData> {
        self.portal_render_data.get(wall.index()).and_then(Option::as_ref)
    }

    pub fn has_non_euclidean_portals(&self) -> bool {
        self.non_euclidean_portal_count != 0
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Iterator through indexed sectors getting function
    /// * Returns DoubleEndedIterator with SectorId and &Sector items
    pub fn iter_indexed_sectors(&self) -> impl DoubleEndedIterator<Item = (SectorId, &Sector)> {
        self.sectors
            .iter()
            .enumerate()
            .map(|(index, sector)| (SectorId(index as u16), sector))
    } // fn iter_indexed_sectors

    /// Check for point being located in sector
    pub fn sector_contains(&self, id: SectorId, point: Vec2) -> bool {
        let sector = self.sector(id);
        sector.aabb.contains(point) && point_in_convex(self.sector_points(id), point)
    } // fn sector_contains

    /// Sector by point finding function.
    /// * `point` - point to locate
    /// * Returns any of sectors containing point
    pub fn get_sector_from_point(&self, point: Vec2) -> Option<SectorId> {
        self.grid
            .query_point(point)
            .find(|id| point_in_convex(self.sector_points(*id), point))
    } // fn get_sector_from_point

    /// Sector by point finding function that checks old sector and its neighbours first.
    /// Resolves overlapping sectors of non-euclidean maps in favour of the ones reachable from `old_sector`.
    pub fn find_sector_from_old(&self, point: Vec2, old_sector: SectorId) -> Option<SectorId> {
        if self.try_sector(old_sector).is_none() {
            return self.get_sector_from_point(point);
        }

        if self.sector_contains(old_sector, point) {
            return Some(old_sector);
        }

        self.sector_portals(old_sector)
            .filter(|(_, _, portal)| !portal.is_non_euclidean())
            .map(|(_, _, portal)| portal.sector)
            .find(|id| self.sector_contains(*id, point))
            .or_else(|| self.get_sector_from_point(point))
    } // fn find_sector_from_old

    /// Sector array in renderer layout
    pub fn packed_sectors(&self) -> Vec<PackedSector> {
        self.sectors
            .iter()
            .map(|sector| PackedSector {
                first_wall: sector.first_wall.0,
                last_wall: sector.last_wall.0,
                floor: sector.floor,
                ceiling: sector.ceiling,
            })
            .collect()
    } // fn packed_sectors

    /// Wall array in renderer layout
    pub fn packed_walls(&self) -> Vec<PackedWall> {
        self.walls
            .iter()
            .map(|wall| PackedWall {
                start: wall.start.to_array(),
                portal_sector: wall.portal.map_or(u32::MAX, |portal| portal.sector.0 as u32),
                portal_wall: wall.portal.map_or(u32::MAX, |portal| portal.wall.0),
            })
            .collect()
    } // fn packed_walls

    /// Built map invariant checking function.
    /// Checks convexity and winding of every sector, sector overlaps and consistency of every portal pair.
    pub fn audit(&self) -> Result<(), BuildError> {
        self.audit_with(BuildFlags::empty())
    } // fn audit

    /// Built map invariant checking function, checks omitted by `flags` are skipped like in the builder
    pub fn audit_with(&self, flags: BuildFlags) -> Result<(), BuildError> {
        for (sector_id, sector) in self.iter_indexed_sectors() {
            if sector.wall_count() != 0 {
                if flags.contains(BuildFlags::OMIT_CONVEXITY_CLOCKWISE_CHECK) {
                    builder::check_edges(sector_id.index(), self.sector_points(sector_id))?;
                } else {
                    builder::check_convexity(sector_id.index(), self.sector_points(sector_id))?;
                }
            }

            for (wall_id, wall, portal) in self.sector_portals(sector_id) {
                let inconsistent = || BuildError::InconsistentPortal {
                    sector: sector_id.index(),
                    wall: self.wall_rel_id(wall_id).0 as usize,
                };

                let twin = self.try_wall(portal.wall).ok_or_else(inconsistent)?;
                if twin.sector != portal.sector {
                    return Err(inconsistent());
                }

                match portal.kind {
                    PortalKind::Classical => {
                        let back = twin.portal.ok_or_else(inconsistent)?;
                        let tolerance = 1e-3 * (1.0 + wall.length());

                        if back.wall != wall_id
                            || back.is_non_euclidean()
                            || (twin.start - wall.end).length() > tolerance
                            || (twin.end - wall.start).length() > tolerance
                        {
                            return Err(inconsistent());
                        }
                    }
                    PortalKind::NonEuclidean { to_destination, two_way } => {
                        let tolerance = 1e-3 * (1.0 + wall.length());
                        if (to_destination.transform_point2(wall.start) - twin.end).length() > tolerance
                            || (to_destination.transform_point2(wall.end) - twin.start).length() > tolerance
                        {
                            return Err(inconsistent());
                        }

                        let back = twin.portal.filter(|back| back.wall == wall_id);
                        match (two_way, back) {
                            (true, Some(back)) => {
                                let round_trip = back.transform() * to_destination;
                                if !affine2_approx_eq(&round_trip, &Affine2::IDENTITY, 1e-3) {
                                    return Err(inconsistent());
                                }
                            }
                            (false, None) => {}
                            _ => return Err(inconsistent()),
                        }
                    }
                }
            }
        }

        if !flags.contains(BuildFlags::OMIT_SECTOR_OVERLAP_CHECK) {
            let tolerance = BuildConfig::default().overlap_tolerance;

            for (sector_id, sector) in self.iter_indexed_sectors().filter(|(_, sector)| sector.wall_count() != 0) {
                for other in self.grid.query_aabb(&sector.aabb) {
                    if other <= sector_id || self.sector(other).wall_count() == 0 {
                        continue;
                    }

                    if let Some(point) = convex_overlap(self.sector_points(sector_id), self.sector_points(other), tolerance) {
                        return Err(BuildError::SectorOverlap { first: sector_id.index(), second: other.index(), point });
                    }
                }
            }
        }

        Ok(())
    } // fn audit_with
} // impl MapSectors


// file map/mod.rs
