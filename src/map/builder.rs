/// WEIRD Project
/// `File` map/builder.rs
/// `Description` Map from sector definitions building module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use super::{portal, MapSectors, Portal, PortalKind, Sector, SectorId, Wall, WallId};
use crate::geom::{convex_overlap, polygon_area2, wall_normal, Aabb};
use crate::grid::SpatialGrid;
use crate::math::*;
use crate::util::unordered_pair::UnorderedPair;

bitflags::bitflags! {
    /// Map building flags
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BuildFlags: u32 {
        /// Do not check sectors for convexity and counter-clockwise winding
        const OMIT_CONVEXITY_CLOCKWISE_CHECK = 1 << 0;
        /// Do not check sector pairs for overlapping
        const OMIT_SECTOR_OVERLAP_CHECK = 1 << 1;
        /// Panic on build failure (after logging it)
        const ASSERT_ON_FAIL = 1 << 2;
    }
}

/// Numeric tolerances of map building
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BuildConfig {
    /// Points closer than this are considered the same point
    pub weld_epsilon: f32,
    /// Sector penetration depth that is still considered touching
    pub overlap_tolerance: f32,
    /// Relative wall length difference allowed for non-euclidean portals
    pub length_tolerance: f32,
    /// Spatial grid cell size, mean sector extent if None
    pub grid_cell_size: Option<f32>,
} // struct BuildConfig

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-4,
            overlap_tolerance: 1e-3,
            length_tolerance: 1e-3,
            grid_cell_size: None,
        }
    }
} // impl Default for BuildConfig

/// Authored non-euclidean portal target
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NcPortalBuildData {
    /// Destination sector index
    pub sector: u32,
    /// Point index of destination wall start
    pub point: u32,
} // struct NcPortalBuildData

/// Single wall build entry
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WallBuildData {
    /// Wall start point index
    pub point: u32,
    pub nc_portal: Option<NcPortalBuildData>,
} // struct WallBuildData

impl WallBuildData {
    pub fn new(point: u32) -> Self {
        Self { point, nc_portal: None }
    }
}

/// Single sector build entry
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectorBuildData {
    /// Counter-clockwise wall loop
    pub walls: Vec<WallBuildData>,
    pub floor: f32,
    pub ceiling: f32,
} // struct SectorBuildData

/// Complete map builder input
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapBuildInput {
    /// Shared point pool
    pub points: Vec<Vec2>,
    pub sectors: Vec<SectorBuildData>,
    /// Point index pairs that never become classical portals
    pub solid_edges: Vec<(u32, u32)>,
} // struct MapBuildInput

/// Map building error
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    TooManySectors {
        count: usize,
    },
    TooManyWalls {
        sector: usize,
        count: usize,
    },
    InvalidPointIndex {
        sector: usize,
        wall: usize,
        point: u32,
    },
    /// Sector with 1 or 2 walls, zero area or zero-length walls
    DegenerateSector {
        sector: usize,
    },
    InvalidSectorBounds {
        sector: usize,
        floor: f32,
        ceiling: f32,
    },
    NonConvexSector {
        sector: usize,
        wall: usize,
        point: Vec2,
    },
    ClockwiseSector {
        sector: usize,
    },
    SectorOverlap {
        first: usize,
        second: usize,
        point: Vec2,
    },
    /// Edge shared with same winding or by more than two sectors
    NonManifoldEdge {
        sector: usize,
        wall: usize,
        other_sector: usize,
        other_wall: usize,
    },
    InvalidNcPortalTarget {
        sector: usize,
        wall: usize,
        target_sector: u32,
        target_point: u32,
    },
    NcPortalLengthMismatch {
        sector: usize,
        wall: usize,
        source_length: f32,
        target_length: f32,
    },
    /// Portal target is already linked elsewhere
    PortalConflict {
        sector: usize,
        wall: usize,
        target_sector: usize,
        target_wall: usize,
    },
    /// Built map portal pair is inconsistent
    InconsistentPortal {
        sector: usize,
        wall: usize,
    },
} // enum BuildError

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManySectors { count } => write!(f, "too many sectors: {count}"),
            Self::TooManyWalls { sector, count } => write!(f, "sector {sector} has too many walls: {count}"),
            Self::InvalidPointIndex { sector, wall, point } => {
                write!(f, "sector {sector} wall {wall} references invalid point {point}")
            }
            Self::DegenerateSector { sector } => write!(f, "sector {sector} is degenerate"),
            Self::InvalidSectorBounds { sector, floor, ceiling } => {
                write!(f, "sector {sector} floor {floor} is above ceiling {ceiling}")
            }
            Self::NonConvexSector { sector, wall, point } => {
                write!(f, "sector {sector} is not convex at wall {wall} ({point})")
            }
            Self::ClockwiseSector { sector } => write!(f, "sector {sector} is clockwise"),
            Self::SectorOverlap { first, second, point } => {
                write!(f, "sectors {first} and {second} overlap at {point}")
            }
            Self::NonManifoldEdge { sector, wall, other_sector, other_wall } => write!(
                f,
                "sector {sector} wall {wall} shares edge with sector {other_sector} wall {other_wall} with invalid winding"
            ),
            Self::InvalidNcPortalTarget { sector, wall, target_sector, target_point } => write!(
                f,
                "sector {sector} wall {wall} portal targets missing wall (sector {target_sector}, point {target_point})"
            ),
            Self::NcPortalLengthMismatch { sector, wall, source_length, target_length } => write!(
                f,
                "sector {sector} wall {wall} portal length {source_length} does not match target length {target_length}"
            ),
            Self::PortalConflict { sector, wall, target_sector, target_wall } => write!(
                f,
                "sector {sector} wall {wall} portal target (sector {target_sector} wall {target_wall}) is linked elsewhere"
            ),
            Self::InconsistentPortal { sector, wall } => {
                write!(f, "sector {sector} wall {wall} portal has no consistent twin")
            }
        }
    } // fn fmt
} // impl std::fmt::Display for BuildError

impl std::error::Error for BuildError {}

/// Zero length wall checking function, walls may collapse after point welding
pub(crate) fn check_edges(sector: usize, points: &[Vec2]) -> Result<(), BuildError> {
    let scale = Aabb::from_points(points).size().max_element().max(EPSILON);

    for (index, point) in points.iter().enumerate() {
        if (points[(index + 1) % points.len()] - *point).length() <= EPSILON * scale {
            return Err(BuildError::DegenerateSector { sector });
        }
    }

    Ok(())
} // fn check_edges

/// Sector convexity and winding checking function
/// * `sector` - sector index (for diagnostics)
/// * `points` - sector point loop
/// * Returns error if sector is degenerate, clockwise or non-convex
pub(crate) fn check_convexity(sector: usize, points: &[Vec2]) -> Result<(), BuildError> {
    check_edges(sector, points)?;

    let count = points.len();
    let scale = Aabb::from_points(points).size().max_element().max(EPSILON);
    let area = polygon_area2(points);

    if area.abs() <= EPSILON * scale * scale {
        return Err(BuildError::DegenerateSector { sector });
    }
    if area < 0.0 {
        return Err(BuildError::ClockwiseSector { sector });
    }

    let mut turning = 0.0;
    for index in 0..count {
        let prev = points[(index + count - 1) % count];
        let point = points[index];
        let next = points[(index + 1) % count];

        let incoming = point - prev;
        let outgoing = next - point;

        let turn = cross(incoming, outgoing);
        if turn < -EPSILON * incoming.length() * outgoing.length() {
            return Err(BuildError::NonConvexSector { sector, wall: index, point });
        }

        turning += turn.atan2(incoming.dot(outgoing));
    }

    // Self-intersecting loops turn more than once
    if turning > std::f32::consts::TAU + 1e-3 {
        return Err(BuildError::NonConvexSector { sector, wall: 0, point: points[0] });
    }

    Ok(())
} // fn check_convexity

/// Close point merging function
/// * Returns canonical point index for every point
fn weld_points(points: &[Vec2], epsilon: f32) -> Vec<u32> {
    if epsilon <= 0.0 {
        return (0..points.len() as u32).collect();
    }

    let mut cells = HashMap::<(i64, i64), SmallVec<[u32; 2]>>::new();
    let mut canonical = Vec::with_capacity(points.len());

    for (index, point) in points.iter().enumerate() {
        let key = ((point.x / epsilon).floor() as i64, (point.y / epsilon).floor() as i64);

        let found = (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (key.0 + dx, key.1 + dy)))
            .filter_map(|cell| cells.get(&cell))
            .flat_map(|cell| cell.iter())
            .find(|other| (points[**other as usize] - *point).length() <= epsilon)
            .copied();

        match found {
            Some(other) => canonical.push(other),
            None => {
                canonical.push(index as u32);
                cells.entry(key).or_default().push(index as u32);
            }
        }
    }

    canonical
} // fn weld_points

/// Building context, input plus derived per-wall data
struct Context<'a> {
    input: &'a MapBuildInput,
    config: &'a BuildConfig,
    /// Canonical point index per point
    canonical: Vec<u32>,
    /// First wall of every sector
    offsets: Vec<u32>,
} // struct Context

impl<'a> Context<'a> {
    fn point(&self, sector: usize, wall: usize) -> Vec2 {
        let walls = &self.input.sectors[sector].walls;
        self.input.points[self.canonical[walls[wall].point as usize] as usize]
    }

    fn wall_end(&self, sector: usize, wall: usize) -> Vec2 {
        self.point(sector, (wall + 1) % self.input.sectors[sector].walls.len())
    }

    fn edge(&self, sector: usize, wall: usize) -> (u32, u32) {
        let walls = &self.input.sectors[sector].walls;
        let next = (wall + 1) % walls.len();
        (
            self.canonical[walls[wall].point as usize],
            self.canonical[walls[next].point as usize],
        )
    }

    fn polygon(&self, sector: usize) -> Vec<Vec2> {
        (0..self.input.sectors[sector].walls.len())
            .map(|wall| self.point(sector, wall))
            .collect()
    }

    fn wall_id(&self, sector: usize, wall: usize) -> WallId {
        WallId::new(self.offsets[sector] + wall as u32)
    }

    /// Structural (point indices, wall counts, bounds) checks
    fn check_structure(&self) -> Result<(), BuildError> {
        let sectors = &self.input.sectors;

        if sectors.len() > u16::MAX as usize {
            return Err(BuildError::TooManySectors { count: sectors.len() });
        }

        for (sector_index, sector) in sectors.iter().enumerate() {
            if sector.walls.len() > u16::MAX as usize {
                return Err(BuildError::TooManyWalls { sector: sector_index, count: sector.walls.len() });
            }
            if (1..3).contains(&sector.walls.len()) {
                return Err(BuildError::DegenerateSector { sector: sector_index });
            }

            for (wall_index, wall) in sector.walls.iter().enumerate() {
                if wall.point as usize >= self.input.points.len() {
                    return Err(BuildError::InvalidPointIndex {
                        sector: sector_index,
                        wall: wall_index,
                        point: wall.point,
                    });
                }
            }

            if !(sector.floor <= sector.ceiling) {
                return Err(BuildError::InvalidSectorBounds {
                    sector: sector_index,
                    floor: sector.floor,
                    ceiling: sector.ceiling,
                });
            }
        }

        Ok(())
    } // fn check_structure

    /// Classical portals by opposite directed edges detecting function
    /// * Returns portal for every (sector, wall) pair that got one
    fn find_classical_portals(&self) -> Result<HashMap<(usize, usize), Portal>, BuildError> {
        let solid = self.input.solid_edges
            .iter()
            .map(|(first, second)| {
                let canonical = |index: u32| self.canonical.get(index as usize).copied().unwrap_or(index);
                UnorderedPair::new(canonical(*first), canonical(*second))
            })
            .collect::<HashSet<_>>();

        // Edge -> users (sector, wall, edge start)
        let mut edges = HashMap::<UnorderedPair<u32>, SmallVec<[(usize, usize, u32); 2]>>::new();

        for (sector_index, sector) in self.input.sectors.iter().enumerate() {
            for (wall_index, wall) in sector.walls.iter().enumerate() {
                if wall.nc_portal.is_some() {
                    continue;
                }

                let (start, end) = self.edge(sector_index, wall_index);
                let pair = UnorderedPair::new(start, end);

                if !solid.contains(&pair) {
                    edges.entry(pair).or_default().push((sector_index, wall_index, start));
                }
            }
        }

        let mut portals = HashMap::new();

        for users in edges.values() {
            let (sector, wall, start) = users[0];

            if let Some(&(other_sector, other_wall, other_start)) = users.get(1) {
                if users.len() > 2 || start == other_start || sector == other_sector {
                    return Err(BuildError::NonManifoldEdge { sector, wall, other_sector, other_wall });
                }

                portals.insert((sector, wall), Portal {
                    sector: SectorId::new(other_sector as u16),
                    wall: self.wall_id(other_sector, other_wall),
                    kind: PortalKind::Classical,
                });
                portals.insert((other_sector, other_wall), Portal {
                    sector: SectorId::new(sector as u16),
                    wall: self.wall_id(sector, wall),
                    kind: PortalKind::Classical,
                });
            }
        }

        Ok(portals)
    } // fn find_classical_portals

    /// Authored portal target wall finding function
    fn resolve_target(&self, sector: usize, wall: usize, link: NcPortalBuildData) -> Result<(usize, usize), BuildError> {
        let invalid = BuildError::InvalidNcPortalTarget {
            sector,
            wall,
            target_sector: link.sector,
            target_point: link.point,
        };

        let target_sector = link.sector as usize;
        let target_point = self.canonical.get(link.point as usize).copied().ok_or(invalid.clone())?;

        let target_wall = self.input.sectors
            .get(target_sector)
            .and_then(|target| target.walls
                .iter()
                .position(|target_wall| self.canonical[target_wall.point as usize] == target_point)
            )
            .ok_or(invalid.clone())?;

        if (target_sector, target_wall) == (sector, wall) {
            return Err(invalid);
        }

        Ok((target_sector, target_wall))
    } // fn resolve_target

    /// Non-euclidean portals resolving function
    fn resolve_nc_portals(&self, classical: &HashMap<(usize, usize), Portal>) -> Result<HashMap<(usize, usize), Portal>, BuildError> {
        let mut portals = HashMap::new();

        for (sector_index, sector) in self.input.sectors.iter().enumerate() {
            for (wall_index, wall) in sector.walls.iter().enumerate() {
                let Some(link) = wall.nc_portal else {
                    continue;
                };

                let (target_sector, target_wall) = self.resolve_target(sector_index, wall_index, link)?;
                let conflict = BuildError::PortalConflict {
                    sector: sector_index,
                    wall: wall_index,
                    target_sector,
                    target_wall,
                };

                if classical.contains_key(&(target_sector, target_wall)) {
                    return Err(conflict);
                }

                let (start, end) = (self.point(sector_index, wall_index), self.wall_end(sector_index, wall_index));
                let (target_start, target_end) = (self.point(target_sector, target_wall), self.wall_end(target_sector, target_wall));

                let source_length = (end - start).length();
                let target_length = (target_end - target_start).length();
                if (source_length - target_length).abs() > self.config.length_tolerance * source_length.max(1.0) {
                    return Err(BuildError::NcPortalLengthMismatch {
                        sector: sector_index,
                        wall: wall_index,
                        source_length,
                        target_length,
                    });
                }

                let two_way = match self.input.sectors[target_sector].walls[target_wall].nc_portal {
                    None => false,
                    Some(back) => {
                        if self.resolve_target(target_sector, target_wall, back)? != (sector_index, wall_index) {
                            return Err(conflict);
                        }
                        true
                    }
                };

                portals.insert((sector_index, wall_index), Portal {
                    sector: SectorId::new(target_sector as u16),
                    wall: self.wall_id(target_sector, target_wall),
                    kind: PortalKind::NonEuclidean {
                        to_destination: portal::non_euclidean_transform(start, end, target_start, target_end),
                        two_way,
                    },
                });
            }
        }

        Ok(portals)
    } // fn resolve_nc_portals

    /// Pairwise sector overlap checking function
    fn check_overlaps(&self, polygons: &[Vec<Vec2>], bounds: &[(Aabb, SectorId)]) -> Result<(), BuildError> {
        let grid = SpatialGrid::build(bounds);

        for (aabb, id) in bounds {
            for other in grid.query_aabb(aabb) {
                if other <= *id {
                    continue;
                }

                let (first, second) = (id.index(), other.index());
                if let Some(point) = convex_overlap(&polygons[first], &polygons[second], self.config.overlap_tolerance) {
                    return Err(BuildError::SectorOverlap { first, second, point });
                }
            }
        }

        Ok(())
    } // fn check_overlaps

    fn build(&self, flags: BuildFlags) -> Result<MapSectors, BuildError> {
        self.check_structure()?;

        let polygons = (0..self.input.sectors.len())
            .map(|sector| self.polygon(sector))
            .collect::<Vec<_>>();

        for (sector, polygon) in polygons.iter().enumerate() {
            if polygon.is_empty() {
                continue;
            }

            if flags.contains(BuildFlags::OMIT_CONVEXITY_CLOCKWISE_CHECK) {
                check_edges(sector, polygon)?;
            } else {
                check_convexity(sector, polygon)?;
            }
        }

        let classical = self.find_classical_portals()?;
        let non_euclidean = self.resolve_nc_portals(&classical)?;

        let bounds = polygons
            .iter()
            .enumerate()
            .map(|(sector, polygon)| (Aabb::from_points(polygon), SectorId::new(sector as u16)))
            .collect::<Vec<_>>();

        if !flags.contains(BuildFlags::OMIT_SECTOR_OVERLAP_CHECK) {
            self.check_overlaps(&polygons, &bounds)?;
        }

        let mut sectors = Vec::with_capacity(self.input.sectors.len());
        let mut walls = Vec::with_capacity(*self.offsets.last().unwrap_or(&0) as usize);

        for (sector_index, sector) in self.input.sectors.iter().enumerate() {
            let polygon = &polygons[sector_index];

            for wall_index in 0..polygon.len() {
                let start = polygon[wall_index];
                let end = polygon[(wall_index + 1) % polygon.len()];
                let key = (sector_index, wall_index);

                walls.push(Wall {
                    start,
                    end,
                    normal: wall_normal(start, end),
                    sector: SectorId::new(sector_index as u16),
                    portal: classical.get(&key).or_else(|| non_euclidean.get(&key)).copied(),
                });
            }

            sectors.push(Sector {
                first_wall: self.wall_id(sector_index, 0),
                last_wall: self.wall_id(sector_index, polygon.len()),
                floor: sector.floor,
                ceiling: sector.ceiling,
                aabb: bounds[sector_index].0,
            });
        }

        let grid = match self.config.grid_cell_size {
            None => SpatialGrid::build(&bounds),
            Some(cell_size) => {
                let region = bounds.iter().fold(Aabb::EMPTY, |region, (aabb, _)| region.union(*aabb));
                let mut grid = SpatialGrid::new(region, cell_size);
                for (aabb, id) in &bounds {
                    grid.insert(*aabb, *id);
                }
                grid
            }
        };

        log::info!(
            "Map built: {} sectors, {} walls, {} classical and {} non-euclidean portal walls",
            sectors.len(),
            walls.len(),
            classical.len(),
            non_euclidean.len(),
        );

        Ok(MapSectors::from_parts(sectors, walls, grid))
    } // fn build
} // impl Context

/// Map building function
/// * `input` - points and sector definitions
/// * `flags` - build flags
/// * Returns built map or the first validation failure
pub fn build_map(input: &MapBuildInput, flags: BuildFlags) -> Result<MapSectors, BuildError> {
    build_map_with(input, flags, &BuildConfig::default())
} // fn build_map

/// Map with explicit tolerances building function
pub fn build_map_with(input: &MapBuildInput, flags: BuildFlags, config: &BuildConfig) -> Result<MapSectors, BuildError> {
    let mut offsets = Vec::with_capacity(input.sectors.len() + 1);
    let mut total = 0u64;
    for sector in &input.sectors {
        offsets.push(total as u32);
        total += sector.walls.len() as u64;
    }
    offsets.push(total.min(u32::MAX as u64) as u32);

    let result = if total > u32::MAX as u64 {
        Err(BuildError::TooManyWalls { sector: input.sectors.len(), count: total as usize })
    } else {
        let context = Context {
            input,
            config,
            canonical: weld_points(&input.points, config.weld_epsilon),
            offsets,
        };
        context.build(flags)
    };

    result.map_err(|error| {
        log::error!("Map building failed: {error}");

        if flags.contains(BuildFlags::ASSERT_ON_FAIL) {
            panic!("map building failed: {error}");
        }

        error
    })
} // fn build_map_with

/// Incremental map authoring helper
#[derive(Clone, Debug, Default)]
pub struct MapBuilder {
    input: MapBuildInput,
    flags: BuildFlags,
    config: BuildConfig,
} // struct MapBuilder

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(mut self, flags: BuildFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Point adding function
    /// * Returns point index
    pub fn add_point(&mut self, point: Vec2) -> u32 {
        self.input.points.push(point);
        (self.input.points.len() - 1) as u32
    }

    /// Sector by existing point indices adding function
    /// * Returns sector index
    pub fn add_sector_indexed(&mut self, points: &[u32], floor: f32, ceiling: f32) -> u32 {
        self.input.sectors.push(SectorBuildData {
            walls: points.iter().copied().map(WallBuildData::new).collect(),
            floor,
            ceiling,
        });
        (self.input.sectors.len() - 1) as u32
    } // fn add_sector_indexed

    /// Sector by point positions adding function. Coincident points of different sectors are welded.
    /// * Returns sector index
    pub fn add_sector(&mut self, points: &[Vec2], floor: f32, ceiling: f32) -> u32 {
        let indices = points.iter().map(|point| self.add_point(*point)).collect::<Vec<_>>();
        self.add_sector_indexed(&indices, floor, ceiling)
    }

    /// Edge that must never become a classical portal marking function
    pub fn add_solid_edge(&mut self, first: u32, second: u32) {
        self.input.solid_edges.push((first, second));
    }

    /// One-way non-euclidean portal linking function
    /// * `sector`, `wall` - source sector and its relative wall index
    /// * `target_sector`, `target_wall` - destination sector and its relative wall index
    pub fn link_portal(&mut self, sector: u32, wall: usize, target_sector: u32, target_wall: usize) -> &mut Self {
        let point = self.input.sectors[target_sector as usize].walls[target_wall].point;

        self.input.sectors[sector as usize].walls[wall].nc_portal = Some(NcPortalBuildData {
            sector: target_sector,
            point,
        });
        self
    } // fn link_portal

    /// Two-way non-euclidean portal linking function
    pub fn link_portal_two_way(&mut self, sector: u32, wall: usize, target_sector: u32, target_wall: usize) -> &mut Self {
        self.link_portal(sector, wall, target_sector, target_wall)
            .link_portal(target_sector, target_wall, sector, wall)
    }

    pub fn input(&self) -> &MapBuildInput {
        &self.input
    }

    pub fn into_input(self) -> MapBuildInput {
        self.input
    }

    pub fn build(&self) -> Result<MapSectors, BuildError> {
        build_map_with(&self.input, self.flags, &self.config)
    }
} // impl MapBuilder


// file map/builder.rs
