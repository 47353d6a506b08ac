/// WEIRD Project
/// `File` path.rs
/// `Description` Sector graph path finding
/// `Author` TioT2
/// `Last changed` 16.10.2026

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::map::{MapSectors, Portal, SectorId, WallId};
use crate::math::*;

/// Agent parameters path must be walkable with
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathParams {
    /// Maximal floor rise between neighbour sectors
    pub max_step: f32,
    /// Agent height, portal openings must be at least that high
    pub height: f32,
    /// Agent radius, portals must be at least twice as wide
    pub radius: f32,
} // struct PathParams

impl Default for PathParams {
    fn default() -> Self {
        Self {
            max_step: 0.3,
            height: 1.5,
            radius: 0.25,
        }
    }
} // impl Default for PathParams

/// Path point
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub sector: SectorId,
    /// Position in `sector` frame
    pub position: Vec3,
    /// Portal wall crossed to reach waypoint
    pub portal: Option<WallId>,
    /// Previous waypoint frame to this waypoint frame transform, set for non-euclidean crossings only
    pub transform: Option<Affine2>,
} // struct Waypoint

/// Found path
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Waypoints from start to goal
    pub waypoints: Vec<Waypoint>,
    /// Total length
    pub length: f32,
} // struct Path

impl Path {
    pub fn start(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn goal(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Count of crossed portals
    pub fn portal_count(&self) -> usize {
        self.waypoints.iter().filter(|waypoint| waypoint.portal.is_some()).count()
    }
} // impl Path

/// Open list entry. `wall` is the crossed source wall, None for the goal.
#[derive(Copy, Clone, Debug)]
struct OpenNode {
    estimate: f32,
    cost: f32,
    wall: Option<WallId>,
} // struct OpenNode

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // Reversed, BinaryHeap pops the smallest estimate first
    fn cmp(&self, other: &Self) -> Ordering {
        other.estimate.total_cmp(&self.estimate)
    }
} // impl Ord for OpenNode

/// Search node record
#[derive(Copy, Clone, Debug)]
struct Visit {
    cost: f32,
    /// Previous crossed wall, None if reached from start
    parent: Option<WallId>,
} // struct Visit

/// Path search state
struct PathSearch<'a> {
    map: &'a MapSectors,
    params: &'a PathParams,
    goal_sector: SectorId,
    goal_point: Vec2,
    /// Frames differ behind non-euclidean portals, so distance to goal is not a lower bound there
    use_heuristic: bool,
    open: BinaryHeap<OpenNode>,
    visits: HashMap<WallId, Visit>,
    goal: Option<Visit>,
} // struct PathSearch

impl<'a> PathSearch<'a> {
    /// Portal is walkable check
    fn is_walkable(&self, from: SectorId, wall: WallId, portal: &Portal) -> bool {
        let source = self.map.sector(from);
        let destination = self.map.sector(portal.sector);

        let bottom = source.floor.max(destination.floor);
        let top = source.ceiling.min(destination.ceiling);

        destination.floor - source.floor <= self.params.max_step
            && top - bottom >= self.params.height
            && self.map.wall(wall).length() >= self.params.radius * 2.0
    } // fn is_walkable

    /// Sector from point expanding function
    /// * `sector` - sector to expand
    /// * `point` - point sector is entered at, in its frame
    /// * `cost` - path length up to `point`
    /// * `parent` - wall crossed to enter sector
    fn expand(&mut self, sector: SectorId, point: Vec2, cost: f32, parent: Option<WallId>) {
        if sector == self.goal_sector {
            let cost = cost + point.distance(self.goal_point);

            if self.goal.map_or(true, |visit| cost < visit.cost) {
                self.goal = Some(Visit { cost, parent });
                self.open.push(OpenNode { estimate: cost, cost, wall: None });
            }
            return;
        }

        let map = self.map;
        for (wall_id, wall, portal) in map.sector_portals(sector) {
            if !self.is_walkable(sector, wall_id, &portal) {
                continue;
            }

            let cost = cost + point.distance(wall.midpoint());
            if self.visits.get(&wall_id).map_or(false, |visit| cost >= visit.cost) {
                continue;
            }

            let heuristic = if self.use_heuristic {
                portal_entry(map, &portal).distance(self.goal_point)
            } else {
                0.0
            };

            self.visits.insert(wall_id, Visit { cost, parent });
            self.open.push(OpenNode { estimate: cost + heuristic, cost, wall: Some(wall_id) });
        }
    } // fn expand

    /// Search running function
    /// * Returns goal visit if goal is reachable
    fn run(&mut self) -> Option<Visit> {
        while let Some(node) = self.open.pop() {
            let Some(wall_id) = node.wall else {
                return self.goal;
            };

            // Stale entry
            if self.visits.get(&wall_id).map_or(true, |visit| node.cost > visit.cost) {
                continue;
            }

            let Some(portal) = self.map.wall(wall_id).portal else {
                continue;
            };

            self.expand(portal.sector, portal_entry(self.map, &portal), node.cost, Some(wall_id));
        }

        None
    } // fn run
} // impl PathSearch

/// Point portal is entered at, in destination frame
fn portal_entry(map: &MapSectors, portal: &Portal) -> Vec2 {
    map.wall(portal.wall).midpoint()
}

impl MapSectors {
    /// Path finding function
    /// * `from_sector`, `from` - start sector and position in its frame
    /// * `to_sector`, `to` - goal sector and position in its frame
    /// * `params` - agent parameters
    /// * Returns path if goal is reachable
    pub fn get_path(&self, from_sector: SectorId, from: Vec3, to_sector: SectorId, to: Vec3, params: &PathParams) -> Option<Path> {
        let start = Waypoint { sector: from_sector, position: from, portal: None, transform: None };
        let end = Waypoint { sector: to_sector, position: to, portal: None, transform: None };

        if from_sector == to_sector {
            return Some(Path {
                waypoints: vec![start, end],
                length: xy(from).distance(xy(to)),
            });
        }

        let mut search = PathSearch {
            map: self,
            params,
            goal_sector: to_sector,
            goal_point: xy(to),
            use_heuristic: !self.has_non_euclidean_portals(),
            open: BinaryHeap::new(),
            visits: HashMap::new(),
            goal: None,
        };

        search.expand(from_sector, xy(from), 0.0, None);
        let goal = search.run()?;

        // Crossed walls, goal to start
        let mut crossed = Vec::new();
        let mut parent = goal.parent;
        while let Some(wall_id) = parent {
            crossed.push(wall_id);
            parent = search.visits.get(&wall_id).and_then(|visit| visit.parent);
        }

        let mut waypoints = Vec::with_capacity(crossed.len() + 2);
        waypoints.push(start);

        for wall_id in crossed.into_iter().rev() {
            let wall = self.wall(wall_id);
            let portal = wall.portal?;
            let floor = self.sector(wall.sector).floor.max(self.sector(portal.sector).floor);

            waypoints.push(Waypoint {
                sector: portal.sector,
                position: portal_entry(self, &portal).extend(floor),
                portal: Some(wall_id),
                transform: portal.is_non_euclidean().then(|| portal.transform()),
            });
        }

        waypoints.push(end);

        log::debug!("Path from {from_sector} to {to_sector}: {} waypoints, length {}", waypoints.len(), goal.cost);

        Some(Path { waypoints, length: goal.cost })
    } // fn get_path

    /// Path waypoints in start frame calculation function
    /// * `path` - path to unfold
    /// * Returns waypoint positions, continuous in the frame of the first waypoint
    pub fn calc_path_relative(&self, path: &Path) -> Vec<Vec3> {
        let mut to_start = Affine2::IDENTITY;

        path.waypoints
            .iter()
            .map(|waypoint| {
                if let Some(transform) = waypoint.transform {
                    to_start = to_start * transform.inverse();
                }
                transform_point3(&to_start, waypoint.position)
            })
            .collect()
    } // fn calc_path_relative

    /// Sectors reachable within distance collecting function. Heights are ignored.
    /// * `sector` - start sector
    /// * `position` - start position in `sector` frame
    /// * `max_distance` - maximal distance through portals
    /// * Returns (sector, distance) pairs sorted by distance, start sector included
    pub fn floodfill_nearby_sectors(&self, sector: SectorId, position: Vec2, max_distance: f32) -> Vec<(SectorId, f32)> {
        let mut best = HashMap::<SectorId, f32>::new();
        let mut queue = vec![(sector, position, 0.0f32)];
        best.insert(sector, 0.0);

        while let Some((current, point, distance)) = queue.pop() {
            if best.get(&current).map_or(false, |known| distance > *known) {
                continue;
            }

            for (_, wall, portal) in self.sector_portals(current) {
                let closest = wall.closest_point(point);
                let distance = distance + point.distance(closest);

                if distance > max_distance || best.get(&portal.sector).map_or(false, |known| distance >= *known) {
                    continue;
                }

                best.insert(portal.sector, distance);
                queue.push((portal.sector, portal.transform().transform_point2(closest), distance));
            }
        }

        let mut sectors = best.into_iter().collect::<Vec<_>>();
        sectors.sort_by(|first, second| first.1.total_cmp(&second.1).then(first.0.cmp(&second.0)));
        sectors
    } // fn floodfill_nearby_sectors
} // impl MapSectors


// file path.rs
