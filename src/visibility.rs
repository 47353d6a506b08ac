/// WEIRD Project
/// `File` visibility.rs
/// `Description` Portal graph visibility query implementation module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::geom::{Frustum, FrustumBuffer};
use crate::map::{MapSectors, SectorId, WallId};
use crate::math::*;

/// Distance from portal line at which viewer is considered standing in the portal
const PORTAL_PLANE_EPSILON: f32 = 1e-4;

/// Frame equality tolerance
const FRAME_EPSILON: f32 = 1e-4;

/// Portal, node was reached through
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortalStep {
    /// Sector portal wall belongs to
    pub sector: SectorId,
    /// Portal wall
    pub wall: WallId,
    pub non_euclidean: bool,
} // struct PortalStep

/// Single visible sector instance
#[derive(Clone, Debug)]
pub struct VisibilityNode {
    pub sector: SectorId,
    /// Visible wedges, in node's frame
    pub frustums: FrustumBuffer,
    /// Portal the node was first reached through, None for root
    pub via: Option<PortalStep>,
    /// BFS depth
    pub depth: u32,
    /// Query frame to node frame transform
    pub transform: Affine2,
    pub parent: Option<usize>,
    pub children: SmallVec<[usize; 4]>,
} // struct VisibilityNode

/// Visibility query result. Nodes are stored in BFS order, root is the first one.
#[derive(Clone, Debug, Default)]
pub struct VisibilityTree {
    nodes: Vec<VisibilityNode>,
} // struct VisibilityTree

impl VisibilityTree {
    pub fn root(&self) -> Option<&VisibilityNode> {
        self.nodes.first()
    }

    pub fn nodes(&self) -> &[VisibilityNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &VisibilityNode {
        &self.nodes[index]
    }

    /// Node children
    pub fn children(&self, index: usize) -> impl Iterator<Item = &VisibilityNode> {
        self.nodes[index].children.iter().map(|child| &self.nodes[*child])
    }

    /// Nodes in BFS order
    pub fn iter(&self) -> std::slice::Iter<'_, VisibilityNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sector visibility check
    pub fn is_visible(&self, sector: SectorId) -> bool {
        self.nodes.iter().any(|node| node.sector == sector)
    }

    /// Minimal BFS depth sector is visible at
    pub fn visible_depth(&self, sector: SectorId) -> Option<u32> {
        self.nodes
            .iter()
            .filter(|node| node.sector == sector)
            .map(|node| node.depth)
            .min()
    } // fn visible_depth

    /// Sorted unique visible sectors
    pub fn visible_sectors(&self) -> Vec<SectorId> {
        let mut sectors = self.nodes.iter().map(|node| node.sector).collect::<Vec<_>>();
        sectors.sort_unstable();
        sectors.dedup();
        sectors
    } // fn visible_sectors
} // impl VisibilityTree

/// Tree building state
struct Traversal<'a> {
    map: &'a MapSectors,
    nodes: Vec<VisibilityNode>,
    /// Node indices by sector, for revisit checks
    by_sector: HashMap<SectorId, SmallVec<[usize; 2]>>,
} // struct Traversal

impl<'a> Traversal<'a> {
    fn add_node(&mut self, node: VisibilityNode) -> usize {
        let index = self.nodes.len();

        if let Some(parent) = node.parent {
            self.nodes[parent].children.push(index);
        }
        self.by_sector.entry(node.sector).or_default().push(index);
        self.nodes.push(node);

        index
    } // fn add_node

    /// Wedge coverage by already found instances of (sector, frame) check
    fn is_covered(&self, sector: SectorId, transform: &Affine2, frustum: &Frustum) -> bool {
        self.by_sector
            .get(&sector)
            .map_or(false, |indices| indices
                .iter()
                .map(|index| &self.nodes[*index])
                .filter(|node| affine2_approx_eq(&node.transform, transform, FRAME_EPSILON))
                .any(|node| node.frustums.covers(frustum))
            )
    } // fn is_covered

    /// Next level nodes expanding function
    /// * `level` - depth of nodes to create
    /// * `current` - nodes of previous level
    /// * Returns nodes created or extended at this level
    fn expand_level(&mut self, level: u32, current: &[usize]) -> Vec<usize> {
        let map = self.map;
        let mut next = Vec::<usize>::new();

        for &node_index in current {
            let (sector, transform, frustums) = {
                let node = &self.nodes[node_index];
                (node.sector, node.transform, node.frustums.clone())
            };

            for (wall_id, wall, portal) in map.sector_portals(sector) {
                let portal_transform = portal.transform();
                let child_transform = portal_transform * transform;
                let destination = map.sector_points(portal.sector);

                for frustum in frustums.iter() {
                    let side = wall.distance(frustum.origin);

                    // Portal is seen from behind
                    if side < -PORTAL_PLANE_EPSILON {
                        continue;
                    }

                    let through = if side <= PORTAL_PLANE_EPSILON {
                        Some(*frustum)
                    } else {
                        frustum.through_segment(wall.start, wall.end)
                    };

                    let Some(child) = through
                        .map(|child| child.transformed(&portal_transform))
                        .and_then(|child| child.clip_polygon(destination))
                    else {
                        continue;
                    };

                    if self.is_covered(portal.sector, &child_transform, &child) {
                        continue;
                    }

                    // Same sector and frame reached at this level already
                    let existing = next.iter().copied().find(|index| {
                        let node = &self.nodes[*index];
                        node.sector == portal.sector && affine2_approx_eq(&node.transform, &child_transform, FRAME_EPSILON)
                    });

                    match existing {
                        Some(index) => {
                            self.nodes[index].frustums.push(child);
                        }
                        None => {
                            let index = self.add_node(VisibilityNode {
                                sector: portal.sector,
                                frustums: FrustumBuffer::with_frustum(child),
                                via: Some(PortalStep {
                                    sector,
                                    wall: wall_id,
                                    non_euclidean: portal.is_non_euclidean(),
                                }),
                                depth: level,
                                transform: child_transform,
                                parent: Some(node_index),
                                children: SmallVec::new(),
                            });
                            next.push(index);
                        }
                    }
                }
            }
        }

        next
    } // fn expand_level
} // impl Traversal

impl MapSectors {
    /// Visible sectors querying function
    /// * `position` - viewer position
    /// * `view_dir` - view direction
    /// * `hor_fov`, `ver_fov` - fields of view, radians
    /// * `recursion_depth` - maximal portal count to look through, 0 for viewer's sector only
    /// * Returns visibility tree, empty if viewer is outside of map
    pub fn query_visible(&self, position: Vec3, view_dir: Vec3, hor_fov: f32, ver_fov: f32, recursion_depth: u32) -> VisibilityTree {
        match self.get_sector_from_point(xy(position)) {
            Some(sector) => self.query_visible_from(sector, position, view_dir, hor_fov, ver_fov, recursion_depth),
            None => VisibilityTree::default(),
        }
    } // fn query_visible

    /// Visible sectors from known sector querying function
    /// * `sector` - viewer sector (resolves overlapping sectors of non-euclidean maps)
    pub fn query_visible_from(
        &self,
        sector: SectorId,
        position: Vec3,
        view_dir: Vec3,
        hor_fov: f32,
        ver_fov: f32,
        recursion_depth: u32,
    ) -> VisibilityTree {
        let mut traversal = Traversal {
            map: self,
            nodes: Vec::new(),
            by_sector: HashMap::new(),
        };

        let root = traversal.add_node(VisibilityNode {
            sector,
            frustums: FrustumBuffer::with_frustum(Frustum::from_view(position, view_dir, hor_fov, ver_fov)),
            via: None,
            depth: 0,
            transform: Affine2::IDENTITY,
            parent: None,
            children: SmallVec::new(),
        });

        let mut current = vec![root];
        for level in 1..=recursion_depth {
            current = traversal.expand_level(level, &current);

            log::trace!("Visibility level {level}: {} nodes", current.len());

            if current.is_empty() {
                break;
            }
        }

        VisibilityTree { nodes: traversal.nodes }
    } // fn query_visible_from
} // impl MapSectors


// file visibility.rs
