/// WEIRD Project
/// `File` grid.rs
/// `Description` Uniform spatial grid over sector bounding boxes
/// `Author` TioT2
/// `Last changed` 16.10.2026

use smallvec::SmallVec;

use crate::geom::Aabb;
use crate::map::SectorId;
use crate::math::Vec2;

/// Grid cell contents
type Cell = SmallVec<[(Aabb, SectorId); 4]>;

/// Uniform grid, every sector box is stored in every cell it overlaps
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    bounds: Aabb,
    cell_size: f32,
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
} // struct SpatialGrid

impl SpatialGrid {
    /// Maximal cell count along one axis
    pub const MAX_CELLS_PER_AXIS: usize = 256;

    /// Empty grid create function
    /// * `bounds` - covered region
    /// * `cell_size` - requested cell side, grown if grid would be too dense
    /// * Returns empty grid
    pub fn new(bounds: Aabb, cell_size: f32) -> Self {
        if bounds.is_empty() {
            return Self { bounds, cell_size: 1.0, columns: 0, rows: 0, cells: Vec::new() };
        }

        let size = bounds.size();
        let cell_size = cell_size
            .max(size.x / Self::MAX_CELLS_PER_AXIS as f32)
            .max(size.y / Self::MAX_CELLS_PER_AXIS as f32)
            .max(f32::EPSILON);

        let columns = ((size.x / cell_size).ceil() as usize).clamp(1, Self::MAX_CELLS_PER_AXIS);
        let rows = ((size.y / cell_size).ceil() as usize).clamp(1, Self::MAX_CELLS_PER_AXIS);

        Self {
            bounds,
            cell_size,
            columns,
            rows,
            cells: vec![Cell::new(); columns * rows],
        }
    } // fn new

    /// Grid with automatically chosen cell size building function
    /// * `items` - boxes to insert
    /// * Returns filled grid. Cell side is the mean box extent.
    pub fn build(items: &[(Aabb, SectorId)]) -> Self {
        let items = items.iter().filter(|(aabb, _)| !aabb.is_empty());
        let bounds = items.clone().fold(Aabb::EMPTY, |bounds, (aabb, _)| bounds.union(*aabb));
        let count = items.clone().count().max(1) as f32;
        let mean_size = items.clone().map(|(aabb, _)| aabb.size().max_element()).sum::<f32>() / count;

        let mut grid = Self::new(bounds, mean_size.max(1.0));
        for (aabb, id) in items {
            grid.insert(*aabb, *id);
        }
        grid
    } // fn build

    /// Cell index range overlapped by box
    fn cell_range(&self, aabb: &Aabb) -> Option<(usize, usize, usize, usize)> {
        if self.cells.is_empty() || aabb.is_empty() || !aabb.overlaps(&self.bounds) {
            return None;
        }

        let to_cell = |value: f32, min: f32, count: usize| -> usize {
            (((value - min) / self.cell_size).floor().max(0.0) as usize).min(count - 1)
        };

        Some((
            to_cell(aabb.min.x, self.bounds.min.x, self.columns),
            to_cell(aabb.max.x, self.bounds.min.x, self.columns),
            to_cell(aabb.min.y, self.bounds.min.y, self.rows),
            to_cell(aabb.max.y, self.bounds.min.y, self.rows),
        ))
    } // fn cell_range

    /// Box inserting function
    /// * `aabb` - sector bounding box
    /// * `id` - sector identifier
    pub fn insert(&mut self, aabb: Aabb, id: SectorId) {
        if let Some((x0, x1, y0, y1)) = self.cell_range(&aabb) {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    self.cells[y * self.columns + x].push((aabb, id));
                }
            }
        }
    } // fn insert

    /// Sectors whose boxes contain point
    pub fn query_point(&self, point: Vec2) -> impl Iterator<Item = SectorId> + '_ {
        let cell = self
            .cell_range(&Aabb::new(point, point))
            .map(|(x, _, y, _)| &self.cells[y * self.columns + x][..])
            .unwrap_or_default();

        cell.iter()
            .filter(move |(aabb, _)| aabb.contains(point))
            .map(|(_, id)| *id)
    } // fn query_point

    /// Sectors whose boxes overlap region
    /// * `region` - region to query
    /// * Returns sorted unique sector identifiers
    pub fn query_aabb(&self, region: &Aabb) -> Vec<SectorId> {
        let mut result = Vec::new();

        if let Some((x0, x1, y0, y1)) = self.cell_range(region) {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    result.extend(self.cells[y * self.columns + x]
                        .iter()
                        .filter(|(aabb, _)| aabb.overlaps(region))
                        .map(|(_, id)| *id)
                    );
                }
            }
        }

        result.sort_unstable();
        result.dedup();
        result
    } // fn query_aabb

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// (columns, rows)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }
} // impl SpatialGrid

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(x + size, y + size))
    }

    #[test]
    fn every_overlapped_cell_holds_box() {
        let mut grid = SpatialGrid::new(square(0.0, 0.0, 10.0), 1.0);
        grid.insert(square(2.5, 2.5, 3.0), SectorId::new(7));

        for x in 0..10 {
            for y in 0..10 {
                let point = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let found = grid.query_point(point).any(|id| id == SectorId::new(7));
                let expected = (2.5..=5.5).contains(&point.x) && (2.5..=5.5).contains(&point.y);

                assert_eq!(found, expected, "point {point}");
            }
        }
    }

    #[test]
    fn build_and_query_region() {
        let grid = SpatialGrid::build(&[
            (square(0.0, 0.0, 2.0), SectorId::new(0)),
            (square(2.0, 0.0, 2.0), SectorId::new(1)),
            (square(10.0, 10.0, 2.0), SectorId::new(2)),
            (Aabb::EMPTY, SectorId::new(3)),
        ]);

        assert_eq!(grid.query_aabb(&square(1.0, 0.5, 2.0)), vec![SectorId::new(0), SectorId::new(1)]);
        assert_eq!(grid.query_aabb(&square(9.0, 9.0, 5.0)), vec![SectorId::new(2)]);
        assert!(grid.query_point(Vec2::new(-5.0, 0.0)).next().is_none());
        assert!(grid.query_point(Vec2::new(6.0, 6.0)).next().is_none());
    }

    #[test]
    fn dense_grid_is_capped() {
        let grid = SpatialGrid::new(square(0.0, 0.0, 1000.0), 0.01);
        let (columns, rows) = grid.dimensions();

        assert!(columns <= SpatialGrid::MAX_CELLS_PER_AXIS);
        assert!(rows <= SpatialGrid::MAX_CELLS_PER_AXIS);
    }

    #[test]
    fn empty_grid() {
        let grid = SpatialGrid::build(&[]);

        assert!(grid.query_point(Vec2::ZERO).next().is_none());
        assert!(grid.query_aabb(&square(0.0, 0.0, 1.0)).is_empty());
    }
}

// file grid.rs
