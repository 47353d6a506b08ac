/// WEIRD Project
/// `File` viewer/render.rs
/// `Description` Column renderer over visibility tree
/// `Author` TioT2
/// `Last changed` 16.10.2026

use weird_map::geom::Frustum;
use weird_map::map::{MapSectors, SectorId};
use weird_map::math::*;
use weird_map::visibility::{VisibilityNode, VisibilityTree};

use super::camera::Camera;
use super::surface::Surface;

/// Horizontal field of view, the projection maps it to the whole surface width
pub const FOV: f32 = std::f32::consts::FRAC_PI_2;

/// Minimap pixels per map unit
const MINIMAP_SCALE: f32 = 6.0;

/// Wall, floor and ceiling colors
struct Palette {
    wall: u32,
    floor: u32,
    ceiling: u32,
} // struct Palette

impl Palette {
    fn new(depth: u32, non_euclidean: bool) -> Self {
        let (wall, floor, ceiling) = match (non_euclidean, depth) {
            (true, _) => (0xBBAACC, 0xEEDDFF, 0x887799),
            (false, 0) => (0xAACCAA, 0xDDFFDD, 0x779977),
            (false, 1) => (0xCCAAAA, 0xFFDDDD, 0x997777),
            (false, 2) => (0xAAAACC, 0xDDDDFF, 0x777799),
            _ => (0xBBBBBB, 0xEEEEEE, 0x888888),
        };

        Self { wall, floor, ceiling }
    } // fn new
} // impl Palette

/// Per-column state of one frame
struct Columns {
    /// First row still open for drawing
    ceil: Vec<usize>,
    /// Row after the last one open for drawing
    floor: Vec<usize>,
} // struct Columns

impl Columns {
    fn reset(&mut self, width: usize, height: usize) {
        self.ceil.clear();
        self.ceil.resize(width, 0);
        self.floor.clear();
        self.floor.resize(width, height);
    } // fn reset
} // struct Columns

/// Render representation structure
pub struct Render {
    columns: Columns,
    /// Maximal count of portals to look through
    pub recursion_depth: u32,
} // struct Render

/// Frustum to screen column range projecting function
/// * `camera` - camera in frustum frame
/// * `frustum` - frustum
/// * `width` - surface width
/// * Returns [begin; end) column range
fn column_range(camera: &Camera, frustum: &Frustum, width: usize) -> (usize, usize) {
    let Some(bounds) = frustum.bounds else {
        return (0, width);
    };

    let to_column = |direction: Vec2, fallback: f32| {
        let p = camera.direction_to_space(direction);

        if p.y <= EPSILON {
            fallback
        } else {
            ((p.x / p.y * 0.5 + 0.5) * width as f32).clamp(0.0, width as f32)
        }
    };

    let begin = to_column(bounds.left, 0.0).floor() as usize;
    let end = to_column(bounds.right, width as f32).ceil() as usize;

    (begin, end.max(begin))
} // fn column_range

/// Node column ranges, merged
fn node_columns(camera: &Camera, node: &VisibilityNode, width: usize) -> Vec<(usize, usize)> {
    let mut ranges = node.frustums
        .iter()
        .map(|frustum| column_range(camera, frustum, width))
        .filter(|(begin, end)| begin < end)
        .collect::<Vec<_>>();
    ranges.sort_unstable();

    let mut merged = Vec::<(usize, usize)>::with_capacity(ranges.len());
    for (begin, end) in ranges {
        match merged.last_mut() {
            Some(last) if begin <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((begin, end)),
        }
    }

    merged
} // fn node_columns

impl Render {
    /// Render create function
    pub fn new() -> Render {
        Render {
            columns: Columns { ceil: Vec::new(), floor: Vec::new() },
            recursion_depth: 16,
        }
    } // fn new

    /// Sector rendering function
    /// * `surface` - surface to render to
    /// * `map` - map
    /// * `camera` - camera, in sector frame
    /// * `sector_id` - sector to render identifier
    /// * `palette` - sector colors
    /// * `screen_x_begin` - screen x clipping area start
    /// * `screen_x_end` - screen x clipping area end
    fn render_sector(
        &mut self,
        surface: &mut Surface,
        map: &MapSectors,
        camera: &Camera,
        sector_id: SectorId,
        palette: &Palette,
        screen_x_begin: usize,
        screen_x_end: usize,
    ) {
        let ext = surface.get_extent();
        let sector = map.sector(sector_id);

        for wall in map.sector_walls(sector_id) {
            // Walls are seen from inside only
            if wall.distance(camera.location) <= 0.0 {
                continue;
            }

            let mut p0 = camera.to_space(wall.start);
            let mut p1 = camera.to_space(wall.end);

            if p0.x > p1.x {
                std::mem::swap(&mut p0, &mut p1);
            }

            // Check for y visibility and clamp if not
            if p0.y <= 0.0 {
                if p1.y <= 0.0 {
                    continue;
                }
                p0 = Vec2::new(p0.x - p0.y * (p1.x - p0.x) / (p1.y - p0.y), 0.001);
            } else if p1.y <= 0.0 {
                p1 = Vec2::new(p0.x - p0.y * (p1.x - p0.x) / (p1.y - p0.y), 0.001);
            }

            let to_screen_x = |p: Vec2| -> usize {
                (((p.x / p.y * 0.5 + 0.5) * ext.width as f32) as isize)
                    .clamp(screen_x_begin as isize, screen_x_end as isize) as usize
            };

            let (xp0, xp1) = {
                let (x0, x1) = (to_screen_x(p0), to_screen_x(p1));
                (x0.min(x1), x0.max(x1))
            };

            // Edge normal and distance form user to edge
            let edge_norm = Vec2::new(p1.y - p0.y, p0.x - p1.x).normalize_or_zero();
            let inv_edge_distance = 1.0 / edge_norm.dot(p0).abs().max(EPSILON);

            let neighbour_bounds = wall.portal
                .map(|portal| map.sector(portal.sector))
                .map(|neighbour| (neighbour.floor, neighbour.ceiling));

            for x in xp0..xp1 {
                let buf_ceil = self.columns.ceil[x];
                let buf_floor = self.columns.floor[x];

                if buf_ceil >= buf_floor {
                    continue;
                }

                let pixel_dir = Vec2::new((x as f32 + 0.5) / ext.width as f32 * 2.0 - 1.0, 1.0);
                let inv_distance = pixel_dir.dot(edge_norm).abs() * inv_edge_distance;

                let to_screen_height = |height: f32| -> usize {
                    let y = ext.height as f32 * 0.5 + (camera.height - height) * inv_distance * ext.width as f32 * 0.5;
                    (y as isize).clamp(buf_ceil as isize, buf_floor as isize) as usize
                };

                let ceil_y = to_screen_height(sector.ceiling);
                let floor_y = to_screen_height(sector.floor).max(ceil_y);

                surface.draw_column(x, buf_ceil, ceil_y, palette.ceiling);
                surface.draw_column(x, floor_y, buf_floor, palette.floor);

                match neighbour_bounds {
                    Some((neighbour_floor, neighbour_ceiling)) => {
                        let neighbour_ceil_y = to_screen_height(neighbour_ceiling).clamp(ceil_y, floor_y);
                        let neighbour_floor_y = to_screen_height(neighbour_floor).clamp(neighbour_ceil_y, floor_y);

                        // Upper and lower walls, portal opening is left for deeper sectors
                        surface.draw_column(x, ceil_y, neighbour_ceil_y, palette.wall);
                        surface.draw_column(x, neighbour_floor_y, floor_y, palette.wall);

                        self.columns.ceil[x] = neighbour_ceil_y;
                        self.columns.floor[x] = neighbour_floor_y;
                    }
                    None => {
                        surface.draw_column(x, ceil_y, floor_y, palette.wall);

                        // Column is complete
                        self.columns.ceil[x] = buf_floor;
                    }
                }
            }
        }
    } // fn render_sector

    /// Next frame rendering function
    /// * `surface` - surface to render frame to
    /// * `map` - map to render
    /// * `camera` - camera
    /// * `sector_id` - id of sector camera is in
    /// * Returns visibility tree frame is rendered from
    pub fn render(&mut self, surface: &mut Surface, map: &MapSectors, camera: &Camera, sector_id: SectorId) -> VisibilityTree {
        let ext = surface.get_extent();

        surface.clear(0x000000);
        self.columns.reset(ext.width, ext.height);

        let tree = map.query_visible_from(sector_id, camera.position(), camera.view_direction(), FOV, FOV, self.recursion_depth);

        // Nodes are stored level by level, so every column is drawn front to back
        for node in tree.iter() {
            let local_camera = camera.transformed(&node.transform);
            let palette = Palette::new(node.depth, node.via.map_or(false, |step| step.non_euclidean));

            for (begin, end) in node_columns(&local_camera, node, ext.width) {
                self.render_sector(surface, map, &local_camera, node.sector, &palette, begin, end);
            }
        }

        tree
    } // fn render

    /// Minimap rendering function
    /// * `surface` - surface to render minimap to
    /// * `map` - map to render
    /// * `camera` - camera
    /// * `tree` - visibility tree of current frame
    pub fn render_minimap(&mut self, surface: &mut Surface, map: &MapSectors, camera: &Camera, tree: &VisibilityTree) {
        let ext = surface.get_extent();

        surface.draw_bar(0, 0, ext.width as isize, ext.height as isize, 0x000000);

        let to_pixel = |p: Vec2| -> (isize, isize) {
            (
                ext.width as isize / 2 + (p.x * MINIMAP_SCALE) as isize,
                ext.height as isize / 2 - (p.y * MINIMAP_SCALE) as isize,
            )
        };

        // Deeper nodes first, so nearer ones overwrite them
        for node in tree.iter().rev() {
            let local_camera = camera.transformed(&node.transform);
            let color_scale = 15u32.saturating_sub(node.depth * 3).max(4);

            for wall in map.sector_walls(node.sector) {
                let (x0, y0) = to_pixel(local_camera.to_space(wall.start));
                let (x1, y1) = to_pixel(local_camera.to_space(wall.end));

                let edge_color = match wall.portal {
                    None => 0x001100,
                    Some(portal) if portal.is_non_euclidean() => 0x110011,
                    Some(_) => 0x110000,
                } * color_scale;

                surface.draw_line(x0, y0, x1, y1, edge_color);
            }
        }

        // Render player
        let (x0, y0) = ((ext.width / 2) as isize, (ext.height / 2) as isize);

        surface.draw_bar(x0 - 1, y0 - 1, x0 + 2, y0 + 2, 0xFFFFFF);
        surface.draw_line(x0, y0, x0, y0 - 5, 0xFFFFFF);
    } // fn render_minimap
} // impl Render

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(location: Vec2, rotation: f32) -> Camera {
        let mut camera = Camera::new();
        camera.set_location(location, 1.0, rotation);
        camera
    }

    #[test]
    fn view_frustum_covers_whole_surface() {
        let camera = camera_at(Vec2::new(1.0, 2.0), 0.3);
        let frustum = Frustum::from_view(camera.position(), camera.view_direction(), FOV, FOV);

        let (begin, end) = column_range(&camera, &frustum, 640);
        assert!(begin <= 1);
        assert!(end >= 639);
    }

    #[test]
    fn narrow_frustum_maps_to_center() {
        let camera = camera_at(Vec2::ZERO, 0.0);
        let frustum = Frustum::new(Vec2::ZERO, Vec2::new(1.0, -0.5).normalize(), Vec2::new(1.0, 0.5).normalize());

        let (begin, end) = column_range(&camera, &frustum, 400);
        assert!((99..=100).contains(&begin));
        assert!((300..=301).contains(&end));
    }
}

// file viewer/render.rs
