/// WEIRD Project
/// `File` map/portal.rs
/// `Description` Portal transforms and portal rendering helpers
/// `Author` TioT2
/// `Last changed` 16.10.2026

use super::{MapSectors, WallId};
use crate::math::*;

/// Non-euclidean portal transform building function.
/// Source wall start is mapped to destination wall end and vice versa, so walls are glued face to face.
/// * `source_start`, `source_end` - source wall
/// * `destination_start`, `destination_end` - destination wall
/// * Returns source to destination frame rigid transform
pub fn non_euclidean_transform(source_start: Vec2, source_end: Vec2, destination_start: Vec2, destination_end: Vec2) -> Affine2 {
    let source_direction = source_end - source_start;
    let destination_direction = destination_start - destination_end;

    let angle = destination_direction.y.atan2(destination_direction.x) - source_direction.y.atan2(source_direction.x);
    let rotation = Vec2::from_angle(angle);

    Affine2::from_angle_translation(angle, destination_end - rotation.rotate(source_start))
} // fn non_euclidean_transform

/// Precomputed portal data used by renderers
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PortalRenderData {
    /// Rotation of portal transform, radians
    pub rotation: f32,
    /// Bottom center of portal opening
    pub position: Vec3,
    /// Unit quad (x along wall, y along normal, z up) to portal opening transform
    pub local_to_world: Mat4,
    /// Destination frame to source frame transform, view matrices are multiplied by it
    pub destination_to_source: Mat4,
} // struct PortalRenderData

impl PortalRenderData {
    /// Render data computing function
    /// * Returns None for solid walls
    pub(crate) fn compute(map: &MapSectors, wall_id: WallId) -> Option<Self> {
        let wall = map.wall(wall_id);
        let portal = wall.portal?;
        let source = map.sector(wall.sector);
        let destination = map.sector(portal.sector);

        let bottom = source.floor.max(destination.floor);
        let top = source.ceiling.min(destination.ceiling).max(bottom);
        let transform = portal.transform();

        Some(Self {
            rotation: affine2_angle(&transform),
            position: wall.midpoint().extend(bottom),
            local_to_world: Mat4::from_cols(
                (wall.end - wall.start).extend(0.0).extend(0.0),
                wall.normal.extend(0.0).extend(0.0),
                Vec4::new(0.0, 0.0, top - bottom, 0.0),
                wall.start.extend(bottom).extend(1.0),
            ),
            destination_to_source: affine2_to_mat4(&transform.inverse()),
        })
    } // fn compute
} // impl PortalRenderData

/// Camera matrices for rendering through a portal
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PortalProjection {
    /// View matrix of destination frame
    pub view: Mat4,
    /// Projection with near plane moved onto the destination wall
    pub projection: Mat4,
} // struct PortalProjection

/// Oblique near plane projection building function (OpenGL clip space)
/// * `projection` - source projection
/// * `plane` - camera space clip plane, camera on the negative side
/// * Returns projection whose near plane is `plane`
fn oblique_projection(projection: &Mat4, plane: Vec4) -> Mat4 {
    let corner = projection.inverse() * Vec4::new(plane.x.signum(), plane.y.signum(), 1.0, 1.0);
    let scaled = plane * (2.0 / plane.dot(corner));

    let mut rows = projection.transpose();
    rows.z_axis = scaled - rows.w_axis;
    rows.transpose()
} // fn oblique_projection

impl MapSectors {
    /// Portal to portal camera computing function
    /// * `wall` - portal wall, seen from its own sector
    /// * `view` - source frame view matrix (right handed, camera looks at -Z)
    /// * `projection` - OpenGL style projection matrix
    /// * Returns view and projection for destination sector rendering or None if wall is not a portal
    pub fn calculate_portal_to_portal_projection(&self, wall: WallId, view: &Mat4, projection: &Mat4) -> Option<PortalProjection> {
        let portal = self.try_wall(wall)?.portal?;
        let render_data = self.portal_render_data(wall)?;
        let twin = self.wall(portal.wall);

        let virtual_view = *view * render_data.destination_to_source;

        // Twin wall plane, destination sector on the positive side
        let world_plane = twin.normal.extend(0.0).extend(-twin.normal.dot(twin.start));
        let camera_plane = virtual_view.inverse().transpose() * world_plane;

        // Camera in front of the destination wall, oblique clipping would cut the visible part
        if camera_plane.w >= 0.0 {
            return Some(PortalProjection { view: virtual_view, projection: *projection });
        }

        Some(PortalProjection {
            view: virtual_view,
            projection: oblique_projection(projection, camera_plane),
        })
    } // fn calculate_portal_to_portal_projection
} // impl MapSectors

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{SectorId, WallRelId};
    use crate::test_maps;

    fn ndc(projection: &PortalProjection, point: Vec3) -> Vec3 {
        let clip = projection.projection * projection.view * point.extend(1.0);
        clip.truncate() / clip.w
    }

    fn camera(eye: Vec3, direction: Vec3) -> (Mat4, Mat4) {
        (
            Mat4::look_at_rh(eye, eye + direction, Vec3::Z),
            Mat4::perspective_rh_gl(1.5, 1.0, 0.1, 100.0),
        )
    }

    #[test]
    fn transform_glues_walls_face_to_face() {
        let transform = non_euclidean_transform(
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(24.0, 20.0),
        );

        assert!((transform.transform_point2(Vec2::new(4.0, 0.0)) - Vec2::new(24.0, 20.0)).length() < 1e-4);
        assert!((transform.transform_point2(Vec2::new(4.0, 4.0)) - Vec2::new(20.0, 20.0)).length() < 1e-4);
        // Points in front of source wall are behind destination wall
        let behind = transform.transform_point2(Vec2::new(3.0, 2.0));
        assert!(behind.y < 20.0);
    }

    #[test]
    fn render_data_of_portals_only() {
        let map = test_maps::two_rooms();
        let portal = map.wall_id(SectorId::new(0), WallRelId(1));
        let solid = map.wall_id(SectorId::new(0), WallRelId(0));

        assert!(map.portal_render_data(solid).is_none());

        let data = map.portal_render_data(portal).unwrap();
        assert_eq!(data.rotation, 0.0);
        assert!((data.position - Vec3::new(4.0, 2.0, 0.0)).length() < 1e-5);
        assert!((data.local_to_world.transform_point3(Vec3::new(1.0, 0.0, 1.0)) - Vec3::new(4.0, 4.0, 3.0)).length() < 1e-5);
        assert_eq!(data.destination_to_source, Mat4::IDENTITY);
    }

    #[test]
    fn solid_wall_has_no_projection() {
        let map = test_maps::two_rooms();
        let (view, projection) = camera(Vec3::new(2.0, 2.0, 1.0), Vec3::X);

        assert!(map
            .calculate_portal_to_portal_projection(map.wall_id(SectorId::new(0), WallRelId(0)), &view, &projection)
            .is_none());
    }

    #[test]
    fn near_plane_lies_on_destination_wall() {
        let map = test_maps::two_rooms();
        let wall = map.wall_id(SectorId::new(0), WallRelId(1));
        let (view, projection) = camera(Vec3::new(2.0, 1.5, 1.0), Vec3::new(1.0, 0.2, 0.0).normalize());

        let result = map.calculate_portal_to_portal_projection(wall, &view, &projection).unwrap();

        for point in [Vec3::new(4.0, 1.0, 0.5), Vec3::new(4.0, 2.5, 2.0), Vec3::new(4.0, 2.0, 1.2)] {
            assert!((ndc(&result, point).z + 1.0).abs() < 1e-3, "point {point}");
        }

        // Content behind the wall stays inside clip volume
        let beyond = ndc(&result, Vec3::new(6.0, 2.0, 1.0));
        assert!(beyond.z > -1.0 && beyond.z < 1.0);
    }

    #[test]
    fn non_euclidean_view_matches_source_view() {
        let map = test_maps::nc_pair();
        let (wall, source_wall, portal) = map.sector_portals(SectorId::new(0)).next().unwrap();
        let (view, projection) = camera(Vec3::new(2.0, 2.0, 1.0), Vec3::X);

        let result = map.calculate_portal_to_portal_projection(wall, &view, &projection).unwrap();
        let transform = portal.transform();

        // Same point expressed in both frames lands on the same camera space position
        let source_point = source_wall.midpoint().extend(1.5) + Vec3::new(-0.5, 0.0, 0.0);
        let destination_point = transform_point3(&transform, source_point);

        let expected = view.transform_point3(source_point);
        let actual = result.view.transform_point3(destination_point);
        assert!((expected - actual).length() < 1e-4);

        // Destination wall is the near plane
        let twin = map.wall(portal.wall);
        assert!((ndc(&result, twin.midpoint().extend(1.0)).z + 1.0).abs() < 1e-3);
    }
}

// file map/portal.rs
