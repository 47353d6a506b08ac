/// WEIRD Project
/// `File` test_maps.rs
/// `Description` Hand-built maps shared by unit tests
/// `Author` TioT2
/// `Last changed` 16.10.2026

use crate::map::{MapBuilder, MapSectors};
use crate::math::Vec2;

/// Counter-clockwise square starting at its lower left corner
pub fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(x, y),
        Vec2::new(x + size, y),
        Vec2::new(x + size, y + size),
        Vec2::new(x, y + size),
    ]
}

/// Two 4x4 rooms, [0; 4] x [0; 4] and [4; 8] x [0; 4], floor 0, ceiling 3
pub fn two_rooms() -> MapSectors {
    let mut builder = MapBuilder::new();
    builder.add_sector(&square(0.0, 0.0, 4.0), 0.0, 3.0);
    builder.add_sector(&square(4.0, 0.0, 4.0), 0.0, 3.0);
    builder.build().unwrap()
}

/// Room [0; 4] x [0; 4] with a doorway (x = 4, y in [0; 2]) into room [4; 8] x [0; 2].
/// Point (4, 2) is a solid jamb corner of the first room.
pub fn doorway() -> MapSectors {
    let mut builder = MapBuilder::new();
    builder.add_sector(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
        Vec2::new(4.0, 2.0),
        Vec2::new(4.0, 4.0),
        Vec2::new(0.0, 4.0),
    ], 0.0, 3.0);
    builder.add_sector(&[
        Vec2::new(4.0, 0.0),
        Vec2::new(8.0, 0.0),
        Vec2::new(8.0, 2.0),
        Vec2::new(4.0, 2.0),
    ], 0.0, 3.0);
    builder.build().unwrap()
}

/// Four 4x4 rooms along X with floors 0, 0.25, 0.5 and 2, ceiling 4
pub fn corridor() -> MapSectors {
    let mut builder = MapBuilder::new();
    for (index, floor) in [0.0, 0.25, 0.5, 2.0].into_iter().enumerate() {
        builder.add_sector(&square(index as f32 * 4.0, 0.0, 4.0), floor, 4.0);
    }
    builder.build().unwrap()
}

/// Room A with a narrow portal (x = 4, y in [3; 4]) to room B, room C is below B
pub fn occluded() -> MapSectors {
    let mut builder = MapBuilder::new();
    builder.add_sector(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(3.0, 0.0),
        Vec2::new(4.0, 3.0),
        Vec2::new(4.0, 4.0),
        Vec2::new(0.0, 4.0),
    ], 0.0, 3.0);
    builder.add_sector(&[
        Vec2::new(4.0, 0.0),
        Vec2::new(8.0, 0.0),
        Vec2::new(8.0, 4.0),
        Vec2::new(4.0, 4.0),
        Vec2::new(4.0, 3.0),
    ], 0.0, 3.0);
    builder.add_sector(&square(4.0, -4.0, 4.0), 0.0, 3.0);
    builder.build().unwrap()
}

/// Single 4x4 room whose east wall leads to its own west wall (infinite corridor)
pub fn nc_loop() -> MapSectors {
    let mut builder = MapBuilder::new();
    builder.add_sector(&square(0.0, 0.0, 4.0), 0.0, 3.0);
    builder.link_portal_two_way(0, 1, 0, 3);
    builder.build().unwrap()
}

/// Room [0; 4] x [0; 4] whose east wall is glued to south wall of room [20; 24] x [20; 24]
pub fn nc_pair() -> MapSectors {
    let mut builder = MapBuilder::new();
    builder.add_sector(&square(0.0, 0.0, 4.0), 0.0, 3.0);
    builder.add_sector(&square(20.0, 20.0, 4.0), 0.0, 3.0);
    builder.link_portal_two_way(0, 1, 1, 0);
    builder.build().unwrap()
}

/// Same as `nc_pair`, but the portal leads from the first room only
pub fn one_way() -> MapSectors {
    let mut builder = MapBuilder::new();
    builder.add_sector(&square(0.0, 0.0, 4.0), 0.0, 3.0);
    builder.add_sector(&square(20.0, 20.0, 4.0), 0.0, 3.0);
    builder.link_portal(0, 1, 1, 0);
    builder.build().unwrap()
}

// file test_maps.rs
