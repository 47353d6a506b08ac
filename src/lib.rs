/// WEIRD Project
/// `File` lib.rs
/// `Description` Non-euclidean sector map core: building, visibility, physics and path finding
/// `Author` TioT2
/// `Last changed` 16.10.2026

pub mod math;
pub mod geom;
pub mod grid;
pub mod map;
pub mod visibility;
pub mod entity;
pub mod physics;
pub mod path;
pub mod util;

#[cfg(test)]
mod test_maps;

// file lib.rs
