/// WEIRD Project
/// `File` geom/mod.rs
/// `Description` Geometry primitives module
/// `Author` TioT2
/// `Last changed` 16.10.2026

pub mod aabb;
pub mod frustum;
pub mod intersect;

pub use aabb::Aabb;
pub use frustum::{Frustum, FrustumBounds, FrustumBuffer};
pub use intersect::*;

// file geom/mod.rs
