/// WEIRD Project
/// `File` viewer/mod.rs
/// `Description` Software renderer viewer
/// `Author` TioT2
/// `Last changed` 16.10.2026

pub mod camera;
pub mod input;
pub mod render;
pub mod surface;
pub mod timer;

// file viewer/mod.rs
