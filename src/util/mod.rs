/// WEIRD Project
/// `File` util/mod.rs
/// `Description` Utility module
/// `Author` TioT2
/// `Last changed` 16.10.2026

pub mod unordered_pair;

// file util/mod.rs
