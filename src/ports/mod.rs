//! Ports - Trait definitions the application layer depends on.

pub mod analysis;
pub mod cache;
pub mod capabilities;
pub mod video;
