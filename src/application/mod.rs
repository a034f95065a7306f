//! Application layer - Services that drive the ports.

pub mod analyzer;
pub mod orchestrator;
