//! Adapters - Concrete implementations of ports.

pub mod command;
pub mod ffmpeg;
pub mod fs;

#[cfg(feature = "server")]
pub mod http;
