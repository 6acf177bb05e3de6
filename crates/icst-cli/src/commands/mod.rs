//! CLI command implementations.

pub mod common;
pub mod config;
pub mod lpc;
pub mod pitch;
pub mod render;
