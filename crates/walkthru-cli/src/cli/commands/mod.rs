//! CLI command handlers.

pub mod camera;
pub mod config;
pub mod demo;
pub mod diff;
pub mod play;
