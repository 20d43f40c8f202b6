//! DotTrack firefly builder library
//!
//! Fetches DotTrack race replays, caches them on disk, and turns them into the
//! per-team polylines the firefly animation draws.

pub mod build;
pub mod cache;
pub mod cli;
pub mod data;
pub mod firefly;
pub mod logging;

pub use build::{run_build, BuildError, BuildSummary};
