//! Bridge state resolution
//!
//! Maps a speed command to the input pattern of one H-bridge half.
//! The mapping is pure and deterministic; applying it to real pins is the
//! driver's job.

pub mod bridge;

pub use bridge::{resolve, BridgeMode, BridgeOutput};
