//! Configuration types
//!
//! Board-agnostic configuration structures. With the `serde` feature they
//! can be deserialized from a TOML description of the wiring.

pub mod channel;

pub use channel::*;
