//! Board-agnostic core logic for TB6612-class motor channels
//!
//! This crate contains all motor channel logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (PWM frequency, status sinks)
//! - Bridge state resolution (forward, reverse, brake, coast)
//! - Speed clamping and duty-cycle mapping
//! - Ramp generation and supersession tokens
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod ramp;
pub mod speed;
pub mod state;
pub mod traits;
