//! RP2040-specific HAL for the TB6612 motor driver
//!
//! - [`pwm`]: one PWM slice output as a TB6612 speed input, with runtime
//!   frequency control
//! - [`pins`]: GPIO lookup by number for config-driven pin assignment

#![no_std]

pub mod pins;
pub mod pwm;

pub use pwm::{SliceChannel, SlicePwm, SlicePwmError};
