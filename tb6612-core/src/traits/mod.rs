//! Hardware abstraction traits
//!
//! These traits define the interface between the motor channel logic
//! and hardware-specific implementations. Digital outputs, duty cycle and
//! delays come straight from `embedded-hal`; only what it does not cover
//! lives here.

pub mod motor;
pub mod status;

pub use motor::{Direction, MotorError, PwmFrequency};
pub use status::{AsyncStatusSink, NoStatus, StatusSink};
