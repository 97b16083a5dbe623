//! Motor driver implementations
//!
//! - [`channel`]: TB6612 channel with direct drive, brake/coast and ramps
//! - [`shared`]: mutex-wrapped channel where newer commands supersede ramps

pub mod channel;
pub mod shared;

pub use channel::{MotorChannel, NoStandby};
pub use shared::SharedMotorChannel;
