//! H-bridge input patterns
//!
//! # TB6612FNG Truth Table (STBY high)
//!
//! | IN1 | IN2 | PWM | Motor State                    |
//! |-----|-----|-----|--------------------------------|
//! | H   | L   | H   | Forward (CW)                   |
//! | L   | H   | H   | Reverse (CCW)                  |
//! | H   | H   | x   | Short brake                    |
//! | L   | L   | x   | Stop (high impedance, coast)   |
//!
//! Brake and coast are both issued with a zero duty cycle.

use crate::speed::{clamp_speed, magnitude};

/// Input pattern applied to IN1/IN2, as seen at the pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeMode {
    /// IN1 high, IN2 low
    Forward,
    /// IN1 low, IN2 high
    Reverse,
    /// Both inputs high: windings shorted
    Brake,
    /// Both inputs low: motor freewheels
    Coast,
}

impl BridgeMode {
    /// Pin levels as `(in1, in2)`, `true` meaning high
    pub fn pin_levels(self) -> (bool, bool) {
        match self {
            BridgeMode::Forward => (true, false),
            BridgeMode::Reverse => (false, true),
            BridgeMode::Brake => (true, true),
            BridgeMode::Coast => (false, false),
        }
    }

    /// Check if this pattern drives the motor
    pub fn is_driving(self) -> bool {
        matches!(self, BridgeMode::Forward | BridgeMode::Reverse)
    }
}

/// Resolved output for one bridge half
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeOutput {
    /// Input pattern for IN1/IN2
    pub mode: BridgeMode,
    /// Duty magnitude in percent (0-100)
    pub percent: f32,
    /// Clamped signed speed that produced this output
    pub speed: f32,
}

/// Resolve a speed command into a bridge pattern
///
/// `speed` is clamped to [-100, 100]. Zero brakes when `auto_brake` is set
/// and coasts otherwise. `reversed` swaps the forward/reverse patterns to
/// compensate for a motor wired the other way round.
pub fn resolve(speed: f32, auto_brake: bool, reversed: bool) -> BridgeOutput {
    let speed = clamp_speed(speed);

    if speed == 0.0 {
        let mode = if auto_brake {
            BridgeMode::Brake
        } else {
            BridgeMode::Coast
        };
        return BridgeOutput {
            mode,
            percent: 0.0,
            speed: 0.0,
        };
    }

    let forward = (speed > 0.0) != reversed;
    BridgeOutput {
        mode: if forward {
            BridgeMode::Forward
        } else {
            BridgeMode::Reverse
        },
        percent: magnitude(speed),
        speed,
    }
}
