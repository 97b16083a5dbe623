//! Motor channel traits and shared types

use embedded_hal::pwm::ErrorType;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logical rotation direction of a motor channel
///
/// This is the direction before pin reversal is applied, so `Forward`
/// always means "positive speed" from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Positive speed
    Forward,
    /// Negative speed
    Reverse,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Direction of a signed speed, `None` for zero
    pub fn of(speed: f32) -> Option<Self> {
        if speed > 0.0 {
            Some(Direction::Forward)
        } else if speed < 0.0 {
            Some(Direction::Reverse)
        } else {
            None
        }
    }

    /// Apply a magnitude to get a signed speed
    pub fn signed(self, magnitude: f32) -> f32 {
        match self {
            Direction::Forward => magnitude,
            Direction::Reverse => -magnitude,
        }
    }
}

/// Errors that can occur with motor channel operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Writing a direction input (IN1/IN2) failed
    DirectionPin,
    /// Writing the PWM duty cycle failed
    Pwm,
    /// Writing the standby input failed
    Standby,
    /// PWM frequency is zero or cannot be generated by the peripheral
    InvalidFrequency,
    /// Channel was built without a standby pin
    NoStandby,
}

/// PWM output whose switching frequency can be configured
///
/// `embedded_hal::pwm::SetDutyCycle` covers the duty cycle but not the
/// frequency, which is set once when a motor channel is constructed.
/// Implementations may change `max_duty_cycle()` as a side effect, so the
/// frequency must be applied before any duty is computed.
pub trait PwmFrequency: ErrorType {
    /// Set the PWM switching frequency in Hz
    fn set_frequency_hz(&mut self, hz: u32) -> Result<(), Self::Error>;
}
