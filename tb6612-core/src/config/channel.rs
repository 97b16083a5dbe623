//! Motor channel configuration types
//!
//! A TB6612 has two channels (A and B) and one standby input shared by both.
//! The standby pin is owned by channel A when both channels are configured,
//! since a pin handle can only have one owner.

use crate::ramp::DEFAULT_STEP_DELAY_MS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default PWM frequency in Hz (above the audible range)
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 20_000;

/// Highest GPIO number accepted in a pin assignment (RP2040 has GPIO0-29)
pub const MAX_GPIO: u8 = 29;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// PWM frequency of zero
    ZeroFrequency,
    /// The same GPIO is assigned to two roles
    PinConflict(u8),
    /// GPIO number above [`MAX_GPIO`]
    PinOutOfRange(u8),
    /// Neither channel is configured
    NoChannels,
}

/// Runtime behavior of one motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelConfig {
    /// Swap forward and reverse (motor wired the other way round)
    pub reversed: bool,
    /// PWM switching frequency in Hz
    pub pwm_frequency_hz: u32,
    /// Delay between ramp steps in ms used by `MotorChannel::ramp_to`
    pub step_delay_ms: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reversed: false,
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
        }
    }
}

impl ChannelConfig {
    /// Check the configuration for values the hardware cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pwm_frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        Ok(())
    }
}

/// GPIO assignment of one motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelPins {
    /// Direction input 1 (AIN1/BIN1)
    pub pin_a: u8,
    /// Direction input 2 (AIN2/BIN2)
    pub pin_b: u8,
    /// Speed input (PWMA/PWMB)
    pub pwm: u8,
}

impl ChannelPins {
    /// Create a pin assignment
    pub const fn new(pin_a: u8, pin_b: u8, pwm: u8) -> Self {
        Self { pin_a, pin_b, pwm }
    }

    /// All pins of this channel
    pub fn pins(&self) -> [u8; 3] {
        [self.pin_a, self.pin_b, self.pwm]
    }

    /// Check the pins are in range and distinct
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_pins(&self.pins())
    }
}

/// One channel section of a driver description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelSection {
    /// GPIO assignment
    pub pins: ChannelPins,
    /// Runtime behavior
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: ChannelConfig,
}

/// Full description of one TB6612 chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// Standby input, `None` when tied high or driven elsewhere
    #[cfg_attr(feature = "serde", serde(default))]
    pub standby: Option<u8>,
    /// Channel A (AIN1/AIN2/PWMA)
    #[cfg_attr(feature = "serde", serde(default))]
    pub channel_a: Option<ChannelSection>,
    /// Channel B (BIN1/BIN2/PWMB)
    #[cfg_attr(feature = "serde", serde(default))]
    pub channel_b: Option<ChannelSection>,
}

impl DriverConfig {
    /// Validate both channels and check no GPIO is used twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_a.is_none() && self.channel_b.is_none() {
            return Err(ConfigError::NoChannels);
        }

        // standby + 3 pins per channel
        let mut pins = [None; 7];
        pins[0] = self.standby;
        for (slot, section) in [self.channel_a, self.channel_b].iter().enumerate() {
            if let Some(section) = section {
                section.config.validate()?;
                for (i, pin) in section.pins.pins().iter().enumerate() {
                    pins[1 + slot * 3 + i] = Some(*pin);
                }
            }
        }

        let mut used = [0u8; 7];
        let mut count = 0;
        for pin in pins.iter().flatten() {
            used[count] = *pin;
            count += 1;
        }
        check_pins(&used[..count])
    }

    /// Which channel owns the standby pin
    ///
    /// Channel A when present, otherwise channel B.
    pub fn standby_owner(&self) -> Option<ChannelId> {
        self.standby?;
        if self.channel_a.is_some() {
            Some(ChannelId::A)
        } else if self.channel_b.is_some() {
            Some(ChannelId::B)
        } else {
            None
        }
    }
}

/// Channel of a TB6612
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelId {
    A,
    B,
}

fn check_pins(pins: &[u8]) -> Result<(), ConfigError> {
    for (i, pin) in pins.iter().enumerate() {
        if *pin > MAX_GPIO {
            return Err(ConfigError::PinOutOfRange(*pin));
        }
        if pins[i + 1..].contains(pin) {
            return Err(ConfigError::PinConflict(*pin));
        }
    }
    Ok(())
}
