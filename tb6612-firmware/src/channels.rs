//! Inter-task communication channels
//!
//! One command signal per motor channel. A signal holds only the latest
//! value, so a command sent while the motor task is busy replaces any
//! command still waiting.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use tb6612_core::config::ChannelId;

/// Command for one motor channel
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum MotorCommand {
    /// Jump to a signed speed, braking at zero
    Drive(f32),
    /// Ramp to a signed speed, `None` uses the channel's configured delay
    Ramp {
        target: f32,
        step_delay_ms: Option<u32>,
    },
    /// Both inputs high
    Brake,
    /// Both inputs low
    Coast,
    /// Release STBY
    Enable,
    /// Brake, then assert STBY
    Disable,
}

/// Signal carrying commands for one channel
pub type MotorSignal = Signal<CriticalSectionRawMutex, MotorCommand>;

/// Commands for channel A
pub static CHANNEL_A_CMD: MotorSignal = Signal::new();

/// Commands for channel B
pub static CHANNEL_B_CMD: MotorSignal = Signal::new();

/// Command signal of a channel
pub fn commands(channel: ChannelId) -> &'static MotorSignal {
    match channel {
        ChannelId::A => &CHANNEL_A_CMD,
        ChannelId::B => &CHANNEL_B_CMD,
    }
}
