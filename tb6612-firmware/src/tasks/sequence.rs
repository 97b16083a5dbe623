//! Demo sequence
//!
//! Cycles both channels through ramps, direct drive, brake, coast and
//! standby so a freshly wired board can be checked by eye. The second
//! ramp is sent before the first one finishes.

use defmt::*;
use embassy_time::Timer;

use tb6612_core::config::ChannelId;

use crate::channels::{commands, MotorCommand};

/// One entry of the demo
struct Step {
    a: Option<MotorCommand>,
    b: Option<MotorCommand>,
    /// Time to wait before the next step
    hold_ms: u64,
}

const fn both(command: MotorCommand, hold_ms: u64) -> Step {
    Step {
        a: Some(command),
        b: Some(command),
        hold_ms,
    }
}

const fn ramp(target: f32) -> MotorCommand {
    MotorCommand::Ramp {
        target,
        step_delay_ms: None,
    }
}

const SEQUENCE: &[Step] = &[
    both(ramp(80.0), 8000),
    // Interrupts the reversal halfway
    both(ramp(-60.0), 4000),
    both(ramp(0.0), 6000),
    Step {
        a: Some(MotorCommand::Drive(30.0)),
        b: Some(MotorCommand::Drive(-30.0)),
        hold_ms: 2000,
    },
    both(MotorCommand::Brake, 1000),
    both(MotorCommand::Drive(50.0), 2000),
    both(MotorCommand::Coast, 2000),
    Step {
        a: Some(MotorCommand::Disable),
        b: None,
        hold_ms: 1000,
    },
    Step {
        a: Some(MotorCommand::Enable),
        b: None,
        hold_ms: 1000,
    },
];

/// Demo sequence task
#[embassy_executor::task]
pub async fn sequence_task() {
    info!("Sequence task started");

    loop {
        for (i, step) in SEQUENCE.iter().enumerate() {
            debug!("Sequence step {}", i);
            if let Some(command) = step.a {
                commands(ChannelId::A).signal(command);
            }
            if let Some(command) = step.b {
                commands(ChannelId::B).signal(command);
            }
            Timer::after_millis(step.hold_ms).await;
        }
    }
}
