//! Motor channel tasks
//!
//! Each channel runs its own task that executes commands from its signal.
//! A command arriving mid-ramp cancels the ramp; the motor holds the last
//! applied step until the new command runs.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::Delay;
use embedded_hal::digital::OutputPin;

use tb6612_core::config::ChannelId;
use tb6612_core::ramp::RampOutcome;
use tb6612_core::traits::AsyncStatusSink;
use tb6612_drivers::motor::MotorChannel;
use tb6612_hal_rp2040::SlicePwm;

use crate::channels::{MotorCommand, MotorSignal};

/// Channel A, which owns STBY
pub type ChannelA =
    MotorChannel<Output<'static>, Output<'static>, SlicePwm<'static>, Output<'static>>;

/// Channel B
pub type ChannelB = MotorChannel<Output<'static>, Output<'static>, SlicePwm<'static>>;

/// Logs every ramp step
struct StepLog {
    channel: ChannelId,
}

impl AsyncStatusSink for StepLog {
    async fn notify(&mut self, speed: i16) {
        trace!("Channel {} step {}", self.channel, speed);
    }
}

#[embassy_executor::task]
pub async fn channel_a_task(motor: ChannelA, commands: &'static MotorSignal) {
    run_channel(ChannelId::A, motor, commands).await
}

#[embassy_executor::task]
pub async fn channel_b_task(motor: ChannelB, commands: &'static MotorSignal) {
    run_channel(ChannelId::B, motor, commands).await
}

async fn run_channel<S: OutputPin>(
    id: ChannelId,
    mut motor: MotorChannel<Output<'static>, Output<'static>, SlicePwm<'static>, S>,
    commands: &'static MotorSignal,
) -> ! {
    info!("Channel {} task started", id);

    let mut delay = Delay;
    let mut pending: Option<MotorCommand> = None;

    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => commands.wait().await,
        };
        debug!("Channel {}: {}", id, command);

        let result = match command {
            MotorCommand::Drive(speed) => motor.drive(speed, true),
            MotorCommand::Brake => motor.brake(),
            MotorCommand::Coast => motor.coast(),
            MotorCommand::Enable => motor.enable(),
            MotorCommand::Disable => motor.disable(true),
            MotorCommand::Ramp {
                target,
                step_delay_ms: delay_ms,
            } => {
                let mut log = StepLog { channel: id };
                let step_delay_ms = delay_ms.unwrap_or(motor.step_delay_ms());
                let ramp = motor.safe_drive_async_with_status(
                    target,
                    step_delay_ms,
                    &mut delay,
                    &mut log,
                );

                let finished = select(ramp, commands.wait()).await;
                match finished {
                    Either::First(Ok(RampOutcome::Completed)) => {
                        debug!("Channel {} reached {}", id, motor.speed());
                        Ok(())
                    }
                    Either::First(Ok(RampOutcome::Superseded)) => Ok(()),
                    Either::First(Err(e)) => Err(e),
                    Either::Second(newer) => {
                        debug!("Channel {} ramp interrupted at {}", id, motor.speed());
                        pending = Some(newer);
                        Ok(())
                    }
                }
            }
        };

        if let Err(e) = result {
            error!("Channel {} command failed: {}", id, e);
        }
    }
}
