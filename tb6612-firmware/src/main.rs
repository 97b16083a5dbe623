//! TB6612 - Dual motor demo firmware
//!
//! Brings up both channels of a TB6612FNG from the board description in
//! motor.toml and runs a demo sequence on them. Channel A owns the shared
//! STBY pin.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use {defmt_rtt as _, panic_probe as _};

use tb6612_drivers::motor::MotorChannel;
use tb6612_hal_rp2040::SlicePwm;

mod channels;
mod tasks;

// STANDBY_PIN, CHANNEL_A, CHANNEL_B and their hardware macros
include!(concat!(env!("OUT_DIR"), "/board.rs"));

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("TB6612 firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let (ain1, ain2, pwma, output_a) = channel_a_hardware!(p);
    let (bin1, bin2, pwmb, output_b) = channel_b_hardware!(p);
    let stby = Output::new(standby_pin!(p), Level::Low);

    let channel_a: tasks::ChannelA = match MotorChannel::with_standby(
        Output::new(ain1, Level::Low),
        Output::new(ain2, Level::Low),
        SlicePwm::new(pwma, output_a, Default::default()),
        stby,
        &CHANNEL_A.config,
    ) {
        Ok(channel) => channel,
        Err(e) => halt("A", e),
    };
    info!(
        "Channel A ready: pins {}, STBY on GPIO{}",
        CHANNEL_A.pins,
        STANDBY_PIN
    );

    let channel_b: tasks::ChannelB = match MotorChannel::new(
        Output::new(bin1, Level::Low),
        Output::new(bin2, Level::Low),
        SlicePwm::new(pwmb, output_b, Default::default()),
        &CHANNEL_B.config,
    ) {
        Ok(channel) => channel,
        Err(e) => halt("B", e),
    };
    info!("Channel B ready: pins {}", CHANNEL_B.pins);

    spawner
        .spawn(tasks::channel_a_task(channel_a, &channels::CHANNEL_A_CMD))
        .unwrap();
    spawner
        .spawn(tasks::channel_b_task(channel_b, &channels::CHANNEL_B_CMD))
        .unwrap();
    spawner.spawn(tasks::sequence_task()).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Stop here when a channel cannot be brought up
fn halt(channel: &str, error: tb6612_core::traits::MotorError) -> ! {
    error!("Channel {} init failed: {}", channel, error);
    loop {
        cortex_m::asm::wfi();
    }
}
