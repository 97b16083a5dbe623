//! GPIO lookup by number
//!
//! Pin numbers in the board description are plain integers, while embassy
//! hands out one typed field per GPIO. These helpers bridge the two.

use crate::pwm::SliceChannel;

/// Take a GPIO by number from peripherals as an untyped pin
///
/// Usage:
/// ```ignore
/// let ain1 = Output::new(take_pin!(p, 7), Level::Low);
/// ```
#[macro_export]
macro_rules! take_pin {
    ($p:expr, 0) => { $p.PIN_0.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 1) => { $p.PIN_1.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 2) => { $p.PIN_2.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 3) => { $p.PIN_3.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 4) => { $p.PIN_4.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 5) => { $p.PIN_5.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 6) => { $p.PIN_6.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 7) => { $p.PIN_7.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 8) => { $p.PIN_8.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 9) => { $p.PIN_9.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 10) => { $p.PIN_10.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 11) => { $p.PIN_11.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 12) => { $p.PIN_12.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 13) => { $p.PIN_13.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 14) => { $p.PIN_14.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 15) => { $p.PIN_15.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 16) => { $p.PIN_16.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 17) => { $p.PIN_17.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 18) => { $p.PIN_18.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 19) => { $p.PIN_19.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 20) => { $p.PIN_20.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 21) => { $p.PIN_21.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 22) => { $p.PIN_22.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 23) => { $p.PIN_23.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 24) => { $p.PIN_24.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 25) => { $p.PIN_25.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 26) => { $p.PIN_26.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 27) => { $p.PIN_27.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 28) => { $p.PIN_28.into::<embassy_rp::gpio::AnyPin>() };
    ($p:expr, 29) => { $p.PIN_29.into::<embassy_rp::gpio::AnyPin>() };
}

/// PWM slice driving a GPIO
///
/// GPIO pairs 0/1 to 14/15 map to slices 0 to 7, then the mapping repeats
/// from GPIO 16.
pub const fn pwm_slice(gpio: u8) -> u8 {
    (gpio >> 1) & 0x7
}

/// Slice output driving a GPIO
pub const fn pwm_channel(gpio: u8) -> SliceChannel {
    if gpio & 1 == 0 {
        SliceChannel::A
    } else {
        SliceChannel::B
    }
}
