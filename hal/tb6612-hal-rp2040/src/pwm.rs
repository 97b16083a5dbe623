//! PWM slice output for a TB6612 speed input
//!
//! Each RP2040 PWM slice has one counter and two compare outputs (A and B).
//! [`SlicePwm`] owns a whole slice and drives one of its outputs, so the
//! switching frequency can be changed without disturbing another channel.
//!
//! The output frequency is:
//!
//! freq = SYS_CLK / (divider * (top + 1))
//!
//! [`calc_pwm_timing`] picks the smallest integer divider that fits `top`
//! into 16 bits, which keeps the duty resolution as high as possible.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};

use tb6612_core::traits::PwmFrequency;

/// Largest integer clock divider
pub const MAX_DIVIDER: u32 = 255;

/// Smallest usable counter top (1% duty resolution)
pub const MIN_TOP: u16 = 99;

/// Output of a PWM slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SliceChannel {
    /// Even GPIO of the slice
    A,
    /// Odd GPIO of the slice
    B,
}

/// PWM errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlicePwmError {
    /// Frequency is zero or outside what the divider and counter can reach
    UnreachableFrequency(u32),
}

impl embedded_hal::pwm::Error for SlicePwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Divider and counter top for a PWM frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTiming {
    /// Integer clock divider (1-255)
    pub divider: u8,
    /// Counter wrap value
    pub top: u16,
}

/// Calculate divider and top for `freq_hz` from a `clk_hz` system clock
///
/// Returns `None` when the frequency is zero, too low for the largest
/// divider, or too high to leave [`MIN_TOP`] counts per period.
pub fn calc_pwm_timing(clk_hz: u32, freq_hz: u32) -> Option<PwmTiming> {
    if freq_hz == 0 {
        return None;
    }

    // cycles = divider * (top + 1)
    let cycles = clk_hz / freq_hz;
    let divider = cycles.div_ceil(1 << 16).max(1);
    if divider > MAX_DIVIDER {
        return None;
    }

    let period = cycles / divider;
    if period <= MIN_TOP as u32 {
        return None;
    }

    Some(PwmTiming {
        divider: divider as u8,
        top: (period - 1) as u16,
    })
}

/// Compare value for 100% duty with counter wrap `top`
///
/// The output is high while the counter is below the compare value, so
/// `top + 1` keeps it high for the whole period. At `top == u16::MAX` that
/// value does not fit and full duty is one count short.
pub fn full_duty(top: u16) -> u16 {
    top.saturating_add(1)
}

/// One output of an RP2040 PWM slice
pub struct SlicePwm<'d> {
    pwm: Pwm<'d>,
    config: PwmConfig,
    channel: SliceChannel,
}

impl<'d> SlicePwm<'d> {
    /// Take over a slice, starting at zero duty
    ///
    /// The frequency is left at whatever `config` sets until
    /// [`set_frequency_hz`](PwmFrequency::set_frequency_hz) is called.
    pub fn new(mut pwm: Pwm<'d>, channel: SliceChannel, mut config: PwmConfig) -> Self {
        config.compare_a = 0;
        config.compare_b = 0;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            channel,
        }
    }

    /// Output this wrapper drives
    pub fn channel(&self) -> SliceChannel {
        self.channel
    }

    /// Current compare value
    pub fn duty(&self) -> u16 {
        match self.channel {
            SliceChannel::A => self.config.compare_a,
            SliceChannel::B => self.config.compare_b,
        }
    }

    /// Give back the slice
    pub fn release(self) -> Pwm<'d> {
        self.pwm
    }
}

impl ErrorType for SlicePwm<'_> {
    type Error = SlicePwmError;
}

impl SetDutyCycle for SlicePwm<'_> {
    fn max_duty_cycle(&self) -> u16 {
        full_duty(self.config.top)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let compare = duty.min(full_duty(self.config.top));
        match self.channel {
            SliceChannel::A => self.config.compare_a = compare,
            SliceChannel::B => self.config.compare_b = compare,
        }
        self.pwm.set_config(&self.config);
        Ok(())
    }
}

impl PwmFrequency for SlicePwm<'_> {
    /// Retune the slice, resetting the duty to zero
    fn set_frequency_hz(&mut self, hz: u32) -> Result<(), Self::Error> {
        let clk_hz = embassy_rp::clocks::clk_sys_freq();
        let timing =
            calc_pwm_timing(clk_hz, hz).ok_or(SlicePwmError::UnreachableFrequency(hz))?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "PWM {} Hz: divider={} top={}",
            hz,
            timing.divider,
            timing.top
        );

        self.config.divider = fixed::FixedU16::from_num(timing.divider);
        self.config.top = timing.top;
        self.config.compare_a = 0;
        self.config.compare_b = 0;
        self.pwm.set_config(&self.config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS_CLK_HZ: u32 = 125_000_000;

    #[test]
    fn test_timing_default_frequency() {
        // 125MHz / 20kHz = 6250 counts, no division needed
        let timing = calc_pwm_timing(SYS_CLK_HZ, 20_000).unwrap();
        assert_eq!(timing, PwmTiming { divider: 1, top: 6249 });
    }

    #[test]
    fn test_timing_low_frequency_uses_divider() {
        // 125000 counts do not fit 16 bits, so divide by 2
        let timing = calc_pwm_timing(SYS_CLK_HZ, 1000).unwrap();
        assert_eq!(timing, PwmTiming { divider: 2, top: 62499 });

        let timing = calc_pwm_timing(SYS_CLK_HZ, 100).unwrap();
        assert_eq!(timing.divider, 20);
        assert_eq!(timing.top, 62499);
    }

    #[test]
    fn test_full_duty_covers_whole_period() {
        assert_eq!(full_duty(6249), 6250);
        assert_eq!(full_duty(0), 1);
        assert_eq!(full_duty(u16::MAX), u16::MAX);
    }

    #[test]
    fn test_timing_out_of_range() {
        assert_eq!(calc_pwm_timing(SYS_CLK_HZ, 0), None);
        // Would need a divider above 255
        assert_eq!(calc_pwm_timing(SYS_CLK_HZ, 5), None);
        // Fewer than 100 counts per period
        assert_eq!(calc_pwm_timing(SYS_CLK_HZ, 2_000_000), None);
    }

    #[test]
    fn test_timing_reaches_frequency() {
        for freq in [8, 50, 500, 1000, 20_000, 100_000, 1_000_000] {
            let timing = calc_pwm_timing(SYS_CLK_HZ, freq).unwrap();
            let divider = timing.divider as u32;
            let cycles = divider * (timing.top as u32 + 1);
            // Flooring the period loses less than one divided count
            assert!(cycles <= SYS_CLK_HZ / freq);
            assert!(SYS_CLK_HZ / freq - cycles < divider, "{} Hz", freq);
        }
    }
}
