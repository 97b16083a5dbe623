//! TB6612 motor channel driver
//!
//! This driver provides:
//! - Signed speed control (-100..100) with clamping
//! - Brake and coast stop modes
//! - Pin reversal for motors wired the other way round
//! - Optional standby (STBY) control
//! - Speed ramping, blocking or cooperative
//!
//! # Usage
//!
//! ```ignore
//! let mut motor = MotorChannel::with_standby(ain1, ain2, pwma, stby, &ChannelConfig::default())?;
//!
//! motor.drive(60.0, true)?;                     // 60% forward
//! motor.safe_drive(-40.0, 20, &mut delay)?;     // ramp to 40% reverse, 20ms per step
//! motor.safe_drive_async(0.0, 70, &mut Delay).await?;
//! motor.brake()?;
//! ```
//!
//! A ramp steps the speed by one percent at a time, applying each step with
//! auto-brake enabled and then waiting `step_delay_ms`. Cancelling an async
//! ramp (dropping its future) leaves the motor at the last applied step.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use tb6612_core::config::ChannelConfig;
use tb6612_core::ramp::{Ramp, RampOutcome, RampTicket, RampToken};
use tb6612_core::speed::{clamp_speed, magnitude, percent_to_duty, round_speed};
use tb6612_core::state::{resolve, BridgeMode};
use tb6612_core::traits::{
    AsyncStatusSink, Direction, MotorError, NoStatus, PwmFrequency, StatusSink,
};

/// Standby placeholder for channels whose STBY line is handled elsewhere
///
/// Never written; a channel built with [`MotorChannel::new`] stores no
/// standby handle at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStandby;

impl ErrorType for NoStandby {
    type Error = Infallible;
}

impl OutputPin for NoStandby {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// One channel of a TB6612 dual H-bridge
///
/// Owns the two direction inputs, the PWM input and optionally the standby
/// input. All handles are moved in at construction and handed back by
/// [`release`](Self::release).
pub struct MotorChannel<A, B, P, S = NoStandby> {
    /// Direction input 1 (IN1)
    pin_a: A,
    /// Direction input 2 (IN2)
    pin_b: B,
    /// Speed input
    pwm: P,
    /// Standby input, if this channel owns it
    standby: Option<S>,
    /// Swap forward and reverse
    reversed: bool,
    /// Step delay used by `ramp_to`
    step_delay_ms: u32,
    /// Last commanded speed (-100..100)
    speed: f32,
    /// Last applied bridge pattern
    mode: BridgeMode,
    /// Last standby state written
    enabled: bool,
    /// In-flight ramp tracking
    ramp: RampToken,
}

impl<A, B, P> MotorChannel<A, B, P, NoStandby>
where
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle + PwmFrequency,
{
    /// Create a channel whose standby line is tied high or driven elsewhere
    ///
    /// The PWM frequency is applied, the duty set to zero and the motor
    /// braked.
    pub fn new(pin_a: A, pin_b: B, pwm: P, config: &ChannelConfig) -> Result<Self, MotorError> {
        Self::build(pin_a, pin_b, pwm, None, config)
    }
}

impl<A, B, P, S> MotorChannel<A, B, P, S>
where
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle + PwmFrequency,
    S: OutputPin,
{
    /// Create a channel that owns the standby pin
    ///
    /// The bridge is enabled right away so `drive` works immediately.
    pub fn with_standby(
        pin_a: A,
        pin_b: B,
        pwm: P,
        standby: S,
        config: &ChannelConfig,
    ) -> Result<Self, MotorError> {
        Self::build(pin_a, pin_b, pwm, Some(standby), config)
    }

    fn build(
        pin_a: A,
        pin_b: B,
        mut pwm: P,
        standby: Option<S>,
        config: &ChannelConfig,
    ) -> Result<Self, MotorError> {
        if config.pwm_frequency_hz == 0 {
            return Err(MotorError::InvalidFrequency);
        }
        pwm.set_frequency_hz(config.pwm_frequency_hz)
            .map_err(|_| MotorError::InvalidFrequency)?;
        pwm.set_duty_cycle(0).map_err(|_| MotorError::Pwm)?;

        let has_standby = standby.is_some();
        let mut channel = Self {
            pin_a,
            pin_b,
            pwm,
            standby,
            reversed: config.reversed,
            step_delay_ms: config.step_delay_ms,
            speed: 0.0,
            mode: BridgeMode::Brake,
            enabled: false,
            ramp: RampToken::new(),
        };

        if has_standby {
            channel.enable()?;
        }
        channel.brake()?;
        Ok(channel)
    }

    /// Drive the motor at a signed speed
    ///
    /// `speed` is clamped to [-100, 100]. Positive is forward, negative is
    /// reverse. At zero the motor is braked when `auto_brake` is set and left
    /// to coast otherwise. Supersedes any ramp in flight.
    pub fn drive(&mut self, speed: f32, auto_brake: bool) -> Result<(), MotorError> {
        self.ramp.supersede();
        self.apply(speed, auto_brake)
    }

    /// Actively brake: both inputs high, zero duty
    pub fn brake(&mut self) -> Result<(), MotorError> {
        self.drive(0.0, true)
    }

    /// Let the motor freewheel: both inputs low, zero duty
    pub fn coast(&mut self) -> Result<(), MotorError> {
        self.drive(0.0, false)
    }

    /// Drive in an explicit direction at `percent` (0-100)
    ///
    /// The sign of `percent` is ignored.
    pub fn drive_direction(&mut self, direction: Direction, percent: f32) -> Result<(), MotorError> {
        self.drive(direction.signed(magnitude(clamp_speed(percent))), true)
    }

    /// Write the raw bridge inputs
    ///
    /// Each `None` leaves that output untouched. Bypasses speed bookkeeping:
    /// [`speed`](Self::speed) keeps the last value passed to `drive`.
    /// Supersedes any ramp in flight.
    pub fn set_raw(
        &mut self,
        pin_a: Option<PinState>,
        pin_b: Option<PinState>,
        duty: Option<u16>,
    ) -> Result<(), MotorError> {
        self.ramp.supersede();
        if let Some(state) = pin_a {
            self.pin_a.set_state(state).map_err(|_| MotorError::DirectionPin)?;
        }
        if let Some(state) = pin_b {
            self.pin_b.set_state(state).map_err(|_| MotorError::DirectionPin)?;
        }
        if let Some(duty) = duty {
            let duty = duty.min(self.pwm.max_duty_cycle());
            self.pwm.set_duty_cycle(duty).map_err(|_| MotorError::Pwm)?;
        }
        Ok(())
    }

    /// Enable the bridge (standby pin high)
    pub fn enable(&mut self) -> Result<(), MotorError> {
        let standby = self.standby.as_mut().ok_or(MotorError::NoStandby)?;
        standby.set_high().map_err(|_| MotorError::Standby)?;
        self.enabled = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("TB6612 standby released");

        Ok(())
    }

    /// Put the bridge in standby (standby pin low)
    ///
    /// The motor is braked first when `auto_brake` is set, otherwise it is
    /// left to coast.
    pub fn disable(&mut self, auto_brake: bool) -> Result<(), MotorError> {
        if self.standby.is_none() {
            return Err(MotorError::NoStandby);
        }
        self.drive(0.0, auto_brake)?;

        if let Some(standby) = self.standby.as_mut() {
            standby.set_low().map_err(|_| MotorError::Standby)?;
        }
        self.enabled = false;

        #[cfg(feature = "defmt")]
        defmt::debug!("TB6612 in standby");

        Ok(())
    }

    /// Check if the bridge is enabled
    ///
    /// Always `false` for channels without a standby pin, since the state of
    /// an externally driven STBY line is unknown.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check if this channel owns a standby pin
    pub fn has_standby(&self) -> bool {
        self.standby.is_some()
    }

    /// Last commanded speed (-100..100)
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Logical direction of the last command, `None` when stopped
    pub fn direction(&self) -> Option<Direction> {
        Direction::of(self.speed)
    }

    /// Last bridge pattern applied by a speed command
    pub fn mode(&self) -> BridgeMode {
        self.mode
    }

    /// Check if forward and reverse are swapped
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Step delay from the channel config
    pub fn step_delay_ms(&self) -> u32 {
        self.step_delay_ms
    }

    /// Check if a ramp is in flight
    ///
    /// A cancelled async ramp keeps reporting `true` until the next command.
    pub fn is_ramping(&self) -> bool {
        self.ramp.is_active()
    }

    /// Give back the pin handles
    pub fn release(self) -> (A, B, P, Option<S>) {
        (self.pin_a, self.pin_b, self.pwm, self.standby)
    }

    /// Blocking ramp using the configured step delay
    pub fn ramp_to<D: DelayNs>(
        &mut self,
        target: f32,
        delay: &mut D,
    ) -> Result<RampOutcome, MotorError> {
        self.safe_drive(target, self.step_delay_ms, delay)
    }

    /// Cooperative ramp using the configured step delay
    pub async fn ramp_to_async<D: AsyncDelayNs>(
        &mut self,
        target: f32,
        delay: &mut D,
    ) -> Result<RampOutcome, MotorError> {
        let step_delay_ms = self.step_delay_ms;
        self.safe_drive_async(target, step_delay_ms, delay).await
    }

    /// Ramp to `target` in unit steps, blocking between steps
    ///
    /// `target` is rounded to the nearest integer speed. Blocks for
    /// `|target - speed| * step_delay_ms` milliseconds; returns immediately
    /// when already at the target.
    pub fn safe_drive<D: DelayNs>(
        &mut self,
        target: f32,
        step_delay_ms: u32,
        delay: &mut D,
    ) -> Result<RampOutcome, MotorError> {
        self.safe_drive_with_status(target, step_delay_ms, delay, &mut NoStatus)
    }

    /// Blocking ramp that reports every step to `status`
    pub fn safe_drive_with_status<D: DelayNs, T: StatusSink>(
        &mut self,
        target: f32,
        step_delay_ms: u32,
        delay: &mut D,
        status: &mut T,
    ) -> Result<RampOutcome, MotorError> {
        let (ticket, ramp) = self.begin_ramp(target)?;

        let mut outcome = Ok(RampOutcome::Completed);
        for speed in ramp {
            match self.ramp_step(ticket, speed) {
                Ok(true) => {}
                Ok(false) => {
                    outcome = Ok(RampOutcome::Superseded);
                    break;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
            status.notify(speed);
            DelayNs::delay_ms(delay, step_delay_ms);
        }

        self.end_ramp(ticket);
        outcome
    }

    /// Ramp to `target` in unit steps, yielding to the executor between steps
    ///
    /// Same stepping as [`safe_drive`](Self::safe_drive). If the future is
    /// dropped the motor stays at the last applied step.
    pub async fn safe_drive_async<D: AsyncDelayNs>(
        &mut self,
        target: f32,
        step_delay_ms: u32,
        delay: &mut D,
    ) -> Result<RampOutcome, MotorError> {
        self.safe_drive_async_with_status(target, step_delay_ms, delay, &mut NoStatus)
            .await
    }

    /// Cooperative ramp that reports every step to `status`
    ///
    /// `status` is awaited before the step delay starts.
    pub async fn safe_drive_async_with_status<D: AsyncDelayNs, T: AsyncStatusSink>(
        &mut self,
        target: f32,
        step_delay_ms: u32,
        delay: &mut D,
        status: &mut T,
    ) -> Result<RampOutcome, MotorError> {
        let (ticket, ramp) = self.begin_ramp(target)?;

        let mut outcome = Ok(RampOutcome::Completed);
        for speed in ramp {
            match self.ramp_step(ticket, speed) {
                Ok(true) => {}
                Ok(false) => {
                    outcome = Ok(RampOutcome::Superseded);
                    break;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
            status.notify(speed).await;
            AsyncDelayNs::delay_ms(delay, step_delay_ms).await;
        }

        self.end_ramp(ticket);
        outcome
    }

    /// Start a ramp toward `target`, superseding any ramp in flight
    ///
    /// Returns the ticket the ramp must present on each step and the step
    /// sequence. Both ends are rounded to integer speeds. When the current
    /// speed is fractional but already rounds to the target, the target is
    /// applied here so the channel ends exactly on it.
    pub fn begin_ramp(&mut self, target: f32) -> Result<(RampTicket, Ramp), MotorError> {
        let ticket = self.ramp.issue();
        let from = round_speed(self.speed);
        let to = round_speed(target);
        let ramp = Ramp::new(from, to);

        if ramp.is_finished() && self.speed != to as f32 {
            self.apply(to as f32, true)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Ramp {} -> {} ({} steps)", from, to, ramp.len());

        Ok((ticket, ramp))
    }

    /// Apply one ramp step if `ticket` is still the latest command
    ///
    /// Returns `Ok(false)` without touching the outputs when the ramp has
    /// been superseded.
    pub fn ramp_step(&mut self, ticket: RampTicket, speed: i16) -> Result<bool, MotorError> {
        if !self.ramp.is_current(ticket) {
            #[cfg(feature = "defmt")]
            defmt::debug!("Ramp superseded at {}", self.speed);

            return Ok(false);
        }
        self.apply(speed as f32, true)?;
        Ok(true)
    }

    /// Mark the ramp holding `ticket` as done
    pub fn end_ramp(&mut self, ticket: RampTicket) {
        self.ramp.finish(ticket);
    }

    /// Resolve and write one speed command
    fn apply(&mut self, speed: f32, auto_brake: bool) -> Result<(), MotorError> {
        let out = resolve(speed, auto_brake, self.reversed);
        let (in1, in2) = out.mode.pin_levels();

        self.pin_a
            .set_state(PinState::from(in1))
            .map_err(|_| MotorError::DirectionPin)?;
        self.pin_b
            .set_state(PinState::from(in2))
            .map_err(|_| MotorError::DirectionPin)?;

        let duty = percent_to_duty(out.percent, self.pwm.max_duty_cycle());
        self.pwm.set_duty_cycle(duty).map_err(|_| MotorError::Pwm)?;

        self.speed = out.speed;
        self.mode = out.mode;

        #[cfg(feature = "defmt")]
        defmt::trace!("Drive {} -> {} duty={}", out.speed, out.mode, duty);

        Ok(())
    }
}
