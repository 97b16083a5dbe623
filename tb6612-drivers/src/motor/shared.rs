//! Motor channel shared between tasks
//!
//! A [`MotorChannel`] borrowed mutably for a whole ramp cannot be commanded
//! by anyone else until the ramp ends. When several tasks need to command
//! the same motor, wrap it in a [`SharedMotorChannel`]: every command and
//! every ramp step takes the lock briefly, never across an `.await`.
//!
//! The latest command wins. Starting a ramp or issuing a direct command
//! supersedes any ramp in flight; the older ramp notices at its next step
//! and returns [`RampOutcome::Superseded`] without touching the outputs.
//! The lock is released while a status sink runs, so a sink may itself
//! command the channel it reports on.
//!
//! ```ignore
//! static LEFT: StaticCell<SharedMotorChannel<CriticalSectionRawMutex, ...>> = StaticCell::new();
//! let left = LEFT.init(SharedMotorChannel::new(channel));
//!
//! // task 1
//! left.safe_drive_async(80.0, 20, &mut Delay).await?;
//! // task 2, some time later: the ramp above stops at its next step
//! left.brake()?;
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;

use tb6612_core::ramp::RampOutcome;
use tb6612_core::state::BridgeMode;
use tb6612_core::traits::{AsyncStatusSink, MotorError, NoStatus, PwmFrequency};

use super::channel::{MotorChannel, NoStandby};

/// Motor channel behind a blocking mutex
pub struct SharedMotorChannel<M: RawMutex, A, B, P, S = NoStandby> {
    inner: Mutex<M, RefCell<MotorChannel<A, B, P, S>>>,
}

impl<M, A, B, P, S> SharedMotorChannel<M, A, B, P, S>
where
    M: RawMutex,
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle + PwmFrequency,
    S: OutputPin,
{
    /// Wrap a channel
    pub fn new(channel: MotorChannel<A, B, P, S>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(channel)),
        }
    }

    /// Unwrap the channel
    pub fn into_inner(self) -> MotorChannel<A, B, P, S> {
        self.inner.into_inner().into_inner()
    }

    fn with<R>(&self, f: impl FnOnce(&mut MotorChannel<A, B, P, S>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// See [`MotorChannel::drive`]
    pub fn drive(&self, speed: f32, auto_brake: bool) -> Result<(), MotorError> {
        self.with(|c| c.drive(speed, auto_brake))
    }

    /// See [`MotorChannel::brake`]
    pub fn brake(&self) -> Result<(), MotorError> {
        self.with(|c| c.brake())
    }

    /// See [`MotorChannel::coast`]
    pub fn coast(&self) -> Result<(), MotorError> {
        self.with(|c| c.coast())
    }

    /// See [`MotorChannel::enable`]
    pub fn enable(&self) -> Result<(), MotorError> {
        self.with(|c| c.enable())
    }

    /// See [`MotorChannel::disable`]
    pub fn disable(&self, auto_brake: bool) -> Result<(), MotorError> {
        self.with(|c| c.disable(auto_brake))
    }

    /// Last commanded speed
    pub fn speed(&self) -> f32 {
        self.with(|c| c.speed())
    }

    /// Last applied bridge pattern
    pub fn mode(&self) -> BridgeMode {
        self.with(|c| c.mode())
    }

    /// Check if a ramp is in flight
    pub fn is_ramping(&self) -> bool {
        self.with(|c| c.is_ramping())
    }

    /// Ramp to `target`, superseding any ramp in flight
    ///
    /// Returns [`RampOutcome::Superseded`] if a newer command arrives before
    /// the target is reached.
    pub async fn safe_drive_async<D: DelayNs>(
        &self,
        target: f32,
        step_delay_ms: u32,
        delay: &mut D,
    ) -> Result<RampOutcome, MotorError> {
        self.safe_drive_async_with_status(target, step_delay_ms, delay, &mut NoStatus)
            .await
    }

    /// Ramp that reports every applied step to `status`
    pub async fn safe_drive_async_with_status<D: DelayNs, T: AsyncStatusSink>(
        &self,
        target: f32,
        step_delay_ms: u32,
        delay: &mut D,
        status: &mut T,
    ) -> Result<RampOutcome, MotorError> {
        let (ticket, ramp) = self.with(|c| c.begin_ramp(target))?;

        for speed in ramp {
            match self.with(|c| c.ramp_step(ticket, speed)) {
                Ok(true) => {}
                Ok(false) => return Ok(RampOutcome::Superseded),
                Err(e) => {
                    self.with(|c| c.end_ramp(ticket));
                    return Err(e);
                }
            }
            status.notify(speed).await;
            delay.delay_ms(step_delay_ms).await;
        }

        self.with(|c| c.end_ramp(ticket));
        Ok(RampOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::yield_now;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use tb6612_core::config::ChannelConfig;

    struct MockPin;

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    struct MockPwm {
        duty: u16,
    }

    impl embedded_hal::pwm::ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    impl PwmFrequency for MockPwm {
        fn set_frequency_hz(&mut self, _hz: u32) -> Result<(), Infallible> {
            Ok(())
        }
    }

    /// Async delay that yields once per call
    struct YieldDelay;

    impl DelayNs for YieldDelay {
        async fn delay_ns(&mut self, _ns: u32) {
            yield_now().await;
        }

        async fn delay_ms(&mut self, _ms: u32) {
            yield_now().await;
        }
    }

    struct Recorder {
        steps: Vec<i16>,
    }

    impl AsyncStatusSink for Recorder {
        async fn notify(&mut self, speed: i16) {
            self.steps.push(speed);
        }
    }

    type TestShared = SharedMotorChannel<NoopRawMutex, MockPin, MockPin, MockPwm>;

    /// Status sink that brakes the motor it reports on at a given step
    struct BrakeAt<'a> {
        motor: &'a TestShared,
        at: i16,
        seen: Vec<i16>,
    }

    impl AsyncStatusSink for BrakeAt<'_> {
        async fn notify(&mut self, speed: i16) {
            self.seen.push(speed);
            if speed == self.at {
                self.motor.brake().unwrap();
            }
        }
    }

    fn shared() -> SharedMotorChannel<NoopRawMutex, MockPin, MockPin, MockPwm> {
        let channel = MotorChannel::new(
            MockPin,
            MockPin,
            MockPwm { duty: 0 },
            &ChannelConfig::default(),
        )
        .unwrap();
        SharedMotorChannel::new(channel)
    }

    #[test]
    fn test_direct_commands() {
        let motor = shared();

        motor.drive(40.0, true).unwrap();
        assert_eq!(motor.speed(), 40.0);
        assert_eq!(motor.mode(), BridgeMode::Forward);

        motor.coast().unwrap();
        assert_eq!(motor.mode(), BridgeMode::Coast);

        motor.brake().unwrap();
        assert_eq!(motor.mode(), BridgeMode::Brake);

        assert_eq!(motor.enable(), Err(MotorError::NoStandby));
    }

    #[test]
    fn test_ramp_completes_when_alone() {
        let motor = shared();
        let mut recorder = Recorder { steps: Vec::new() };

        let outcome = block_on(motor.safe_drive_async_with_status(
            4.0,
            5,
            &mut YieldDelay,
            &mut recorder,
        ))
        .unwrap();

        assert_eq!(outcome, RampOutcome::Completed);
        assert_eq!(recorder.steps, vec![1, 2, 3, 4]);
        assert!(!motor.is_ramping());
        let (_, _, pwm, _) = motor.into_inner().release();
        assert_eq!(pwm.duty, 40);
    }

    #[test]
    fn test_brake_from_status_sink() {
        let motor = shared();
        let mut delay = YieldDelay;
        let mut sink = BrakeAt {
            motor: &motor,
            at: 3,
            seen: Vec::new(),
        };

        let outcome =
            block_on(motor.safe_drive_async_with_status(10.0, 5, &mut delay, &mut sink)).unwrap();

        assert_eq!(outcome, RampOutcome::Superseded);
        assert_eq!(sink.seen, vec![1, 2, 3]);
        assert_eq!(motor.speed(), 0.0);
        assert_eq!(motor.mode(), BridgeMode::Brake);
        assert!(!motor.is_ramping());
    }

    #[test]
    fn test_drive_supersedes_ramp() {
        let motor = shared();
        let mut delay = YieldDelay;

        let ramp = motor.safe_drive_async(50.0, 5, &mut delay);
        let command = async {
            yield_now().await;
            yield_now().await;
            motor.drive(-10.0, true)
        };
        let (outcome, result) = block_on(join(ramp, command));

        assert_eq!(outcome, Ok(RampOutcome::Superseded));
        assert_eq!(result, Ok(()));
        assert_eq!(motor.speed(), -10.0);
        assert!(!motor.is_ramping());
    }

    #[test]
    fn test_newer_ramp_supersedes_older() {
        let motor = shared();
        let mut first_delay = YieldDelay;
        let mut second_delay = YieldDelay;

        let first = motor.safe_drive_async(50.0, 5, &mut first_delay);
        let second = async {
            yield_now().await;
            motor.safe_drive_async(-3.0, 5, &mut second_delay).await
        };
        let (first, second) = block_on(join(first, second));

        assert_eq!(first, Ok(RampOutcome::Superseded));
        assert_eq!(second, Ok(RampOutcome::Completed));
        assert_eq!(motor.speed(), -3.0);
        assert!(!motor.is_ramping());
    }
}
