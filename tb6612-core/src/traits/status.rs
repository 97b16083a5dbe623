//! Ramp status reporting
//!
//! A status sink is notified with the intermediate speed after every ramp
//! step. Ramps that report nothing simply take no sink.

/// Receives the intermediate speed after each ramp step
pub trait StatusSink {
    /// Called once per step with the speed just applied
    fn notify(&mut self, speed: i16);
}

impl<F: FnMut(i16)> StatusSink for F {
    fn notify(&mut self, speed: i16) {
        self(speed)
    }
}

/// Async status sink for cooperative ramps
///
/// The ramp awaits `notify` before starting the next step delay, so a sink
/// may itself suspend (e.g. to push the value into a channel).
#[allow(async_fn_in_trait)]
pub trait AsyncStatusSink {
    /// Called once per step with the speed just applied
    async fn notify(&mut self, speed: i16);
}

/// Sink used when a ramp has nobody to report to
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatus;

impl StatusSink for NoStatus {
    fn notify(&mut self, _speed: i16) {}
}

impl AsyncStatusSink for NoStatus {
    async fn notify(&mut self, _speed: i16) {}
}
