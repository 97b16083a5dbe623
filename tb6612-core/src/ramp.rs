//! Speed ramp generation
//!
//! A ramp walks a motor from its current speed to a target speed in unit
//! steps. The step sequence is computed here, once, and consumed by both the
//! blocking and the cooperative drivers, which only differ in how they wait
//! between steps.
//!
//! [`RampToken`] lets a newer command supersede a ramp that is still in
//! flight. Every ramp holds a [`RampTicket`]; any later command invalidates
//! it and the ramp stops at its next step boundary.

use core::iter::FusedIterator;

use crate::speed::MAX_RAMP_SPEED;

/// Default delay between ramp steps in milliseconds
pub const DEFAULT_STEP_DELAY_MS: u32 = 70;

/// Lazy sequence of intermediate speeds from `from` (exclusive) to `to`
/// (inclusive) in steps of one
///
/// The sequence is finite and contains exactly `|to - from|` values. A
/// `Ramp` is `Copy`, so it can be restarted by keeping the original value.
///
/// ```
/// use tb6612_core::ramp::Ramp;
///
/// let steps: Vec<i16> = Ramp::new(-2, 2).collect();
/// assert_eq!(steps, [-1, 0, 1, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ramp {
    current: i16,
    target: i16,
}

impl Ramp {
    /// Create a ramp, clamping both ends to [-100, 100]
    pub fn new(from: i16, to: i16) -> Self {
        Self {
            current: from.clamp(-MAX_RAMP_SPEED, MAX_RAMP_SPEED),
            target: to.clamp(-MAX_RAMP_SPEED, MAX_RAMP_SPEED),
        }
    }

    /// Speed the ramp is heading to
    pub fn target(&self) -> i16 {
        self.target
    }

    /// Last speed produced (or the start speed if nothing was produced yet)
    pub fn position(&self) -> i16 {
        self.current
    }

    /// Number of steps still to be produced
    pub fn remaining(&self) -> usize {
        (self.target - self.current).unsigned_abs() as usize
    }

    /// Check if the ramp has no steps left
    pub fn is_finished(&self) -> bool {
        self.current == self.target
    }
}

impl Iterator for Ramp {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.current == self.target {
            return None;
        }
        self.current += if self.target > self.current { 1 } else { -1 };
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ramp {}

impl FusedIterator for Ramp {}

/// Proof that a ramp was the most recent command when it started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampTicket(u32);

/// How a ramp ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampOutcome {
    /// Target speed reached
    Completed,
    /// A newer command took over before the target was reached
    Superseded,
}

/// Per-channel command generation counter
///
/// Each command bumps the generation. A ramp is allowed to keep stepping only
/// while the generation still matches the ticket it was issued.
#[derive(Debug, Clone, Default)]
pub struct RampToken {
    generation: u32,
    active: bool,
}

impl RampToken {
    /// Create a token with no ramp in flight
    pub const fn new() -> Self {
        Self {
            generation: 0,
            active: false,
        }
    }

    /// Start a new ramp, superseding any previous one
    pub fn issue(&mut self) -> RampTicket {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        RampTicket(self.generation)
    }

    /// Record a non-ramp command, invalidating any outstanding ticket
    pub fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = false;
    }

    /// Check whether `ticket` still belongs to the latest command
    pub fn is_current(&self, ticket: RampTicket) -> bool {
        self.active && self.generation == ticket.0
    }

    /// Mark the ramp holding `ticket` as finished
    ///
    /// Does nothing if the ticket was already superseded.
    pub fn finish(&mut self, ticket: RampTicket) {
        if self.generation == ticket.0 {
            self.active = false;
        }
    }

    /// Check whether a ramp is currently in flight
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ramp_up() {
        let steps: Vec<i16> = Ramp::new(0, 50).collect();
        assert_eq!(steps.len(), 50);
        assert_eq!(steps.first(), Some(&1));
        assert_eq!(steps.last(), Some(&50));
    }

    #[test]
    fn test_ramp_down_through_zero() {
        let steps: Vec<i16> = Ramp::new(3, -2).collect();
        assert_eq!(steps, [2, 1, 0, -1, -2]);
    }

    #[test]
    fn test_empty_ramp() {
        let mut ramp = Ramp::new(0, 0);
        assert!(ramp.is_finished());
        assert_eq!(ramp.len(), 0);
        assert_eq!(ramp.next(), None);
        assert_eq!(ramp.next(), None);
    }

    #[test]
    fn test_ramp_clamps_ends() {
        let ramp = Ramp::new(95, 500);
        assert_eq!(ramp.target(), 100);
        assert_eq!(ramp.len(), 5);
    }

    #[test]
    fn test_ramp_is_restartable() {
        let ramp = Ramp::new(-30, 30);
        let first: Vec<i16> = ramp.collect();
        let second: Vec<i16> = ramp.collect();
        assert_eq!(first, second);
        assert_eq!(first.first(), Some(&-29));
        assert_eq!(first.last(), Some(&30));
    }

    #[test]
    fn test_ramp_position_tracks_progress() {
        let mut ramp = Ramp::new(10, 13);
        assert_eq!(ramp.position(), 10);
        ramp.next();
        assert_eq!(ramp.position(), 11);
        assert_eq!(ramp.remaining(), 2);
    }

    #[test]
    fn test_token_supersedes_ticket() {
        let mut token = RampToken::new();
        assert!(!token.is_active());

        let first = token.issue();
        assert!(token.is_current(first));

        let second = token.issue();
        assert!(!token.is_current(first));
        assert!(token.is_current(second));

        token.supersede();
        assert!(!token.is_current(second));
        assert!(!token.is_active());
    }

    #[test]
    fn test_token_finish_ignores_stale_ticket() {
        let mut token = RampToken::new();
        let stale = token.issue();
        let fresh = token.issue();

        token.finish(stale);
        assert!(token.is_active());

        token.finish(fresh);
        assert!(!token.is_active());
    }

    proptest! {
        #[test]
        fn prop_ramp_is_monotonic_unit_steps(from in -100i16..=100, to in -100i16..=100) {
            let mut prev = from;
            let mut count = 0usize;
            for speed in Ramp::new(from, to) {
                prop_assert_eq!((speed - prev).abs(), 1);
                prop_assert_eq!((speed - prev).signum(), (to - from).signum());
                prev = speed;
                count += 1;
            }
            prop_assert_eq!(prev, to);
            prop_assert_eq!(count, (to - from).unsigned_abs() as usize);
        }
    }
}
