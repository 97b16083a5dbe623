//! Speed clamping and duty-cycle mapping
//!
//! Speeds are signed percentages in [-100, 100]. Out-of-range input is
//! clamped rather than rejected: a hardware control API should keep the
//! motor in a defined state whatever the caller asks for.

/// Maximum speed magnitude (percent)
pub const MAX_SPEED: f32 = 100.0;

/// Maximum integer ramp speed
pub const MAX_RAMP_SPEED: i16 = 100;

/// Clamp a signed speed to [-100, 100]
///
/// NaN is treated as zero; infinities clamp to the nearest bound.
pub fn clamp_speed(speed: f32) -> f32 {
    if speed.is_nan() {
        0.0
    } else {
        speed.clamp(-MAX_SPEED, MAX_SPEED)
    }
}

/// Clamp and round a speed to the integer grid used by ramps
///
/// Rounds half away from zero, so `12.5` becomes `13` and `-12.5`
/// becomes `-13`.
pub fn round_speed(speed: f32) -> i16 {
    round_half_away(clamp_speed(speed)) as i16
}

/// Round half away from zero without `std` float math
///
/// The fractional part is compared rather than biased by 0.5, since
/// `x + 0.5` can itself round up to the next integer.
fn round_half_away(x: f32) -> i32 {
    // `as` truncates toward zero; `x - t` is exact
    let t = x as i32;
    let frac = x - t as f32;
    if frac >= 0.5 {
        t + 1
    } else if frac <= -0.5 {
        t - 1
    } else {
        t
    }
}

/// Absolute value of a speed without relying on `std` float math
pub fn magnitude(speed: f32) -> f32 {
    if speed < 0.0 {
        -speed
    } else {
        speed
    }
}

/// Convert a speed percentage to a duty cycle in `[0, max_duty]`
///
/// The sign of `percent` is ignored and the magnitude is clamped to
/// [0, 100]. The mapping is an exact linear scale with nearest-integer
/// rounding, so `percent_to_duty(50.0, 65535) == 32768`.
pub fn percent_to_duty(percent: f32, max_duty: u16) -> u16 {
    let p = magnitude(clamp_speed(percent));
    let duty = round_half_away(p * max_duty as f32 / MAX_SPEED);
    duty.clamp(0, max_duty as i32) as u16
}
