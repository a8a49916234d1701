/// World speed units per displayed speedometer unit.
pub const SPEED_DISPLAY_DIVISOR: f64 = 100.0;

/// Cars to pass on `day` (1-based).
pub fn pass_target(day: u32, base: u32, increment: u32) -> u32 {
    base.saturating_add(increment.saturating_mul(day.max(1) - 1))
}

/// Whether a (possibly negative) pass count meets the target.
pub fn target_met(cars_passed: i32, target: u32) -> bool {
    i64::from(cars_passed) >= i64::from(target)
}

/// Speedometer reading, floored.
pub fn speed_display(speed: f64) -> u32 {
    (speed.max(0.0) / SPEED_DISPLAY_DIVISOR).floor() as u32
}
