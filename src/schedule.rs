//! Amplitude sequences for the stepped sine tables.
//!
//! The per-step decrement is `initial / steps` as a float, applied to the
//! previous *truncated* value. Truncation error therefore accumulates across
//! steps instead of being recomputed from the initial amplitude.
//!
//! Amplitudes are carried through `f64`, so they are exact only up to
//! [`MAX_EXACT_AMPLITUDE`]; configuration validation enforces that bound.

/// Largest amplitude whose per-step arithmetic is exact in `f64` (2^53).
pub const MAX_EXACT_AMPLITUDE: i64 = 1 << 53;

fn decrement(initial: i64, steps: usize) -> f64 {
    initial as f64 / steps as f64
}

/// Amplitude used for each step `1..=steps`, decremented before use.
///
/// Returns an empty sequence for `steps == 0`.
pub fn amplitude_schedule(initial: i64, steps: usize) -> Vec<i64> {
    if steps == 0 {
        return Vec::new();
    }

    let step = decrement(initial, steps);
    let mut current = initial;
    (0..steps)
        .map(|_| {
            current = (current as f64 - step).trunc() as i64;
            current
        })
        .collect()
}

/// Full amplitude for the first step, then an integer decrement of
/// `initial / steps` (floor division) after each step.
///
/// This is the ordering and integer arithmetic of the original table script.
/// `initial` is expected to be non-negative, where truncating division and
/// floor division agree.
pub fn amplitude_schedule_from_full(initial: i64, steps: usize) -> Vec<i64> {
    if steps == 0 {
        return Vec::new();
    }

    let step = initial / steps as i64;
    let mut current = initial;
    (0..steps)
        .map(|_| {
            let used = current;
            current -= step;
            used
        })
        .collect()
}
