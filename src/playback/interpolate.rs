//! Blending between discrete timesteps.

/// Linear blend from `a` to `b`. `frac = 0` returns `a` exactly.
pub fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    a + (b - a) * frac
}

/// Maps any angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed difference `to - from` on the shorter arc, in `(-180, 180]`.
///
/// Both inputs must already be in `[0, 360)`, so a single correction is enough.
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    let diff = to - from;
    if diff > 180.0 {
        diff - 360.0
    } else if diff <= -180.0 {
        diff + 360.0
    } else {
        diff
    }
}

/// Heading `frac` of the way from `from` to `to`, turning the short way round.
pub fn blend_heading(from: f64, to: f64, frac: f64) -> f64 {
    normalize_degrees(from + shortest_arc(from, to) * frac)
}

/// Splits a playback time into its timestep and fractional part.
///
/// The time is clamped into `[0, horizon]` first; NaN counts as 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn split_time(time: f64, horizon: usize) -> (usize, f64) {
    let time = if time.is_nan() {
        0.0
    } else {
        time.clamp(0.0, horizon as f64)
    };
    let step = time.floor();
    (step as usize, time - step)
}
