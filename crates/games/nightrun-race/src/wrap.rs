//! Modular arithmetic on the looped track.

/// Wrap a longitudinal position into `[0, length)`.
///
/// `length` must be positive.
pub fn normalize(z: f64, length: f64) -> f64 {
    let wrapped = z.rem_euclid(length);
    // rem_euclid can round up to `length` for tiny negative inputs
    if wrapped >= length { 0.0 } else { wrapped }
}

/// Signed distance from `from` to `to` along the loop, in `(-length/2, length/2]`.
///
/// Positive means `to` is ahead of `from`.
pub fn signed_relative(to: f64, from: f64, length: f64) -> f64 {
    let forward = normalize(to - from, length);
    if forward > length / 2.0 {
        forward - length
    } else {
        forward
    }
}

/// Index of the segment containing `z`, for a loop of `count` segments.
pub fn segment_index(z: f64, segment_length: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let length = segment_length * count as f64;
    let idx = (normalize(z, length) / segment_length).floor() as usize;
    idx.min(count - 1)
}

/// Fraction of the way through the segment containing `z`, in `[0, 1)`.
pub fn percent_through(z: f64, segment_length: f64) -> f64 {
    let p = normalize(z, segment_length) / segment_length;
    if p >= 1.0 { 0.0 } else { p }
}
