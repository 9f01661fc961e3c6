/// Luminosity grayscale (ITU-R BT.601 weights).
///
/// Evaluated left to right in `f64` so results are bit-identical with the
/// reference vectors, e.g. `(153, 153, 153)` lands exactly on `153.0`.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

#[inline]
pub fn is_ink(r: u8, g: u8, b: u8, threshold: u8) -> bool {
    luminance(r, g, b) <= threshold as f64
}
