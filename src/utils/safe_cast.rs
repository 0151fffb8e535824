//! Checked numeric conversions between frame counts, rates and pixel coordinates

use crate::{Error, Result};

/// Truncate a non-negative f64 to usize with bounds checking
///
/// # Errors
///
/// Returns an error if the value is not finite, negative, or exceeds usize range
#[allow(clippy::cast_precision_loss)] // MAX bound check is approximate
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Checked above
pub fn f64_to_usize(value: f64) -> Result<usize> {
    if value.is_finite() && value >= 0.0 && value <= usize::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to usize"
        )))
    }
}

/// Safely convert u32 to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn u32_to_i32(value: u32) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Clamp and convert f64 to i32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

/// Map a normalized `0..1` coordinate to a pixel index in `0..extent`
#[must_use]
pub fn normalized_to_pixel(value: f64, extent: u32) -> i32 {
    let max = u32_to_i32(extent.saturating_sub(1)).unwrap_or(i32::MAX);
    f64_to_i32_clamp(value * f64::from(extent), 0, max)
}
