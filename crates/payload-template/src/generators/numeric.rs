//! Random digit-string generator.

use rand::RngCore;

/// Digit count used by `{{@rnd}}` without an argument.
pub const DEFAULT_DIGITS: i64 = 6;

/// Largest supported digit count; larger requests are clamped.
///
/// `10^18` still fits in a `u64`.
pub const MAX_DIGITS: i64 = 18;

/// Generate a zero-padded decimal string with exactly `digits` digits.
///
/// The value is drawn uniformly from `[0, 10^digits)`. A digit count of zero
/// or less yields `"0"`.
pub fn generate_random_digits<R: RngCore + ?Sized>(
    rng: &mut R,
    digits: i64,
) -> Result<String, rand::Error> {
    if digits <= 0 {
        return Ok("0".to_string());
    }
    let width = digits.min(MAX_DIGITS) as u32;
    let value = uniform_below(rng, 10u64.pow(width))?;

    Ok(format!("{:0width$}", value, width = width as usize))
}

/// Draw a uniform value in `[0, bound)` by rejection sampling.
///
/// Random words are masked down to the bit length of `bound - 1`, so each
/// draw is accepted with probability above one half.
fn uniform_below<R: RngCore + ?Sized>(rng: &mut R, bound: u64) -> Result<u64, rand::Error> {
    let max = bound - 1;
    if max == 0 {
        return Ok(0);
    }
    let mask = u64::MAX >> max.leading_zeros();

    let mut buf = [0u8; 8];
    loop {
        rng.try_fill_bytes(&mut buf)?;
        let candidate = u64::from_be_bytes(buf) & mask;
        if candidate < bound {
            return Ok(candidate);
        }
    }
}
