//! Token lifetime strings: `30s`, `15m`, `12h`, `7d`, or bare seconds.

use std::time::Duration;

use crate::errors::{RotationError, Result};

/// Parse a lifetime string into a non-zero `Duration`.
pub fn parse_ttl(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    let invalid = || RotationError::InvalidTtl(input.to_string());

    let (digits, multiplier) = match trimmed.char_indices().last() {
        Some((i, 's')) => (&trimmed[..i], 1),
        Some((i, 'm')) => (&trimmed[..i], 60),
        Some((i, 'h')) => (&trimmed[..i], 60 * 60),
        Some((i, 'd')) => (&trimmed[..i], 24 * 60 * 60),
        Some(_) => (trimmed, 1),
        None => return Err(invalid()),
    };

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    let secs = amount.checked_mul(multiplier).ok_or_else(invalid)?;
    if secs == 0 {
        return Err(invalid());
    }

    Ok(Duration::from_secs(secs))
}
