//! Token lifetime strings such as `"24h"` or `"7d"`

use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpiryParseError {
    #[error("Empty expiry value")]
    Empty,

    #[error("Invalid expiry amount in '{0}'")]
    InvalidAmount(String),

    #[error("Unknown expiry unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },
}

/// Parse a lifetime like `"45s"`, `"30m"`, `"24h"`, `"7d"`, `"2w"` or `"1y"`.
///
/// A bare number is read as seconds. Units are case-insensitive and may be spelled out
/// (`"7 days"`, `"1 hour"`).
pub fn parse_expiry(input: &str) -> Result<Duration, ExpiryParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ExpiryParseError::Empty);
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split);

    let amount: i64 = amount
        .parse()
        .map_err(|_| ExpiryParseError::InvalidAmount(input.to_string()))?;

    let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 60 * 60,
        "d" | "day" | "days" => 24 * 60 * 60,
        "w" | "week" | "weeks" => 7 * 24 * 60 * 60,
        "y" | "yr" | "yrs" | "year" | "years" => 365 * 24 * 60 * 60,
        other => {
            return Err(ExpiryParseError::UnknownUnit {
                input: input.to_string(),
                unit: other.to_string(),
            })
        }
    };

    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ExpiryParseError::InvalidAmount(input.to_string()))
}
