//! Utility functions for the explorer: tool argument parsing and display formatting

use chrono::{DateTime, TimeZone, Utc};
use ethers::types::U256;
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::mcp::protocol::{error_codes, Response};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Helper function to extract an optional argument; absent or `null` is `None`,
/// a present value that does not parse is an error.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<Option<T>, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => from_value(value.clone()).map(Some).map_err(|_| {
            Response::error(
                req_id.clone(),
                error_codes::INVALID_PARAMS,
                format!("Invalid argument: '{}'", key),
            )
        }),
    }
}

// --- Amounts ---

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// Places a decimal point `places` digits from the right of `digits`, padding with leading zeros.
fn insert_point(digits: String, places: usize) -> String {
    if places == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = places + 1);
    let (whole, frac) = padded.split_at(padded.len() - places);
    format!("{}.{}", whole, frac)
}

/// Renders `raw / 10^decimals` with exactly `places` fractional digits, rounding half up.
///
/// Works on the decimal digits of `raw`, so any `U256` renders exactly.
pub fn format_units_fixed(raw: U256, decimals: u32, places: u32) -> String {
    if places >= decimals {
        let mut digits = raw.to_string();
        digits.extend(std::iter::repeat('0').take((places - decimals) as usize));
        return insert_point(digits, places as usize);
    }
    let scaled = match pow10(decimals - places) {
        Some(divisor) => {
            let (quotient, remainder) = raw.div_mod(divisor);
            // remainder >= divisor / 2, without overflowing
            if remainder >= divisor - remainder {
                quotient + U256::one()
            } else {
                quotient
            }
        }
        // divisor exceeds any U256, so the value rounds to zero
        None => U256::zero(),
    };
    insert_point(scaled.to_string(), places as usize)
}

/// Wei rendered as ether with `places` fractional digits.
pub fn format_ether(wei: U256, places: u32) -> String {
    format_units_fixed(wei, 18, places)
}

/// Compact ether amount used by transaction lists.
pub fn format_eth_compact(wei: U256) -> String {
    if wei.is_zero() {
        return "0 ETH".to_string();
    }
    // 0.001 ether
    if wei < U256::exp10(15) {
        return "<0.001 ETH".to_string();
    }
    format!("{} ETH", format_ether(wei, 6))
}

/// Gas used as a percentage of the limit, two decimals.
pub fn format_gas_usage(gas_used: U256, gas_limit: U256) -> String {
    if gas_limit.is_zero() {
        return "N/A".to_string();
    }
    let Some(numerator) = gas_used.checked_mul(U256::from(20_000u64)) else {
        return "N/A".to_string();
    };
    // basis points, rounded half up
    let Some(bps) = numerator
        .checked_add(gas_limit)
        .zip(gas_limit.checked_mul(U256::from(2u8)))
        .map(|(n, d)| n / d)
    else {
        return "N/A".to_string();
    };
    format!("{}.{:02}%", bps / 100, (bps % 100).as_u64())
}

// --- Identifiers ---

/// Keeps the first `head` and last `tail` characters of a hash or address.
pub fn shorten(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= head + tail {
        return value.to_string();
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}

pub fn short_hash(hash: &str) -> String {
    shorten(hash, 10, 8)
}

pub fn short_address(address: &str) -> String {
    shorten(address, 6, 4)
}

// --- Time ---

fn elapsed_secs(timestamp: u64, now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp()).unwrap_or_default().saturating_sub(timestamp)
}

/// Long form used by block views: `12 secs ago`, `3 mins ago`, `2 hours ago`, `5 days ago`.
pub fn format_time_ago(timestamp: u64, now: DateTime<Utc>) -> String {
    let diff = elapsed_secs(timestamp, now);
    match diff {
        0..=59 => format!("{} secs ago", diff),
        60..=3599 => format!("{} mins ago", diff / 60),
        3600..=86_399 => format!("{} hours ago", diff / 3600),
        _ => format!("{} days ago", diff / 86_400),
    }
}

/// Short form used by transaction lists; older than a day falls back to the date.
pub fn format_relative_time(timestamp: u64, now: DateTime<Utc>) -> String {
    if timestamp == 0 {
        return String::new();
    }
    let diff = elapsed_secs(timestamp, now);
    match diff {
        0..=59 => format!("{}s ago", diff),
        60..=3599 => format!("{}m ago", diff / 60),
        3600..=86_399 => format!("{}h ago", diff / 3600),
        _ => i64::try_from(timestamp)
            .ok()
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}
