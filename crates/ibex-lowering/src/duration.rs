// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::error::LowerError;

const NS: i64 = 1;
const US: i64 = 1_000 * NS;
const MS: i64 = 1_000 * US;
const S: i64 = 1_000 * MS;
const M: i64 = 60 * S;
const H: i64 = 60 * M;
const D: i64 = 24 * H;
const W: i64 = 7 * D;
const MO: i64 = 30 * D;
const Y: i64 = 365 * D;

/// Parses a window duration literal: a run of digits followed by a
/// unit suffix. Rejects an empty digit run, a missing unit, and any
/// unit not in the table below.
pub fn parse_duration(text: &str) -> Result<i64, LowerError> {
    let unit_pos = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    if unit_pos == 0 || unit_pos == text.len() {
        return Err(LowerError::InvalidDuration(text.to_string()));
    }
    let (number_part, unit_part) = text.split_at(unit_pos);
    let value: i64 = number_part
        .parse()
        .map_err(|_| LowerError::InvalidDuration(text.to_string()))?;
    let multiplier = match unit_part {
        "ns" => NS,
        "us" => US,
        "ms" => MS,
        "s" => S,
        "m" => M,
        "h" => H,
        "d" => D,
        "w" => W,
        "mo" => MO,
        "y" => Y,
        _ => return Err(LowerError::InvalidDuration(text.to_string())),
    };
    Ok(value * multiplier)
}
