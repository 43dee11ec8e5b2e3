// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Parsing supplier timestamps and moving them into the display zone

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use tracing::trace;

use crate::error::{WindowError, WindowResult};
use crate::interval::Interval;
use crate::source::RawDispatch;

/// Offset-carrying formats seen from the supplier, tried in order
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%:z"];

/// Parse a supplier timestamp into an absolute instant.
///
/// Accepts `YYYY-MM-DD HH:MM:SS±HHMM`, the same with `±HH:MM`, and RFC 3339.
/// Timestamps without an offset are rejected.
pub fn parse_instant(value: &str) -> WindowResult<DateTime<FixedOffset>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }

    let mut last_error = None;
    for format in TIMESTAMP_FORMATS {
        match DateTime::parse_from_str(trimmed, format) {
            Ok(dt) => return Ok(dt),
            Err(e) => last_error = Some(e),
        }
    }

    Err(WindowError::InvalidTimestamp {
        value: value.to_owned(),
        reason: last_error.map_or_else(|| "empty input".to_owned(), |e| e.to_string()),
    })
}

/// Convert a raw dispatch into an interval expressed in `zone`.
///
/// This is a true zone conversion: the instants are unchanged, only the
/// offset they are displayed with moves to `zone`.
pub fn normalize(raw: &RawDispatch, zone: Tz) -> WindowResult<Interval> {
    let start = parse_instant(&raw.start)?.with_timezone(&zone);
    let end = parse_instant(&raw.end)?.with_timezone(&zone);
    trace!("Normalized dispatch {} .. {} into {}", raw.start, raw.end, zone);
    Interval::new(start, end)
}

/// Normalize every raw dispatch, stopping at the first malformed one
pub fn normalize_all(raw: &[RawDispatch], zone: Tz) -> WindowResult<Vec<Interval>> {
    raw.iter().map(|r| normalize(r, zone)).collect()
}
