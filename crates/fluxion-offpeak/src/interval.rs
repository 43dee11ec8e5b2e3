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

use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

use crate::error::{WindowError, WindowResult};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// A contiguous window during which charging is permitted.
///
/// Start is inclusive, end is exclusive. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl Interval {
    /// Create an interval, rejecting a start that lies after the end
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> WindowResult<Self> {
        if start > end {
            return Err(WindowError::InvalidInterval {
                start: start.format(DISPLAY_FORMAT).to_string(),
                end: end.format(DISPLAY_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Interval from bounds the caller has already ordered
    pub(crate) fn from_ordered(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Same window with a new start. Callers guarantee `start <= self.end`.
    pub(crate) fn with_start(self, start: DateTime<Tz>) -> Self {
        debug_assert!(start <= self.end);
        Self { start, ..self }
    }

    /// Same window with a new end. Callers guarantee `self.start <= end`.
    pub(crate) fn with_end(self, end: DateTime<Tz>) -> Self {
        debug_assert!(self.start <= end);
        Self { end, ..self }
    }

    /// Whether `instant` falls inside the window
    pub fn contains(&self, instant: DateTime<Tz>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether this window sits entirely inside `other` (bounds included)
    pub fn lies_within(&self, other: &Interval) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    /// Whether this window spans all of `other` (bounds included)
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the window has fully elapsed at `now`
    pub fn has_elapsed(&self, now: DateTime<Tz>) -> bool {
        self.end <= now
    }

    /// Same instants expressed in another zone
    pub fn in_zone(&self, zone: Tz) -> Self {
        Self {
            start: self.start.with_timezone(&zone),
            end: self.end.with_timezone(&zone),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.start.format(DISPLAY_FORMAT),
            self.end.format(DISPLAY_FORMAT)
        )
    }
}

/// The guaranteed nightly off-peak window for one charge day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FixedWindow(Interval);

impl FixedWindow {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> WindowResult<Self> {
        Interval::new(start, end).map(Self)
    }

    pub(crate) fn from_interval(interval: Interval) -> Self {
        Self(interval)
    }

    pub fn interval(&self) -> Interval {
        self.0
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.0.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.0.end
    }

    pub fn timezone(&self) -> Tz {
        self.0.start.timezone()
    }
}

impl fmt::Display for FixedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sanitized charge windows, sorted by start, never empty.
///
/// Only [`crate::sanitizer::sanitize`] builds one, so consecutive entries
/// never touch or overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkingSet {
    intervals: Vec<Interval>,
}

impl WorkingSet {
    pub(crate) fn from_sanitized(intervals: Vec<Interval>) -> Self {
        debug_assert!(!intervals.is_empty());
        debug_assert!(intervals.windows(2).all(|w| w[0].end < w[1].start));
        Self { intervals }
    }

    /// Earliest window
    pub fn first(&self) -> &Interval {
        &self.intervals[0]
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total permitted time across all windows
    pub fn total_duration(&self) -> Duration {
        self.intervals
            .iter()
            .fold(Duration::zero(), |acc, interval| acc + interval.duration())
    }
}

impl<'a> IntoIterator for &'a WorkingSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

/// Resolve a local wall-clock time in `zone` to a single instant.
pub(crate) fn resolve_local(zone: Tz, naive: chrono::NaiveDateTime) -> DateTime<Tz> {
    match zone.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earliest, _) => earliest,
        // Skipped by a DST jump: take the first instant after the gap
        chrono::LocalResult::None => {
            let mut candidate = naive;
            for _ in 0..8 {
                candidate += Duration::minutes(30);
                if let Some(dt) = zone.from_local_datetime(&candidate).earliest() {
                    return dt;
                }
            }
            zone.from_utc_datetime(&naive)
        }
    }
}
