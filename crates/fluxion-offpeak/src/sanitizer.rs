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

//! Merging dispatch windows with the fixed off-peak window.
//!
//! Every step takes the previous step's list by value and returns a new one:
//!
//! 1. [`clip_to_fixed`] drops dispatches inside the fixed window and trims
//!    those that partially overlap it
//! 2. [`insert_fixed`] adds the fixed window unless a dispatch already spans it
//! 3. [`sort_by_start`]
//! 4. [`coalesce`] joins windows that touch
//! 5. [`drop_elapsed`] removes windows that are over
//! 6. [`or_fixed`] falls back to the fixed window when nothing is left

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::interval::{FixedWindow, Interval, WorkingSet};

/// Output of the clipping step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clipped {
    pub intervals: Vec<Interval>,

    /// Some kept dispatch spans the whole fixed window
    pub fixed_represented: bool,
}

/// Clip dispatches against the fixed window.
///
/// Per dispatch `r`:
/// - inside the fixed window: dropped, the fixed window already grants it
/// - spanning the whole fixed window: kept as is, and the fixed window is
///   marked as represented
/// - overlapping only the fixed window's start: trimmed to end at `fixed.start`
/// - overlapping only the fixed window's end: trimmed to start at `fixed.end`
/// - otherwise kept as is
pub fn clip_to_fixed(raw: &[Interval], fixed: &FixedWindow) -> Clipped {
    let window = fixed.interval();
    let mut intervals = Vec::with_capacity(raw.len() + 1);
    let mut fixed_represented = false;

    for r in raw {
        if r.lies_within(&window) {
            debug!("Dropping dispatch {} inside fixed window", r);
            continue;
        }

        if r.covers(&window) {
            fixed_represented = true;
            intervals.push(*r);
        } else if r.start() <= window.start()
            && window.start() < r.end()
            && r.end() <= window.end()
        {
            intervals.push(r.with_end(window.start()));
        } else if window.start() <= r.start()
            && r.start() <= window.end()
            && window.end() < r.end()
        {
            intervals.push(r.with_start(window.end()));
        } else {
            intervals.push(*r);
        }
    }

    Clipped {
        intervals,
        fixed_represented,
    }
}

/// Append the fixed window unless a dispatch already spans it
pub fn insert_fixed(clipped: Clipped, fixed: &FixedWindow) -> Vec<Interval> {
    let mut intervals = clipped.intervals;
    if !clipped.fixed_represented {
        intervals.push(fixed.interval());
    }
    intervals
}

/// Stable sort on start instants
pub fn sort_by_start(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(Interval::start);
    intervals
}

/// Join consecutive windows of a start-sorted list.
///
/// Windows merge when one ends exactly where the next starts. A gap of any
/// size keeps them apart. Overlapping windows merge too, keeping the later
/// end.
pub fn coalesce(sorted: Vec<Interval>) -> Vec<Interval> {
    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());

    for interval in sorted {
        if let Some(last) = merged.last_mut()
            && interval.start() <= last.end()
        {
            if interval.end() > last.end() {
                *last = last.with_end(interval.end());
            }
            continue;
        }
        merged.push(interval);
    }

    merged
}

/// Remove windows that ended at or before `now`.
///
/// A window running across `now` is kept whole.
pub fn drop_elapsed(intervals: Vec<Interval>, now: DateTime<Tz>) -> Vec<Interval> {
    intervals
        .into_iter()
        .filter(|interval| !interval.has_elapsed(now))
        .collect()
}

/// Fall back to the fixed window when no window is left
pub fn or_fixed(intervals: Vec<Interval>, fixed: &FixedWindow) -> WorkingSet {
    if intervals.is_empty() {
        debug!("No upcoming windows, falling back to fixed window {}", fixed);
        return WorkingSet::from_sanitized(vec![fixed.interval()]);
    }
    WorkingSet::from_sanitized(intervals)
}

/// Run the whole sanitizing pipeline.
///
/// The result is sorted by start, never empty, and no two consecutive
/// windows touch or overlap.
pub fn sanitize(raw: &[Interval], fixed: &FixedWindow, now: DateTime<Tz>) -> WorkingSet {
    let clipped = clip_to_fixed(raw, fixed);
    debug!(
        "Clipped {} dispatches to {} (fixed window represented: {})",
        raw.len(),
        clipped.intervals.len(),
        clipped.fixed_represented
    );

    let with_fixed = insert_fixed(clipped, fixed);
    let sorted = sort_by_start(with_fixed);
    let merged = coalesce(sorted);
    let upcoming = drop_elapsed(merged, now);
    let windows = or_fixed(upcoming, fixed);

    debug!("Sanitized into {} window(s)", windows.len());
    windows
}
